//! Submission state machine

use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use log::debug;

use super::SubmissionState;
use super::SubmitPhase;

/// What happened to a token handed to [`SubmissionMachine::accept_token`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenDecision {
    /// No challenge was pending.
    Rejected,
    /// The challenge was dismissed; it stays pending.
    Dismissed,
    /// The token was stored and transmission has begun.
    Accepted(String),
}

/// Owns one engine's [`SubmissionState`] and applies phase transitions.
///
/// Each transition checks the current phase under the lock, so a transition
/// requested from the wrong phase is refused rather than interleaved.
#[derive(Debug, Default)]
pub struct SubmissionMachine {
    state: Mutex<SubmissionState>,
}

impl SubmissionMachine {
    /// Creates a machine in the idle phase.
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, SubmissionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns a copy of the current state.
    pub fn snapshot(&self) -> SubmissionState {
        self.state().clone()
    }

    /// Returns the current phase.
    pub fn phase(&self) -> SubmitPhase {
        self.state().phase
    }

    /// `Idle → Validating`. Returns `false` if a submission is already running.
    pub fn begin_validation(&self) -> bool {
        self.transition(SubmitPhase::Idle, SubmitPhase::Validating, |_| {})
    }

    /// `Validating → Idle` after a schema violation.
    pub fn validation_failed(&self) -> bool {
        self.transition(SubmitPhase::Validating, SubmitPhase::Idle, |_| {})
    }

    /// `Validating → ChallengePending`; shows the challenge.
    pub fn await_challenge(&self) -> bool {
        self.transition(SubmitPhase::Validating, SubmitPhase::ChallengePending, |state| {
            state.challenge_visible = true;
        })
    }

    /// Handles a token from the challenge.
    ///
    /// A missing or empty token is a dismissal and leaves the challenge
    /// pending. A real token moves to `Transmitting`.
    pub fn accept_token(&self, token: Option<&str>) -> TokenDecision {
        let mut state = self.state();
        if state.phase != SubmitPhase::ChallengePending {
            debug!("Ignoring challenge token in phase {}", state.phase);
            return TokenDecision::Rejected;
        }
        let Some(token) = token.filter(|token| !token.is_empty()) else {
            debug!("Challenge dismissed");
            return TokenDecision::Dismissed;
        };
        state.challenge_token = Some(token.to_string());
        start_transmission(&mut state);
        TokenDecision::Accepted(token.to_string())
    }

    /// `Validating → Transmitting` when no challenge is configured.
    pub fn begin_transmit(&self) -> bool {
        self.transition(SubmitPhase::Validating, SubmitPhase::Transmitting, |state| {
            state.is_submitting = true;
            state.last_error = None;
        })
    }

    /// `Transmitting → Settling`, recording the failure message if any.
    pub fn enter_settling(&self, last_error: Option<String>) -> bool {
        self.transition(SubmitPhase::Transmitting, SubmitPhase::Settling, |state| {
            state.last_error = last_error;
        })
    }

    /// `Settling → Idle`; clears everything except `last_error`.
    pub fn finish(&self) -> bool {
        self.transition(SubmitPhase::Settling, SubmitPhase::Idle, |state| {
            state.is_submitting = false;
            state.challenge_visible = false;
            state.challenge_token = None;
        })
    }

    fn transition(
        &self,
        from: SubmitPhase,
        to: SubmitPhase,
        apply: impl FnOnce(&mut SubmissionState),
    ) -> bool {
        let mut state = self.state();
        if state.phase != from {
            debug!("Refusing {from} -> {to} in phase {}", state.phase);
            return false;
        }
        debug!("Submission {from} -> {to}");
        state.phase = to;
        apply(&mut state);
        true
    }
}

fn start_transmission(state: &mut SubmissionState) {
    debug!("Submission {} -> {}", state.phase, SubmitPhase::Transmitting);
    state.phase = SubmitPhase::Transmitting;
    state.is_submitting = true;
    state.last_error = None;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_cycle() {
        let machine = SubmissionMachine::new();
        assert!(machine.begin_validation());
        assert!(!machine.begin_validation());
        assert!(machine.begin_transmit());
        assert!(machine.snapshot().is_submitting);
        assert!(machine.enter_settling(Some("boom".into())));
        assert!(machine.finish());

        let state = machine.snapshot();
        assert_eq!(state.phase, SubmitPhase::Idle);
        assert!(!state.is_submitting);
        assert_eq!(state.last_error.as_deref(), Some("boom"));
    }

    #[test]
    fn test_challenge_cycle() {
        let machine = SubmissionMachine::new();
        assert_eq!(machine.accept_token(Some("tok")), TokenDecision::Rejected);

        machine.begin_validation();
        assert!(machine.await_challenge());
        assert!(machine.snapshot().challenge_visible);

        assert_eq!(machine.accept_token(None), TokenDecision::Dismissed);
        assert_eq!(machine.accept_token(Some("")), TokenDecision::Dismissed);
        assert_eq!(machine.phase(), SubmitPhase::ChallengePending);

        assert_eq!(
            machine.accept_token(Some("tok")),
            TokenDecision::Accepted("tok".into())
        );
        assert_eq!(machine.snapshot().challenge_token.as_deref(), Some("tok"));
        assert_eq!(machine.accept_token(Some("again")), TokenDecision::Rejected);

        machine.enter_settling(None);
        machine.finish();
        let state = machine.snapshot();
        assert!(!state.challenge_visible);
        assert_eq!(state.challenge_token, None);
    }

    #[test]
    fn test_last_error_cleared_on_next_transmission() {
        let machine = SubmissionMachine::new();
        machine.begin_validation();
        machine.begin_transmit();
        machine.enter_settling(Some("first".into()));
        machine.finish();

        machine.begin_validation();
        assert!(machine.validation_failed());
        assert_eq!(machine.snapshot().last_error.as_deref(), Some("first"));

        machine.begin_validation();
        machine.begin_transmit();
        assert_eq!(machine.snapshot().last_error, None);
    }

    #[test]
    fn test_out_of_order_transitions_are_refused() {
        let machine = SubmissionMachine::new();
        assert!(!machine.begin_transmit());
        assert!(!machine.enter_settling(None));
        assert!(!machine.finish());
        assert_eq!(machine.snapshot(), SubmissionState::default());
    }
}
