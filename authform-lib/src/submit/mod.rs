//! Submission state
//!
//! A submission moves through
//! `Idle → Validating → (ChallengePending | Transmitting) → Settling → Idle`.
//! [`SubmissionMachine`] owns the state and enforces the transitions; the
//! engine drives it.

mod machine;

pub use machine::*;

use serde_json::Value;

use crate::error::FieldError;

/// Phase of the submission cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum SubmitPhase {
    /// Waiting for a submit.
    #[default]
    Idle,
    /// Checking values against the schema.
    Validating,
    /// Waiting for the human-verification token.
    ChallengePending,
    /// Waiting for the transport.
    Transmitting,
    /// Reporting the result and resetting.
    Settling,
}

impl SubmitPhase {
    /// Returns the phase name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::ChallengePending => "challenge_pending",
            Self::Transmitting => "transmitting",
            Self::Settling => "settling",
        }
    }
}

impl std::fmt::Display for SubmitPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Snapshot of an engine's submission state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubmissionState {
    /// Current phase.
    pub phase: SubmitPhase,
    /// Whether a transmission is in flight or settling.
    pub is_submitting: bool,
    /// Message of the last failed transmission. Cleared when the next
    /// transmission starts.
    pub last_error: Option<String>,
    /// Token supplied by the challenge, while transmitting.
    pub challenge_token: Option<String>,
    /// Whether the challenge replaces the inputs.
    pub challenge_visible: bool,
}

/// Result of [`submit`](crate::FormEngine::submit) or
/// [`complete_challenge`](crate::FormEngine::complete_challenge).
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// Validation failed; nothing was sent.
    Invalid(Vec<FieldError>),
    /// Validation passed and the challenge is waiting for a token.
    ChallengePending,
    /// The server accepted the payload.
    Succeeded(Value),
    /// The transmission failed with the given display message.
    Failed(String),
    /// The call arrived in the wrong phase and was ignored.
    Rejected,
}

impl SubmitOutcome {
    /// Returns `true` for [`SubmitOutcome::Succeeded`].
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Succeeded(_))
    }

    /// Returns `true` for [`SubmitOutcome::Rejected`].
    pub fn is_rejected(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}
