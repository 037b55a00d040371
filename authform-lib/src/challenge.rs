//! Human-verification challenge contract
//!
//! The engine never talks to a verification service itself. It asks a
//! [`ChallengeProvider`] to show the challenge for a site key, and the host
//! hands the resulting token back through
//! [`FormEngine::complete_challenge`](crate::FormEngine::complete_challenge).

use std::sync::Arc;

/// Payload key under which the challenge token is transmitted.
pub const CHALLENGE_PAYLOAD_KEY: &str = "captchaResponse";

/// Shows and resets a human-verification challenge.
pub trait ChallengeProvider: Send + Sync {
    /// Presents the challenge for `site_key`.
    fn present(&self, site_key: &str);

    /// Discards any solved or pending challenge.
    fn reset(&self);
}

/// Challenge settings held by an engine.
#[derive(Clone)]
pub(crate) struct Challenge {
    pub(crate) site_key: String,
    pub(crate) provider: Option<Arc<dyn ChallengeProvider>>,
}

impl Challenge {
    pub(crate) fn present(&self) {
        if let Some(provider) = &self.provider {
            provider.present(&self.site_key);
        }
    }

    pub(crate) fn reset(&self) {
        if let Some(provider) = &self.provider {
            provider.reset();
        }
    }
}

impl std::fmt::Debug for Challenge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Challenge")
            .field("site_key", &self.site_key)
            .field("provider", &self.provider.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<String>>);

    impl ChallengeProvider for Recorder {
        fn present(&self, site_key: &str) {
            self.0.lock().unwrap().push(format!("present:{site_key}"));
        }

        fn reset(&self) {
            self.0.lock().unwrap().push("reset".into());
        }
    }

    #[test]
    fn test_forwards_to_provider() {
        let recorder = Arc::new(Recorder::default());
        let challenge = Challenge {
            site_key: "site-123".into(),
            provider: Some(recorder.clone()),
        };
        challenge.present();
        challenge.reset();
        assert_eq!(*recorder.0.lock().unwrap(), ["present:site-123", "reset"]);
    }

    #[test]
    fn test_without_provider_is_silent() {
        let challenge = Challenge {
            site_key: "site-123".into(),
            provider: None,
        };
        challenge.present();
        challenge.reset();
    }
}
