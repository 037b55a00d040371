//! Engine display text and host callbacks

use std::sync::Arc;

use serde_json::Value;

/// Called with the response body after a successful submission.
pub type SuccessCallback = Arc<dyn Fn(&Value) + Send + Sync>;

/// Called with the display message after a failed submission.
pub type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;

/// User-facing strings of the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayText {
    /// Button label while idle.
    pub submit_label: String,
    /// Button label while a submission is in flight.
    pub loading_label: String,
    /// Failure message when neither the server nor the transport gives one.
    pub error_text: String,
}

impl Default for DisplayText {
    fn default() -> Self {
        Self {
            submit_label: "Submit".to_string(),
            loading_label: "Processing...".to_string(),
            error_text: "Something went wrong.".to_string(),
        }
    }
}

impl DisplayText {
    /// Sets the idle button label.
    pub fn with_submit_label(mut self, label: impl Into<String>) -> Self {
        self.submit_label = label.into();
        self
    }

    /// Sets the in-flight button label.
    pub fn with_loading_label(mut self, label: impl Into<String>) -> Self {
        self.loading_label = label.into();
        self
    }

    /// Sets the fallback failure message.
    pub fn with_error_text(mut self, text: impl Into<String>) -> Self {
        self.error_text = text.into();
        self
    }

    /// Returns the button label for the given loading state.
    pub fn button_label(&self, is_loading: bool) -> &str {
        if is_loading {
            &self.loading_label
        } else {
            &self.submit_label
        }
    }
}
