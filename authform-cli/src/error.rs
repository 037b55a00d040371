//! CLI error type

use std::path::PathBuf;

use authform_lib::error::ConfigError;
use authform_lib::error::FieldAccessError;
use authform_lib::error::FieldError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid JSON in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid form configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Field(#[from] FieldAccessError),

    #[error("Invalid assignment '{0}', expected NAME=VALUE")]
    Assignment(String),

    #[error("Either --request or --url is required")]
    MissingRequest,

    #[error("{} field(s) failed validation", .0.len())]
    Invalid(Vec<FieldError>),

    #[error("Human verification required for site key '{0}'; re-run with --challenge-token")]
    ChallengeRequired(String),

    #[error("Submission failed: {0}")]
    Failed(String),

    #[error("Submission was rejected by the form")]
    Rejected,

    #[error("Failed to initialize logging: {0}")]
    Logging(String),
}
