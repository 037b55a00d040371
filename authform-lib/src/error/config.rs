//! Configuration error types

/// Errors raised while compiling a form configuration into a schema.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A descriptor has an empty `name`.
    #[error("Field at position {index} has an empty name")]
    EmptyName { index: usize },

    /// Two descriptors share the same `name`.
    #[error("Duplicate field name '{field}'")]
    DuplicateName { field: String },

    /// A `select` descriptor has no options to offer.
    #[error("Select field '{field}' requires at least one option")]
    MissingOptions { field: String },

    /// A `hidden` descriptor has no fixed value.
    #[error("Hidden field '{field}' requires a value")]
    MissingHiddenValue { field: String },
}

impl ConfigError {
    /// Returns the offending field name, if the error concerns a named field.
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::EmptyName { .. } => None,
            Self::DuplicateName { field }
            | Self::MissingOptions { field }
            | Self::MissingHiddenValue { field } => Some(field),
        }
    }
}
