//! Errors for reading and writing field values

/// Error type for value access operations on a form engine.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FieldAccessError {
    /// The field is not part of the active configuration.
    #[error("Field '{field}' not found in form")]
    Unknown { field: String },

    /// The field is hidden and its value is fixed by the configuration.
    #[error("Field '{field}' is hidden and cannot be edited")]
    ReadOnly { field: String },

    /// The value does not fit the field's family.
    #[error("Field '{field}' type mismatch: expected {expected}, got {actual}")]
    TypeMismatch {
        field: String,
        expected: &'static str,
        actual: &'static str,
    },
}

impl FieldAccessError {
    /// Creates a new unknown field error.
    pub fn unknown(field: impl Into<String>) -> Self {
        Self::Unknown {
            field: field.into(),
        }
    }

    /// Creates a new read-only field error.
    pub fn read_only(field: impl Into<String>) -> Self {
        Self::ReadOnly {
            field: field.into(),
        }
    }

    /// Creates a new type mismatch error.
    pub fn type_mismatch(field: impl Into<String>, expected: &'static str, actual: &'static str) -> Self {
        Self::TypeMismatch {
            field: field.into(),
            expected,
            actual,
        }
    }
}
