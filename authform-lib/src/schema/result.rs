use crate::error::FieldError;

/// Result of validating one or more fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ValidationResult {
    /// All fields passed validation.
    #[default]
    Valid,
    /// One or more fields failed validation, in schema order.
    Invalid(Vec<FieldError>),
}

impl ValidationResult {
    pub(crate) fn from_errors(errors: Vec<FieldError>) -> Self {
        if errors.is_empty() {
            Self::Valid
        } else {
            Self::Invalid(errors)
        }
    }

    /// Check if all fields passed validation.
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Check if any field failed validation.
    pub fn is_invalid(&self) -> bool {
        !self.is_valid()
    }

    /// Get all validation errors.
    pub fn errors(&self) -> &[FieldError] {
        match self {
            Self::Valid => &[],
            Self::Invalid(errors) => errors,
        }
    }

    /// Get the error reported for a field (if any).
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors().iter().find(|error| error.field == field)
    }

    /// Get the first validation error (if any).
    pub fn first_error(&self) -> Option<&FieldError> {
        self.errors().first()
    }

    /// Consume the result, returning the errors.
    pub fn into_errors(self) -> Vec<FieldError> {
        match self {
            Self::Valid => Vec::new(),
            Self::Invalid(errors) => errors,
        }
    }
}
