//! Validation schemas
//!
//! A [`ValidationSchema`] maps field names to [`FieldRule`]s. Schemas are
//! either derived from a [`FormConfiguration`] with [`build`], or assembled by
//! the host and passed to the engine as an override.
//!
//! # Example
//!
//! ```
//! use authform_lib::field::{FieldValue, FormConfiguration, FormValues};
//! use authform_lib::schema;
//!
//! let schema = schema::build(&FormConfiguration::default()).unwrap();
//! let result = schema.validate(&FormValues::new());
//!
//! let messages: Vec<_> = result.errors().iter().map(|e| e.message.as_str()).collect();
//! assert_eq!(messages, ["Enter your email is required", "Enter your password is required"]);
//! ```

mod result;
mod rule;

pub use result::ValidationResult;
pub use rule::*;

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::ConfigError;
use crate::error::FieldError;
use crate::field::FieldDescriptor;
use crate::field::FieldFamily;
use crate::field::FieldKind;
use crate::field::FieldValue;
use crate::field::FormConfiguration;
use crate::field::FormValues;

/// Minimum password length enforced by derived schemas.
pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Message reported when a file field holds something other than a file.
pub const FILE_MESSAGE: &str = "File is required";
/// Message reported when an image field holds a non-image file.
pub const IMAGE_TYPE_MESSAGE: &str = "Only image files are allowed (jpg, png)";
/// Message reported for malformed email addresses.
pub const EMAIL_MESSAGE: &str = "Invalid email format";
/// Message reported for short passwords.
pub const PASSWORD_MESSAGE: &str = "Password must be at least 6 characters";
/// Message reported for non-digit input in number fields.
pub const NUMBER_MESSAGE: &str = "Only numbers are allowed";

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").expect("valid digits pattern"));

/// Compiled per-field rules, in field order.
#[derive(Debug, Clone, Default)]
pub struct ValidationSchema {
    rules: Vec<(String, FieldRule)>,
}

impl ValidationSchema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the rules for a field, replacing any previous rules for it.
    pub fn field(mut self, name: impl Into<String>, rule: FieldRule) -> Self {
        self.insert(name, rule);
        self
    }

    /// Sets the rules for a field, replacing any previous rules for it.
    pub fn insert(&mut self, name: impl Into<String>, rule: FieldRule) {
        let name = name.into();
        match self.rules.iter_mut().find(|(existing, _)| *existing == name) {
            Some((_, existing)) => *existing = rule,
            None => self.rules.push((name, rule)),
        }
    }

    /// Returns the rules for a field.
    pub fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.rules
            .iter()
            .find(|(existing, _)| existing == name)
            .map(|(_, rule)| rule)
    }

    /// Returns the validated field names in order.
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.rules.iter().map(|(name, _)| name.as_str())
    }

    /// Returns the number of validated fields.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns `true` if no field is validated.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Validates a single value against the rules of `name`.
    ///
    /// Fields without rules always pass.
    pub fn validate_field(&self, name: &str, value: &FieldValue) -> Option<FieldError> {
        let check = self.rule(name)?.check(value)?;
        Some(FieldError::with_code(
            name,
            check.message.clone(),
            check.rule.code(),
        ))
    }

    /// Validates every field of the schema, reporting at most one error per
    /// field.
    pub fn validate(&self, values: &FormValues) -> ValidationResult {
        let errors = self
            .rules
            .iter()
            .filter_map(|(name, _)| self.validate_field(name, values.get(name)))
            .collect();
        ValidationResult::from_errors(errors)
    }

    /// Derives a schema from a configuration. Alias for [`build`].
    pub fn from_config(config: &FormConfiguration) -> Result<Self, ConfigError> {
        build(config)
    }
}

/// Checks the structural invariants of a configuration.
///
/// Names must be non-empty and unique, select fields need options and hidden
/// fields need a value.
pub fn check(config: &FormConfiguration) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();
    for (index, field) in config.fields().iter().enumerate() {
        if field.name.is_empty() {
            return Err(ConfigError::EmptyName { index });
        }
        if !seen.insert(field.name.as_str()) {
            return Err(ConfigError::DuplicateName {
                field: field.name.clone(),
            });
        }
        match field.family() {
            FieldFamily::Select if field.options().is_empty() => {
                return Err(ConfigError::MissingOptions {
                    field: field.name.clone(),
                });
            }
            FieldFamily::Hidden if field.value.is_none() => {
                return Err(ConfigError::MissingHiddenValue {
                    field: field.name.clone(),
                });
            }
            _ => {}
        }
    }
    Ok(())
}

/// Derives a validation schema from a configuration.
///
/// Deterministic and free of side effects. Malformed descriptors are
/// reported here rather than when the configuration is created.
pub fn build(config: &FormConfiguration) -> Result<ValidationSchema, ConfigError> {
    check(config)?;

    let mut schema = ValidationSchema::new();
    for field in config {
        if let Some(rule) = field_rule(field) {
            schema.insert(field.name.clone(), rule);
        }
    }
    Ok(schema)
}

fn field_rule(field: &FieldDescriptor) -> Option<FieldRule> {
    let mut rule = FieldRule::new();
    if field.required {
        rule = rule.required(field.required_message());
    }

    match field.family() {
        FieldFamily::Hidden => return None,
        FieldFamily::File => {
            rule = rule.file(FILE_MESSAGE);
            if field.is_image() {
                rule = rule.mime_types(IMAGE_MIME_TYPES, IMAGE_TYPE_MESSAGE);
            }
        }
        FieldFamily::Select => {}
        FieldFamily::Text => match field.kind {
            FieldKind::Email => rule = rule.email(EMAIL_MESSAGE),
            FieldKind::Password => rule = rule.min_length(MIN_PASSWORD_LENGTH, PASSWORD_MESSAGE),
            FieldKind::Number => rule = rule.pattern(DIGITS.clone(), NUMBER_MESSAGE),
            _ => {}
        },
    }
    Some(rule)
}
