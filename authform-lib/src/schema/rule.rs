//! Per-field rules and their fluent builder.

use std::sync::Arc;

use regex::Regex;

use crate::field::FieldValue;

/// MIME types accepted by image fields.
pub const IMAGE_MIME_TYPES: [&str; 2] = ["image/jpeg", "image/png"];

/// Type alias for custom rule predicates.
type Predicate = Arc<dyn Fn(&FieldValue) -> bool + Send + Sync>;

/// A single constraint on a field value.
///
/// Every rule except [`Rule::Required`] accepts empty values, so optional
/// fields only have their format checked once something was entered.
#[derive(Clone)]
pub enum Rule {
    /// The value must be present and non-empty.
    Required,
    /// The value must be a file.
    File,
    /// The value must be a file with one of these MIME types.
    MimeType(Vec<String>),
    /// The value must be a valid email address.
    Email,
    /// The text must have at least this many characters.
    MinLength(usize),
    /// The text must match this pattern.
    Pattern(Regex),
    /// The value must satisfy a custom predicate.
    Custom(Predicate),
}

impl Rule {
    /// Returns the code reported in [`FieldError::code`](crate::error::FieldError::code).
    pub fn code(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::File => "file",
            Self::MimeType(_) => "file_type",
            Self::Email => "email",
            Self::MinLength(_) => "min_length",
            Self::Pattern(_) => "pattern",
            Self::Custom(_) => "custom",
        }
    }

    /// Checks a value against this rule.
    pub fn accepts(&self, value: &FieldValue) -> bool {
        if let Self::Required = self {
            return !value.is_empty();
        }
        if value.is_empty() {
            return true;
        }
        match self {
            Self::Required => true,
            Self::File => value.as_file().is_some(),
            Self::MimeType(types) => value
                .as_file()
                .is_some_and(|file| types.iter().any(|mime| mime == file.mime())),
            Self::Email => value
                .as_text()
                .is_some_and(email_address::EmailAddress::is_valid),
            Self::MinLength(min) => value
                .as_text()
                .is_some_and(|text| text.chars().count() >= *min),
            Self::Pattern(pattern) => value.as_text().is_some_and(|text| pattern.is_match(text)),
            Self::Custom(predicate) => predicate(value),
        }
    }
}

impl std::fmt::Debug for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Required => f.write_str("Required"),
            Self::File => f.write_str("File"),
            Self::MimeType(types) => f.debug_tuple("MimeType").field(types).finish(),
            Self::Email => f.write_str("Email"),
            Self::MinLength(min) => f.debug_tuple("MinLength").field(min).finish(),
            Self::Pattern(pattern) => f.debug_tuple("Pattern").field(&pattern.as_str()).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

/// A rule paired with the message reported when it fails.
#[derive(Debug, Clone)]
pub struct Check {
    /// The rule.
    pub rule: Rule,
    /// Message reported on failure.
    pub message: String,
}

/// Ordered rules for one field.
///
/// Only the first failing rule is reported.
///
/// # Example
///
/// ```
/// use authform_lib::schema::FieldRule;
///
/// let rule = FieldRule::new()
///     .required("Email is required")
///     .email("Invalid email format");
///
/// assert_eq!(rule.check(&"".into()).unwrap().message, "Email is required");
/// assert_eq!(rule.check(&"nope".into()).unwrap().message, "Invalid email format");
/// assert!(rule.check(&"a@b.co".into()).is_none());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FieldRule {
    checks: Vec<Check>,
}

impl FieldRule {
    /// Creates a rule set with no constraints.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a rule with its failure message.
    pub fn rule(mut self, rule: Rule, msg: impl Into<String>) -> Self {
        self.checks.push(Check {
            rule,
            message: msg.into(),
        });
        self
    }

    /// Require the field to be non-empty.
    pub fn required(self, msg: impl Into<String>) -> Self {
        self.rule(Rule::Required, msg)
    }

    /// Require the value to be a file.
    pub fn file(self, msg: impl Into<String>) -> Self {
        self.rule(Rule::File, msg)
    }

    /// Require the file to have one of the given MIME types.
    pub fn mime_types<I, S>(self, types: I, msg: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let types = types.into_iter().map(Into::into).collect();
        self.rule(Rule::MimeType(types), msg)
    }

    /// Require a valid email address.
    pub fn email(self, msg: impl Into<String>) -> Self {
        self.rule(Rule::Email, msg)
    }

    /// Require minimum length (in characters).
    pub fn min_length(self, min: usize, msg: impl Into<String>) -> Self {
        self.rule(Rule::MinLength(min), msg)
    }

    /// Require the value to match a compiled pattern.
    pub fn pattern(self, pattern: Regex, msg: impl Into<String>) -> Self {
        self.rule(Rule::Pattern(pattern), msg)
    }

    /// Add a custom predicate.
    pub fn custom<F>(self, f: F, msg: impl Into<String>) -> Self
    where
        F: Fn(&FieldValue) -> bool + Send + Sync + 'static,
    {
        self.rule(Rule::Custom(Arc::new(f)), msg)
    }

    /// Returns the first check the value fails, if any.
    pub fn check(&self, value: &FieldValue) -> Option<&Check> {
        self.checks.iter().find(|check| !check.rule.accepts(value))
    }

    /// Returns the checks in order.
    pub fn checks(&self) -> &[Check] {
        &self.checks
    }

    /// Returns `true` if the rules include [`Rule::Required`].
    pub fn is_required(&self) -> bool {
        self.checks
            .iter()
            .any(|check| matches!(check.rule, Rule::Required))
    }
}
