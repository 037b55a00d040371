//! Field configuration model
//!
//! A form is described by an ordered list of [`FieldDescriptor`]s. Each
//! descriptor belongs to exactly one [`FieldFamily`], which decides how it is
//! validated, rendered and transmitted.
//!
//! # Example
//!
//! ```
//! use authform_lib::field::{FieldDescriptor, FieldFamily, FormConfiguration};
//!
//! let config = FormConfiguration::new(vec![
//!     FieldDescriptor::email("email").placeholder("Enter your email"),
//!     FieldDescriptor::select("role", ["admin", "user"]).label("Role"),
//!     FieldDescriptor::image("avatar").label("Avatar"),
//! ]);
//!
//! assert_eq!(config.fields()[2].family(), FieldFamily::File);
//! ```

mod config;
mod value;

pub use config::*;
pub use value::*;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

/// Field name that older configurations use for the fixed account type.
///
/// Configurations containing it are normalized into a [`FieldKind::Hidden`]
/// field carrying [`LEGACY_HIDDEN_VALUE`].
pub const LEGACY_HIDDEN_FIELD: &str = "accountTypeId";

/// Value forced into [`LEGACY_HIDDEN_FIELD`].
pub const LEGACY_HIDDEN_VALUE: i64 = 1;

/// The input kind of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Free text.
    #[default]
    Text,
    /// Email address.
    Email,
    /// Password, at least six characters.
    Password,
    /// Digits only, sent as a number.
    Number,
    /// One of a fixed list of options.
    Select,
    /// Any file.
    File,
    /// A JPEG or PNG image.
    Image,
    /// Not rendered; transmits a fixed value.
    Hidden,
}

impl FieldKind {
    /// Returns the lowercase name used in configuration files and as the
    /// HTML input type.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Email => "email",
            Self::Password => "password",
            Self::Number => "number",
            Self::Select => "select",
            Self::File => "file",
            Self::Image => "image",
            Self::Hidden => "hidden",
        }
    }

    /// Returns `true` for kinds whose value is typed by the user.
    pub fn is_scalar(self) -> bool {
        matches!(self, Self::Text | Self::Email | Self::Password | Self::Number)
    }
}

impl std::fmt::Display for FieldKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rendering and validation family of a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldFamily {
    /// Text, email, password and number inputs.
    Text,
    /// Dropdowns.
    Select,
    /// File and image uploads.
    File,
    /// Fixed values that are never rendered.
    Hidden,
}

impl FieldFamily {
    /// Returns the family name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Select => "select",
            Self::File => "file",
            Self::Hidden => "hidden",
        }
    }
}

fn default_required() -> bool {
    true
}

fn is_true(value: &bool) -> bool {
    *value
}

fn is_false(value: &bool) -> bool {
    !*value
}

/// Declarative description of one form input.
///
/// Deserializes from the camelCase JSON shape used by configuration files:
///
/// ```json
/// { "name": "email", "type": "email", "placeholder": "Enter your email" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldDescriptor {
    /// Payload and validation key; unique within a configuration.
    pub name: String,
    /// Input kind.
    #[serde(rename = "type", alias = "kind", default)]
    pub kind: FieldKind,
    /// Placeholder text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    /// Label text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Choices offered by a select field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    /// Treat the field as a file upload.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_file: bool,
    /// Treat the field as an image upload.
    #[serde(default, skip_serializing_if = "is_false")]
    pub is_image: bool,
    /// Whether an empty value is rejected.
    #[serde(default = "default_required", skip_serializing_if = "is_true")]
    pub required: bool,
    /// Fixed value transmitted by a hidden field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

impl FieldDescriptor {
    /// Creates a required descriptor of the given kind.
    pub fn new(name: impl Into<String>, kind: FieldKind) -> Self {
        Self {
            name: name.into(),
            kind,
            placeholder: None,
            label: None,
            options: None,
            is_file: false,
            is_image: false,
            required: true,
            value: None,
        }
    }

    /// Creates a text field.
    pub fn text(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text)
    }

    /// Creates an email field.
    pub fn email(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Email)
    }

    /// Creates a password field.
    pub fn password(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Password)
    }

    /// Creates a digits-only field that is transmitted as a number.
    pub fn number(name: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Number)
    }

    /// Creates a select field offering `options`.
    pub fn select<I, S>(name: impl Into<String>, options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: Some(options.into_iter().map(Into::into).collect()),
            ..Self::new(name, FieldKind::Select)
        }
    }

    /// Creates a file upload field.
    pub fn file(name: impl Into<String>) -> Self {
        Self {
            is_file: true,
            ..Self::new(name, FieldKind::File)
        }
    }

    /// Creates an image upload field (JPEG or PNG).
    pub fn image(name: impl Into<String>) -> Self {
        Self {
            is_image: true,
            ..Self::new(name, FieldKind::Image)
        }
    }

    /// Creates a hidden field that always transmits `value`.
    pub fn hidden(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            value: Some(value.into()),
            required: false,
            ..Self::new(name, FieldKind::Hidden)
        }
    }

    /// Sets the placeholder text.
    pub fn placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    /// Sets the label text.
    pub fn label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Allows the field to be left empty.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Returns the family this field is validated and rendered as.
    ///
    /// The `isFile`/`isImage` flags take precedence over the kind, so a
    /// `text` descriptor flagged as an image is an upload.
    pub fn family(&self) -> FieldFamily {
        if self.kind == FieldKind::Hidden {
            FieldFamily::Hidden
        } else if self.is_file_like() {
            FieldFamily::File
        } else if self.kind == FieldKind::Select {
            FieldFamily::Select
        } else {
            FieldFamily::Text
        }
    }

    /// Returns `true` for file and image uploads.
    pub fn is_file_like(&self) -> bool {
        self.is_file || self.is_image() || self.kind == FieldKind::File
    }

    /// Returns `true` if uploads are restricted to images.
    pub fn is_image(&self) -> bool {
        self.is_image || self.kind == FieldKind::Image
    }

    /// Returns `true` if the field is never rendered.
    pub fn is_hidden(&self) -> bool {
        self.kind == FieldKind::Hidden
    }

    /// Returns the name used in error messages: label, then placeholder,
    /// then the field name.
    pub fn display_name(&self) -> &str {
        self.label
            .as_deref()
            .or(self.placeholder.as_deref())
            .unwrap_or(&self.name)
    }

    /// Returns the message reported when a required value is missing.
    pub fn required_message(&self) -> String {
        format!("{} is required", self.display_name())
    }

    /// Returns the options of a select field, or an empty slice.
    pub fn options(&self) -> &[String] {
        self.options.as_deref().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_family_resolution() {
        assert_eq!(FieldDescriptor::email("e").family(), FieldFamily::Text);
        assert_eq!(FieldDescriptor::number("n").family(), FieldFamily::Text);
        assert_eq!(
            FieldDescriptor::select("s", ["a"]).family(),
            FieldFamily::Select
        );
        assert_eq!(FieldDescriptor::file("f").family(), FieldFamily::File);
        assert_eq!(FieldDescriptor::image("i").family(), FieldFamily::File);
        assert_eq!(
            FieldDescriptor::hidden("h", 2).family(),
            FieldFamily::Hidden
        );
    }

    #[test]
    fn test_file_flags_override_kind() {
        let mut field = FieldDescriptor::text("doc");
        field.is_image = true;
        assert_eq!(field.family(), FieldFamily::File);
        assert!(field.is_image());
    }

    #[test]
    fn test_display_name_fallbacks() {
        let field = FieldDescriptor::text("username");
        assert_eq!(field.display_name(), "username");

        let field = field.placeholder("Enter your username");
        assert_eq!(field.display_name(), "Enter your username");

        let field = field.label("Username");
        assert_eq!(field.display_name(), "Username");
        assert_eq!(field.required_message(), "Username is required");
    }

    #[test]
    fn test_deserialize_config_shape() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "name": "avatar",
            "type": "text",
            "label": "Avatar",
            "isImage": true
        }))
        .expect("descriptor should deserialize");

        assert_eq!(field.kind, FieldKind::Text);
        assert!(field.is_image);
        assert!(field.required);
        assert_eq!(field.family(), FieldFamily::File);
    }

    #[test]
    fn test_deserialize_kind_alias_and_optional() {
        let field: FieldDescriptor = serde_json::from_value(json!({
            "name": "age",
            "kind": "number",
            "required": false
        }))
        .expect("descriptor should deserialize");

        assert_eq!(field.kind, FieldKind::Number);
        assert!(!field.required);
    }

    #[test]
    fn test_serialize_skips_defaults() {
        let value = serde_json::to_value(FieldDescriptor::email("email")).unwrap();
        assert_eq!(value, json!({ "name": "email", "type": "email" }));
    }
}
