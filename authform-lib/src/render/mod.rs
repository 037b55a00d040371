//! Field rendering
//!
//! Each field family has a capability trait ([`TextRenderer`],
//! [`SelectRenderer`], [`FileRenderer`]) and the submit control has
//! [`ButtonRenderer`]. Hosts inject their own components through
//! [`Renderers`]; anything left unset uses [`BuiltinRenderer`], which emits
//! minimal HTML.
//!
//! # Example
//!
//! ```
//! use authform_lib::render::{Markup, Renderers, TextProps, TextRenderer};
//!
//! struct Fancy;
//!
//! impl TextRenderer for Fancy {
//!     fn render_text(&self, props: &TextProps) -> Markup {
//!         Markup::from(format!("<fancy-input name=\"{}\"/>", props.name))
//!     }
//! }
//!
//! let renderers = Renderers::default().with_text(Fancy);
//! ```

mod builtin;
mod plan;

pub use builtin::BuiltinRenderer;
pub use plan::*;

use std::sync::Arc;

use crate::field::FieldKind;
use crate::field::FieldValue;
use crate::field::FileRef;

// =============================================================================
// Markup
// =============================================================================

/// Rendered output of a component.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Markup(String);

impl Markup {
    /// Creates markup from a string.
    pub fn new(markup: impl Into<String>) -> Self {
        Self(markup.into())
    }

    /// Returns the markup as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consumes the markup, returning the string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl From<String> for Markup {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

impl From<&str> for Markup {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}

impl std::fmt::Display for Markup {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Bindings
// =============================================================================

type ChangeFn = Arc<dyn Fn(FieldValue) + Send + Sync>;

/// Writes a new value back into the form that rendered a field.
///
/// Every change is validated immediately.
#[derive(Clone)]
pub struct ChangeHandler {
    field: String,
    apply: ChangeFn,
}

impl ChangeHandler {
    /// Creates a handler that forwards values to `apply`.
    pub fn new<F>(field: impl Into<String>, apply: F) -> Self
    where
        F: Fn(FieldValue) + Send + Sync + 'static,
    {
        Self {
            field: field.into(),
            apply: Arc::new(apply),
        }
    }

    /// Creates a handler that discards every value.
    pub fn noop(field: impl Into<String>) -> Self {
        Self::new(field, |_| {})
    }

    /// Returns the name of the bound field.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Sets the field's value.
    pub fn set(&self, value: impl Into<FieldValue>) {
        (self.apply)(value.into());
    }

    /// Sets the field's text.
    pub fn set_text(&self, text: impl Into<String>) {
        self.set(FieldValue::Text(text.into()));
    }

    /// Stores the first of the selected files; an empty selection is ignored.
    pub fn select_files<I>(&self, files: I)
    where
        I: IntoIterator<Item = FileRef>,
    {
        if let Some(file) = files.into_iter().next() {
            self.set(FieldValue::File(file));
        }
    }
}

impl std::fmt::Debug for ChangeHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeHandler")
            .field("field", &self.field)
            .finish_non_exhaustive()
    }
}

/// Controlled binding for select components: current value, validation
/// error and change handler.
#[derive(Debug, Clone)]
pub struct SelectController {
    value: String,
    error: Option<String>,
    on_change: ChangeHandler,
}

impl SelectController {
    /// Creates a controller.
    pub fn new(value: impl Into<String>, error: Option<String>, on_change: ChangeHandler) -> Self {
        Self {
            value: value.into(),
            error,
            on_change,
        }
    }

    /// Returns the selected option, or an empty string.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Returns the validation error message.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Selects an option.
    pub fn change(&self, option: impl Into<String>) {
        self.on_change.set_text(option);
    }
}

// =============================================================================
// Props
// =============================================================================

/// Props for text, email, password and number inputs.
#[derive(Debug, Clone)]
pub struct TextProps {
    /// Field name.
    pub name: String,
    /// HTML input type.
    pub input_type: FieldKind,
    /// Placeholder text.
    pub placeholder: Option<String>,
    /// Current text.
    pub value: String,
    /// Whether the field has a validation error.
    pub error: bool,
    /// Validation error message.
    pub helper_text: Option<String>,
    /// Whether the input should fill its cell.
    pub full_width: bool,
    /// Binding back into the form.
    pub on_change: ChangeHandler,
}

/// Props for dropdowns.
#[derive(Debug, Clone)]
pub struct SelectProps {
    /// Field name.
    pub name: String,
    /// Label, falling back to the placeholder.
    pub label: Option<String>,
    /// Offered options, in order.
    pub options: Vec<String>,
    /// Whether the field has a validation error.
    pub error: bool,
    /// Validation error message.
    pub helper_text: Option<String>,
    /// Controlled value and change handler.
    pub controller: SelectController,
}

/// Props for file and image uploads.
#[derive(Debug, Clone)]
pub struct FileProps {
    /// Field name.
    pub name: String,
    /// Label text.
    pub label: Option<String>,
    /// Whether the field has a validation error.
    pub error: bool,
    /// Validation error message.
    pub helper_text: Option<String>,
    /// Accepted MIME types, for image fields.
    pub accept: Option<String>,
    /// Name of the stored file.
    pub file_name: Option<String>,
    /// Inline preview of a stored image.
    pub preview: Option<String>,
    /// Receives the selected files.
    pub on_change: ChangeHandler,
}

/// Props for the submit control.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonProps {
    /// Whether a submission is in flight.
    pub is_loading: bool,
    /// Button content.
    pub label: String,
}

// =============================================================================
// Capabilities
// =============================================================================

/// Renders text-family fields.
pub trait TextRenderer: Send + Sync {
    /// Renders one input.
    fn render_text(&self, props: &TextProps) -> Markup;
}

/// Renders select fields.
pub trait SelectRenderer: Send + Sync {
    /// Renders one dropdown.
    fn render_select(&self, props: &SelectProps) -> Markup;
}

/// Renders file and image fields.
pub trait FileRenderer: Send + Sync {
    /// Renders one upload control.
    fn render_file(&self, props: &FileProps) -> Markup;
}

/// Renders the submit control.
pub trait ButtonRenderer: Send + Sync {
    /// Renders the button.
    fn render_button(&self, props: &ButtonProps) -> Markup;
}

/// The renderer used for each family.
#[derive(Clone)]
pub struct Renderers {
    text: Arc<dyn TextRenderer>,
    select: Arc<dyn SelectRenderer>,
    file: Arc<dyn FileRenderer>,
    button: Arc<dyn ButtonRenderer>,
}

impl Default for Renderers {
    fn default() -> Self {
        Self {
            text: Arc::new(BuiltinRenderer),
            select: Arc::new(BuiltinRenderer),
            file: Arc::new(BuiltinRenderer),
            button: Arc::new(BuiltinRenderer),
        }
    }
}

impl Renderers {
    /// Uses the built-in renderer for every family.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the renderer for text-family fields.
    pub fn with_text(mut self, renderer: impl TextRenderer + 'static) -> Self {
        self.text = Arc::new(renderer);
        self
    }

    /// Sets the renderer for select fields.
    pub fn with_select(mut self, renderer: impl SelectRenderer + 'static) -> Self {
        self.select = Arc::new(renderer);
        self
    }

    /// Sets the renderer for file and image fields.
    pub fn with_file(mut self, renderer: impl FileRenderer + 'static) -> Self {
        self.file = Arc::new(renderer);
        self
    }

    /// Sets the renderer for the submit control.
    pub fn with_button(mut self, renderer: impl ButtonRenderer + 'static) -> Self {
        self.button = Arc::new(renderer);
        self
    }

    /// Returns the text-family renderer.
    pub fn text(&self) -> &dyn TextRenderer {
        self.text.as_ref()
    }

    /// Returns the select renderer.
    pub fn select(&self) -> &dyn SelectRenderer {
        self.select.as_ref()
    }

    /// Returns the file renderer.
    pub fn file(&self) -> &dyn FileRenderer {
        self.file.as_ref()
    }

    /// Returns the button renderer.
    pub fn button(&self) -> &dyn ButtonRenderer {
        self.button.as_ref()
    }
}

impl std::fmt::Debug for Renderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderers").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[test]
    fn test_select_files_keeps_first() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let handler = ChangeHandler::new("avatar", move |value| sink.lock().unwrap().push(value));

        handler.select_files(Vec::new());
        handler.select_files([
            FileRef::new("a.png", "image/png", vec![1]),
            FileRef::new("b.png", "image/png", vec![2]),
        ]);

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].as_file().map(FileRef::name), Some("a.png"));
    }

    #[test]
    fn test_controller_forwards_changes() {
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        let handler = ChangeHandler::new("plan", move |value| *sink.lock().unwrap() = Some(value));
        let controller = SelectController::new("", None, handler);

        controller.change("pro");
        assert_eq!(*seen.lock().unwrap(), Some(FieldValue::from("pro")));
    }

    struct Shout;

    impl ButtonRenderer for Shout {
        fn render_button(&self, props: &ButtonProps) -> Markup {
            Markup::from(props.label.to_uppercase())
        }
    }

    #[test]
    fn test_custom_renderer_replaces_default() {
        let props = ButtonProps {
            is_loading: false,
            label: "Submit".into(),
        };
        let default = Renderers::new();
        let custom = Renderers::new().with_button(Shout);
        assert_eq!(
            default.button().render_button(&props).as_str(),
            "<button type=\"submit\">Submit</button>"
        );
        assert_eq!(custom.button().render_button(&props).as_str(), "SUBMIT");
    }
}
