//! Field values held by a form

use std::collections::BTreeMap;
use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

/// A file selected for an upload field.
///
/// Cheap to clone; the contents are shared.
#[derive(Clone, PartialEq, Eq)]
pub struct FileRef {
    name: String,
    mime: String,
    bytes: Arc<[u8]>,
}

impl FileRef {
    /// Creates a file from its name, MIME type and contents.
    pub fn new(name: impl Into<String>, mime: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            mime: mime.into(),
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Returns the file name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the MIME type, e.g. `image/png`.
    pub fn mime(&self) -> &str {
        &self.mime
    }

    /// Returns the file contents.
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the size in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns `true` if the file has no contents.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the contents encoded as standard base64.
    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.bytes)
    }

    /// Returns a `data:` URI that previews the file inline.
    pub fn preview_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime, self.to_base64())
    }
}

impl std::fmt::Debug for FileRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FileRef")
            .field("name", &self.name)
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Current value of one field.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum FieldValue {
    /// Nothing entered yet.
    #[default]
    Empty,
    /// Raw text as typed or selected.
    Text(String),
    /// A selected file.
    File(FileRef),
}

impl FieldValue {
    /// Returns `true` if there is no value or the text is empty.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(text) => text.is_empty(),
            Self::File(_) => false,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the file, if this is a file value.
    pub fn as_file(&self) -> Option<&FileRef> {
        match self {
            Self::File(file) => Some(file),
            _ => None,
        }
    }

    /// Returns the value's variant name.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Text(_) => "text",
            Self::File(_) => "file",
        }
    }
}

impl From<&str> for FieldValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for FieldValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<FileRef> for FieldValue {
    fn from(value: FileRef) -> Self {
        Self::File(value)
    }
}

static EMPTY: FieldValue = FieldValue::Empty;

/// Values of all fields in a form, keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormValues {
    values: BTreeMap<String, FieldValue>,
}

impl FormValues {
    /// Creates an empty value set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a value, builder style.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.set(name, value);
        self
    }

    /// Returns the value of a field; missing fields read as [`FieldValue::Empty`].
    pub fn get(&self, name: &str) -> &FieldValue {
        self.values.get(name).unwrap_or(&EMPTY)
    }

    /// Sets the value of a field.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<FieldValue>) {
        self.values.insert(name.into(), value.into());
    }

    /// Removes a field's value.
    pub fn remove(&mut self, name: &str) -> Option<FieldValue> {
        self.values.remove(name)
    }

    /// Keeps only the fields for which `keep` returns `true`.
    pub fn retain(&mut self, mut keep: impl FnMut(&str) -> bool) {
        self.values.retain(|name, _| keep(name));
    }

    /// Returns the number of stored values.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` if no values are stored.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Iterates over stored values in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.values.iter().map(|(name, value)| (name.as_str(), value))
    }
}

impl<K, V> FromIterator<(K, V)> for FormValues
where
    K: Into<String>,
    V: Into<FieldValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut values = Self::new();
        for (name, value) in iter {
            values.set(name, value);
        }
        values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emptiness() {
        assert!(FieldValue::Empty.is_empty());
        assert!(FieldValue::from("").is_empty());
        assert!(!FieldValue::from(" ").is_empty());
        assert!(!FieldValue::File(FileRef::new("a.txt", "text/plain", Vec::new())).is_empty());
    }

    #[test]
    fn test_preview_uri() {
        let file = FileRef::new("dot.png", "image/png", vec![0x89, b'P', b'N', b'G']);
        assert_eq!(file.preview_uri(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_missing_values_read_empty() {
        let values = FormValues::new().with("email", "a@b.co");
        assert_eq!(values.get("email").as_text(), Some("a@b.co"));
        assert_eq!(values.get("password"), &FieldValue::Empty);
    }

    #[test]
    fn test_file_debug_omits_contents() {
        let file = FileRef::new("secret.bin", "application/octet-stream", vec![1, 2, 3]);
        let debug = format!("{file:?}");
        assert!(debug.contains("len: 3"));
        assert!(!debug.contains("[1, 2, 3]"));
    }
}
