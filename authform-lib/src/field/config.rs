//! Form configuration: the ordered field list

use serde::Deserialize;
use serde::Serialize;
use sha2::Digest;
use sha2::Sha256;

use super::FieldDescriptor;
use super::LEGACY_HIDDEN_FIELD;
use super::LEGACY_HIDDEN_VALUE;

/// Ordered list of field descriptors defining one form.
///
/// An empty configuration is replaced by the two-field login default
/// (`email`, `password`) through [`FormConfiguration::or_default`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormConfiguration {
    fields: Vec<FieldDescriptor>,
}

impl Default for FormConfiguration {
    fn default() -> Self {
        Self {
            fields: vec![
                FieldDescriptor::email("email").placeholder("Enter your email"),
                FieldDescriptor::password("password").placeholder("Enter your password"),
            ],
        }
    }
}

impl FormConfiguration {
    /// Creates a configuration from an ordered field list.
    pub fn new(fields: Vec<FieldDescriptor>) -> Self {
        Self { fields }
    }

    /// Parses a configuration from a JSON array of descriptors.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Returns this configuration, or the login default if it has no fields.
    pub fn or_default(self) -> Self {
        if self.fields.is_empty() {
            Self::default()
        } else {
            self
        }
    }

    /// Rewrites legacy conventions into explicit descriptors.
    ///
    /// A field named [`LEGACY_HIDDEN_FIELD`] becomes a hidden field forced to
    /// [`LEGACY_HIDDEN_VALUE`], whatever kind it was declared with.
    pub fn normalized(mut self) -> Self {
        for field in &mut self.fields {
            if field.name == LEGACY_HIDDEN_FIELD && !field.is_hidden() {
                log::warn!(
                    "field '{}' declared as {}; treating it as hidden with value {}",
                    field.name,
                    field.kind,
                    LEGACY_HIDDEN_VALUE
                );
                *field = FieldDescriptor::hidden(LEGACY_HIDDEN_FIELD, LEGACY_HIDDEN_VALUE);
            }
        }
        self
    }

    /// Returns all descriptors in order.
    pub fn fields(&self) -> &[FieldDescriptor] {
        &self.fields
    }

    /// Returns the descriptor with the given name.
    pub fn get(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|field| field.name == name)
    }

    /// Returns descriptors that are rendered, in order.
    pub fn visible_fields(&self) -> impl Iterator<Item = &FieldDescriptor> {
        self.fields.iter().filter(|field| !field.is_hidden())
    }

    /// Returns the number of descriptors.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if there are no descriptors.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns `true` if any descriptor uploads files.
    pub fn has_files(&self) -> bool {
        self.fields.iter().any(FieldDescriptor::is_file_like)
    }

    /// Computes a structural fingerprint of the configuration.
    ///
    /// Two configurations with equal descriptors in equal order share a
    /// fingerprint, which keys the memoized schema and layout.
    pub fn fingerprint(&self) -> Fingerprint {
        let mut hasher = Sha256::new();
        for field in &self.fields {
            feed(&mut hasher, field.name.as_bytes());
            feed(&mut hasher, field.kind.as_str().as_bytes());
            feed_opt(&mut hasher, field.placeholder.as_deref());
            feed_opt(&mut hasher, field.label.as_deref());
            match &field.options {
                Some(options) => {
                    hasher.update([1u8]);
                    hasher.update((options.len() as u64).to_le_bytes());
                    for option in options {
                        feed(&mut hasher, option.as_bytes());
                    }
                }
                None => hasher.update([0u8]),
            }
            hasher.update([
                u8::from(field.is_file),
                u8::from(field.is_image),
                u8::from(field.required),
            ]);
            let value = field.value.as_ref().map(ToString::to_string);
            feed_opt(&mut hasher, value.as_deref());
        }
        Fingerprint(hasher.finalize().into())
    }
}

impl From<Vec<FieldDescriptor>> for FormConfiguration {
    fn from(fields: Vec<FieldDescriptor>) -> Self {
        Self::new(fields)
    }
}

impl<'a> IntoIterator for &'a FormConfiguration {
    type Item = &'a FieldDescriptor;
    type IntoIter = std::slice::Iter<'a, FieldDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}

fn feed(hasher: &mut Sha256, bytes: &[u8]) {
    hasher.update((bytes.len() as u64).to_le_bytes());
    hasher.update(bytes);
}

fn feed_opt(hasher: &mut Sha256, value: Option<&str>) {
    match value {
        Some(value) => {
            hasher.update([1u8]);
            feed(hasher, value.as_bytes());
        }
        None => hasher.update([0u8]),
    }
}

/// SHA-256 fingerprint of a [`FormConfiguration`].
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Fingerprint([u8; 32]);

impl Fingerprint {
    /// Returns the raw digest.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for byte in &self.0[..8] {
            write!(f, "{byte:02x}")?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Fingerprint({self})")
    }
}
