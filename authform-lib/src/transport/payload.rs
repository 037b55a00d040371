//! Outbound payload construction

use serde_json::Map;
use serde_json::Number;
use serde_json::Value;

use crate::challenge::CHALLENGE_PAYLOAD_KEY;
use crate::field::FieldFamily;
use crate::field::FieldKind;
use crate::field::FieldValue;
use crate::field::FileRef;
use crate::field::FormConfiguration;
use crate::field::FormValues;

/// One transmitted value.
#[derive(Debug, Clone, PartialEq)]
pub enum PayloadValue {
    /// Text, passed through unchanged.
    Text(String),
    /// A coerced number field.
    Number(Number),
    /// A number field whose text could not be parsed.
    Null,
    /// The fixed value of a hidden field.
    Json(Value),
    /// An uploaded file.
    File(FileRef),
}

impl PayloadValue {
    /// Returns the value as JSON. Files become an object with their name,
    /// MIME type, size and base64 content.
    pub fn to_json(&self) -> Value {
        match self {
            Self::Text(text) => Value::String(text.clone()),
            Self::Number(number) => Value::Number(number.clone()),
            Self::Null => Value::Null,
            Self::Json(value) => value.clone(),
            Self::File(file) => serde_json::json!({
                "name": file.name(),
                "type": file.mime(),
                "size": file.len(),
                "data": file.to_base64(),
            }),
        }
    }

    /// Returns the value as a multipart text field, or `None` for files.
    pub fn to_form_text(&self) -> Option<String> {
        match self {
            Self::Text(text) => Some(text.clone()),
            Self::Number(number) => Some(number.to_string()),
            Self::Null => Some(String::new()),
            Self::Json(Value::String(text)) => Some(text.clone()),
            Self::Json(value) => Some(value.to_string()),
            Self::File(_) => None,
        }
    }
}

/// The values sent to the transport, in configuration order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Payload {
    entries: Vec<(String, PayloadValue)>,
}

impl Payload {
    /// Creates an empty payload.
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces a value.
    pub fn insert(&mut self, key: impl Into<String>, value: PayloadValue) {
        let key = key.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == key) {
            Some((_, slot)) => *slot = value,
            None => self.entries.push((key, value)),
        }
    }

    /// Returns the value stored under `key`.
    pub fn get(&self, key: &str) -> Option<&PayloadValue> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, value)| value)
    }

    /// Returns `true` if the payload has a value under `key`.
    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Returns the keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    /// Returns the entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PayloadValue)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns `true` if any entry is a file.
    pub fn has_files(&self) -> bool {
        self.entries
            .iter()
            .any(|(_, value)| matches!(value, PayloadValue::File(_)))
    }

    /// Returns the payload as a JSON object.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect();
        Value::Object(map)
    }
}

/// Builds the payload for one submission.
///
/// Every configured field contributes its current value. Number fields are
/// coerced, hidden fields contribute their fixed value and empty values are
/// left out. A challenge token, when given, is added under
/// [`CHALLENGE_PAYLOAD_KEY`].
pub fn build_payload(
    config: &FormConfiguration,
    values: &FormValues,
    challenge_token: Option<&str>,
) -> Payload {
    let mut payload = Payload::new();
    for field in config {
        let value = match field.family() {
            FieldFamily::Hidden => field.value.clone().map(PayloadValue::Json),
            _ => payload_value(field.kind, values.get(&field.name)),
        };
        if let Some(value) = value {
            payload.insert(field.name.clone(), value);
        }
    }
    if let Some(token) = challenge_token {
        payload.insert(CHALLENGE_PAYLOAD_KEY, PayloadValue::Text(token.to_string()));
    }
    payload
}

fn payload_value(kind: FieldKind, value: &FieldValue) -> Option<PayloadValue> {
    match value {
        FieldValue::Empty => None,
        FieldValue::File(file) => Some(PayloadValue::File(file.clone())),
        FieldValue::Text(text) if kind == FieldKind::Number => coerce_number(text),
        FieldValue::Text(text) => Some(PayloadValue::Text(text.clone())),
    }
}

/// Parses number-field text. Empty text is absent, unparsable text is null.
fn coerce_number(text: &str) -> Option<PayloadValue> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    let number = if let Ok(n) = text.parse::<u64>() {
        Some(Number::from(n))
    } else if let Ok(n) = text.parse::<i64>() {
        Some(Number::from(n))
    } else {
        text.parse::<f64>().ok().and_then(Number::from_f64)
    };
    Some(number.map_or(PayloadValue::Null, PayloadValue::Number))
}
