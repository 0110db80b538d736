//! Field-level validation failures.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Failures recorded while sanitizing an input tree.
///
/// Keys are field names (or their alias). Values are either a plain message
/// or a nested failure map for object-shaped fields. Serializes as a plain
/// JSON object, e.g. `{"a": {"b": "required"}, "c": "invalid"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationFailure {
    fields: BTreeMap<String, FieldFailure>,
}

/// The failure recorded for one field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldFailure {
    /// A single message, e.g. `"required"`.
    Message(String),
    /// Failures of a nested object.
    Nested(ValidationFailure),
}

impl FieldFailure {
    /// Returns the message if this is a plain message failure.
    #[must_use]
    pub fn as_message(&self) -> Option<&str> {
        match self {
            Self::Message(message) => Some(message),
            Self::Nested(_) => None,
        }
    }

    /// Returns the nested map if this is a nested failure.
    #[must_use]
    pub const fn as_nested(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Nested(nested) => Some(nested),
            Self::Message(_) => None,
        }
    }
}

impl From<String> for FieldFailure {
    fn from(message: String) -> Self {
        Self::Message(message)
    }
}

impl From<&str> for FieldFailure {
    fn from(message: &str) -> Self {
        Self::Message(message.to_string())
    }
}

impl From<ValidationFailure> for FieldFailure {
    fn from(nested: ValidationFailure) -> Self {
        Self::Nested(nested)
    }
}

impl ValidationFailure {
    /// Creates an empty failure map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a failure for a field, replacing any previous entry.
    pub fn insert(&mut self, field: impl Into<String>, failure: impl Into<FieldFailure>) {
        self.fields.insert(field.into(), failure.into());
    }

    /// Returns the failure recorded for a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&FieldFailure> {
        self.fields.get(field)
    }

    /// Follows a dotted path through nested failures and returns the message
    /// found at its end.
    ///
    /// ```
    /// use handlr_core::ValidationFailure;
    ///
    /// let mut inner = ValidationFailure::new();
    /// inner.insert("b", "required");
    /// let mut outer = ValidationFailure::new();
    /// outer.insert("a", inner);
    ///
    /// assert_eq!(outer.message_at("a.b"), Some("required"));
    /// assert_eq!(outer.message_at("a"), None);
    /// ```
    #[must_use]
    pub fn message_at(&self, path: &str) -> Option<&str> {
        let mut current = self;
        let mut segments = path.split('.').peekable();
        while let Some(segment) = segments.next() {
            let failure = current.fields.get(segment)?;
            if segments.peek().is_none() {
                return failure.as_message();
            }
            current = failure.as_nested()?;
        }
        None
    }

    /// Returns `true` if no failures were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Returns the number of failed fields.
    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Iterates over failed field names in sorted order.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.keys().map(String::as_str)
    }

    /// Iterates over `(field, failure)` pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &FieldFailure)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v))
    }
}

impl<K, V> FromIterator<(K, V)> for ValidationFailure
where
    K: Into<String>,
    V: Into<FieldFailure>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut failure = Self::new();
        for (field, value) in iter {
            failure.insert(field, value);
        }
        failure
    }
}
