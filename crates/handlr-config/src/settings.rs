//! The process-wide settings tree.
//!
//! [`Settings`] is a free-form JSON object addressed with dotted paths.
//! Handlers and initializers read it through the execution context; it is
//! written during setup with `Handlr::set` or by the [`ConfigLoader`].
//!
//! [`ConfigLoader`]: crate::ConfigLoader

use handlr_core::{path, Map, Value};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// A JSON settings tree with dotted-path access.
///
/// # Example
///
/// ```
/// use handlr_config::Settings;
/// use serde_json::json;
///
/// let mut settings = Settings::new();
/// settings.set("db.pool.size", json!(8));
///
/// assert_eq!(settings.get("db.pool.size"), Some(&json!(8)));
/// assert_eq!(settings.get_as::<u32>("db.pool.size").unwrap(), Some(8));
/// assert_eq!(settings.get("db.url"), None);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Settings {
    tree: Map<String, Value>,
}

impl Settings {
    /// Creates an empty settings tree.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes `value` at a dotted path, creating intermediate objects.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) {
        path::put(&mut self.tree, path, value.into());
    }

    /// Reads the value at a dotted path.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        path::pick_in(&self.tree, path)
    }

    /// Reads and deserializes the value at a dotted path.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the value does not
    /// deserialize into `T`.
    pub fn get_as<T: DeserializeOwned>(&self, path: &str) -> Result<Option<T>, ConfigError> {
        self.get(path)
            .map(|value| {
                T::deserialize(value).map_err(|e| ConfigError::invalid_value(path, e.to_string()))
            })
            .transpose()
    }

    /// Returns `true` if a value exists at the path.
    #[must_use]
    pub fn contains(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    /// Removes and returns the value at a dotted path.
    pub fn remove(&mut self, path: &str) -> Option<Value> {
        path::remove(&mut self.tree, path)
    }

    /// Deep-merges `other` into this tree.
    ///
    /// Objects merge key by key; any other value replaces what was there.
    pub fn merge(&mut self, other: Map<String, Value>) {
        merge_into(&mut self.tree, other);
    }

    /// Returns the underlying object.
    #[must_use]
    pub const fn as_map(&self) -> &Map<String, Value> {
        &self.tree
    }

    /// Returns `true` if nothing has been set.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl From<Map<String, Value>> for Settings {
    fn from(tree: Map<String, Value>) -> Self {
        Self { tree }
    }
}

impl From<Settings> for Value {
    fn from(settings: Settings) -> Self {
        Self::Object(settings.tree)
    }
}

pub(crate) fn merge_into(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match (target.get_mut(&key), value) {
            (Some(Value::Object(existing)), Value::Object(incoming)) => merge_into(existing, incoming),
            (_, value) => {
                target.insert(key, value);
            }
        }
    }
}
