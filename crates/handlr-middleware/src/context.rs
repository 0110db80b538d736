//! Execution and request contexts.
//!
//! [`ExecutionContext`] is built once by `initialize` and shared read-only
//! by every invocation. [`RequestData`] is the mutable state of a single
//! invocation, threaded through every middleware frame.

use handlr_config::{RuntimeMode, Settings};
use handlr_core::{HandlrError, Map, Value};
use http::StatusCode;
use indexmap::IndexMap;
use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use crate::pipeline::{InstalledHandler, Outcome};

/// Type-keyed storage for arbitrary values.
///
/// # Example
///
/// ```
/// use handlr_middleware::Extensions;
///
/// #[derive(Debug, PartialEq)]
/// struct Pool(u32);
///
/// let mut extensions = Extensions::new();
/// extensions.insert(Pool(8));
///
/// assert_eq!(extensions.get::<Pool>(), Some(&Pool(8)));
/// assert!(extensions.contains::<Pool>());
/// ```
#[derive(Default)]
pub struct Extensions {
    map: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl Extensions {
    /// Creates an empty extension map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a value, replacing any previous value of the same type.
    pub fn insert<T: Send + Sync + 'static>(&mut self, value: T) {
        self.map.insert(TypeId::of::<T>(), Box::new(value));
    }

    /// Returns the stored value of type `T`.
    #[must_use]
    pub fn get<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.map.get(&TypeId::of::<T>()).and_then(|v| v.downcast_ref())
    }

    /// Returns the stored value of type `T` mutably.
    pub fn get_mut<T: Send + Sync + 'static>(&mut self) -> Option<&mut T> {
        self.map.get_mut(&TypeId::of::<T>()).and_then(|v| v.downcast_mut())
    }

    /// Removes and returns the stored value of type `T`.
    pub fn remove<T: Send + Sync + 'static>(&mut self) -> Option<T> {
        self.map
            .remove(&TypeId::of::<T>())
            .and_then(|v| v.downcast().ok())
            .map(|b| *b)
    }

    /// Checks if a value of type `T` is stored.
    #[must_use]
    pub fn contains<T: Send + Sync + 'static>(&self) -> bool {
        self.map.contains_key(&TypeId::of::<T>())
    }

    /// Removes every stored value.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl fmt::Debug for Extensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Extensions").field("len", &self.map.len()).finish()
    }
}

/// Mutable state of one invocation.
///
/// Created by the caller with the raw input, then passed to
/// [`InstalledHandler::call`]. Every middleware frame sees the same value.
///
/// ```
/// use handlr_middleware::RequestData;
/// use serde_json::json;
///
/// let data = RequestData::from_value(json!({ "id": 7 }));
/// assert_eq!(data.input["id"], json!(7));
/// assert_eq!(data.status, http::StatusCode::OK);
/// ```
#[derive(Debug)]
pub struct RequestData {
    /// Input fields. Sanitized fields are merged back after the core step.
    pub input: Map<String, Value>,
    /// The failure caught by the engine, if any.
    pub error: Option<HandlrError>,
    /// The response body.
    pub response: Value,
    /// The response status.
    pub status: StatusCode,
    /// Per-invocation values shared between middleware.
    pub extensions: Extensions,
}

impl Default for RequestData {
    fn default() -> Self {
        Self::new(Map::new())
    }
}

impl RequestData {
    /// Creates request data from input fields.
    #[must_use]
    pub fn new(input: Map<String, Value>) -> Self {
        Self {
            input,
            error: None,
            response: Value::Object(Map::new()),
            status: StatusCode::OK,
            extensions: Extensions::new(),
        }
    }

    /// Creates request data from a JSON value.
    ///
    /// Non-object values produce empty input.
    #[must_use]
    pub fn from_value(input: Value) -> Self {
        match input {
            Value::Object(map) => Self::new(map),
            _ => Self::default(),
        }
    }

    /// Resets the per-invocation outputs: no error, `{}` response, 200.
    pub fn reset(&mut self) {
        self.error = None;
        self.response = Value::Object(Map::new());
        self.status = StatusCode::OK;
    }
}

/// Process-wide context produced by `initialize`.
///
/// Holds the installed handlers, the settings tree, the runtime mode and
/// values placed there by initializers.
#[derive(Debug, Default)]
pub struct ExecutionContext {
    handlers: IndexMap<String, InstalledHandler>,
    settings: Settings,
    mode: RuntimeMode,
    extensions: Extensions,
}

impl ExecutionContext {
    /// Creates a context with no handlers installed.
    #[must_use]
    pub fn new(settings: Settings, mode: RuntimeMode) -> Self {
        Self {
            handlers: IndexMap::new(),
            settings,
            mode,
            extensions: Extensions::new(),
        }
    }

    /// Returns the settings tree.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the settings tree mutably.
    pub fn settings_mut(&mut self) -> &mut Settings {
        &mut self.settings
    }

    /// Returns the runtime mode.
    #[must_use]
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Returns values stored by initializers.
    #[must_use]
    pub const fn extensions(&self) -> &Extensions {
        &self.extensions
    }

    /// Returns values stored by initializers, mutably.
    pub fn extensions_mut(&mut self) -> &mut Extensions {
        &mut self.extensions
    }

    /// Shorthand for `extensions().get::<T>()`.
    #[must_use]
    pub fn extension<T: Send + Sync + 'static>(&self) -> Option<&T> {
        self.extensions.get()
    }

    /// Installs a handler, replacing any handler with the same name.
    pub fn install(&mut self, handler: InstalledHandler) -> Option<InstalledHandler> {
        self.handlers.insert(handler.name().to_string(), handler)
    }

    /// Returns the installed handler with the given name.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<&InstalledHandler> {
        self.handlers.get(name)
    }

    /// Returns `true` if a handler with the given name is installed.
    #[must_use]
    pub fn has_handler(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    /// Iterates over installed handler names in installation order.
    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Invokes the named handler.
    ///
    /// Returns `None` if no handler with that name is installed.
    pub async fn call(&self, name: &str, data: &mut RequestData) -> Option<Outcome> {
        let handler = self.handlers.get(name)?;
        Some(handler.call(self, data).await)
    }
}
