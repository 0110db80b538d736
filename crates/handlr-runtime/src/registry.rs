//! Named middleware, handler definitions and initializers.
//!
//! Entries are registered either directly or through a factory that
//! receives the registry as it stands at registration time. Factories are
//! how a handler picks up named middleware:
//!
//! ```
//! use handlr_runtime::{Entry, HandlerDefinition, Registry};
//! use handlr_middleware::{MiddlewareEntry, Reply};
//! use serde_json::json;
//!
//! let mut registry = Registry::new();
//! registry
//!     .register_middleware(MiddlewareEntry::from_fn("auth", |_c, d, n| Box::pin(n.run(d))).into())
//!     .unwrap();
//!
//! let users: Entry<HandlerDefinition> = Entry::try_factory(|registry| {
//!     let auth = registry.require("auth", &json!({ "role": "admin" }))?;
//!     Ok(HandlerDefinition::from_fn("users.list", |_ctx, _input| {
//!         Box::pin(async { Ok(Reply::new(json!([]))) })
//!     })
//!     .middleware(auth))
//! });
//! registry.register_handler(users).unwrap();
//!
//! assert_eq!(registry.handler_names().collect::<Vec<_>>(), vec!["users.list"]);
//! ```

use handlr_core::Value;
use handlr_middleware::{BoxedMiddleware, GlobalStack, MiddlewareEntry};
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

use crate::definition::HandlerDefinition;
use crate::error::RegistryError;
use crate::initializer::{BoxedInitializer, Initializer};

type Factory<T> = Box<dyn FnOnce(&Registry) -> Result<T, RegistryError> + Send>;

/// A registration entry: a value, or a factory producing it from the
/// registry.
pub enum Entry<T> {
    /// A ready value.
    Value(T),
    /// A factory invoked once, at registration.
    Factory(Factory<T>),
}

impl<T> Entry<T> {
    /// Wraps an infallible factory.
    pub fn factory<F>(factory: F) -> Self
    where
        F: FnOnce(&Registry) -> T + Send + 'static,
    {
        Self::Factory(Box::new(move |registry| Ok(factory(registry))))
    }

    /// Wraps a factory that may fail, e.g. on a missing middleware.
    pub fn try_factory<F>(factory: F) -> Self
    where
        F: FnOnce(&Registry) -> Result<T, RegistryError> + Send + 'static,
    {
        Self::Factory(Box::new(factory))
    }

    fn resolve(self, registry: &Registry) -> Result<T, RegistryError> {
        match self {
            Self::Value(value) => Ok(value),
            Self::Factory(factory) => factory(registry),
        }
    }
}

impl<T> From<T> for Entry<T> {
    fn from(value: T) -> Self {
        Self::Value(value)
    }
}

impl<T> fmt::Debug for Entry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(_) => f.write_str("Entry::Value(..)"),
            Self::Factory(_) => f.write_str("Entry::Factory(..)"),
        }
    }
}

/// Everything registered with a runtime.
#[derive(Default)]
pub struct Registry {
    middleware: IndexMap<String, MiddlewareEntry>,
    handlers: IndexMap<String, HandlerDefinition>,
    initializers: Vec<BoxedInitializer>,
    stack: GlobalStack,
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a middleware. Global entries also join the global stack.
    ///
    /// # Errors
    ///
    /// Fails if the name is taken or the factory fails.
    pub fn register_middleware(&mut self, entry: Entry<MiddlewareEntry>) -> Result<(), RegistryError> {
        let entry = entry.resolve(self)?;
        if self.middleware.contains_key(entry.name()) {
            return Err(RegistryError::DuplicateMiddleware(entry.name().to_string()));
        }

        tracing::debug!(
            middleware = entry.name(),
            global = entry.is_global(),
            priority = entry.priority_value(),
            "middleware registered"
        );
        self.stack.push(&entry);
        self.middleware.insert(entry.name().to_string(), entry);
        Ok(())
    }

    /// Registers a handler definition.
    ///
    /// # Errors
    ///
    /// Fails if the name is empty or taken, or if the factory fails.
    pub fn register_handler(&mut self, entry: Entry<HandlerDefinition>) -> Result<(), RegistryError> {
        let definition = entry.resolve(self)?;
        if definition.name().is_empty() {
            return Err(RegistryError::invalid("", "handler name must not be empty"));
        }
        if self.handlers.contains_key(definition.name()) {
            return Err(RegistryError::DuplicateHandler(definition.name().to_string()));
        }

        tracing::debug!(handler = definition.name(), dev = definition.is_dev(), "handler registered");
        self.handlers.insert(definition.name().to_string(), definition);
        Ok(())
    }

    /// Registers an initializer.
    ///
    /// # Errors
    ///
    /// Fails if the factory fails.
    pub fn register_initializer(&mut self, entry: Entry<BoxedInitializer>) -> Result<(), RegistryError> {
        let initializer = entry.resolve(self)?;
        tracing::debug!(initializer = initializer.name(), "initializer registered");
        self.initializers.push(initializer);
        Ok(())
    }

    /// Resolves a named middleware for a handler.
    ///
    /// The entry's generator builds a specialized middleware from `options`;
    /// without a generator, or when it declines, the default middleware is
    /// returned.
    #[must_use]
    pub fn middleware(&self, name: &str, options: &Value) -> Option<BoxedMiddleware> {
        self.middleware.get(name).map(|entry| entry.instantiate(options))
    }

    /// Like [`Registry::middleware`], failing on unknown names.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::UnknownMiddleware`].
    pub fn require(&self, name: &str, options: &Value) -> Result<BoxedMiddleware, RegistryError> {
        self.middleware(name, options)
            .ok_or_else(|| RegistryError::UnknownMiddleware(name.to_string()))
    }

    /// Returns the registered middleware entry with this name.
    #[must_use]
    pub fn middleware_entry(&self, name: &str) -> Option<&MiddlewareEntry> {
        self.middleware.get(name)
    }

    /// Returns the handler definition with this name.
    #[must_use]
    pub fn handler(&self, name: &str) -> Option<&HandlerDefinition> {
        self.handlers.get(name)
    }

    /// Iterates over handler definitions in registration order.
    pub fn handlers(&self) -> impl Iterator<Item = &HandlerDefinition> {
        self.handlers.values()
    }

    /// Iterates over handler names in registration order.
    pub fn handler_names(&self) -> impl Iterator<Item = &str> {
        self.handlers.keys().map(String::as_str)
    }

    /// Returns the initializers in registration order.
    #[must_use]
    pub fn initializers(&self) -> &[BoxedInitializer] {
        &self.initializers
    }

    /// Returns the global middleware stack.
    #[must_use]
    pub const fn global_stack(&self) -> &GlobalStack {
        &self.stack
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("middleware", &self.middleware.keys().collect::<Vec<_>>())
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .field("initializers", &self.initializers.len())
            .field("stack", &self.stack)
            .finish()
    }
}

impl Entry<BoxedInitializer> {
    /// Wraps an initializer value.
    pub fn initializer(initializer: impl Initializer) -> Self {
        Self::Value(Arc::new(initializer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use handlr_middleware::Reply;
    use serde_json::json;

    fn pass(name: &str) -> MiddlewareEntry {
        MiddlewareEntry::from_fn(name, |_c, d, n| Box::pin(n.run(d)))
    }

    fn noop(name: &str) -> HandlerDefinition {
        HandlerDefinition::from_fn(name, |_ctx, _input| Box::pin(async { Ok(Reply::empty()) }))
    }

    #[test]
    fn test_duplicate_handler_rejected() {
        let mut registry = Registry::new();
        registry.register_handler(noop("a").into()).unwrap();

        let err = registry.register_handler(noop("a").into()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateHandler("a".into()));
        assert_eq!(registry.handlers().count(), 1);
    }

    #[test]
    fn test_empty_handler_name_rejected() {
        let mut registry = Registry::new();
        let err = registry.register_handler(noop("").into()).unwrap_err();
        assert!(matches!(err, RegistryError::InvalidDefinition { .. }));
    }

    #[test]
    fn test_duplicate_middleware_rejected() {
        let mut registry = Registry::new();
        registry.register_middleware(pass("auth").global().into()).unwrap();

        let err = registry.register_middleware(pass("auth").global().into()).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateMiddleware("auth".into()));
        assert_eq!(registry.global_stack().len(), 1);
    }

    #[test]
    fn test_only_global_middleware_join_stack() {
        let mut registry = Registry::new();
        registry.register_middleware(pass("a").global().into()).unwrap();
        registry.register_middleware(pass("b").into()).unwrap();

        assert_eq!(registry.global_stack().len(), 1);
        assert!(registry.middleware_entry("b").is_some());
    }

    #[test]
    fn test_middleware_lookup_uses_generator() {
        let mut registry = Registry::new();
        let entry = pass("limit").generate(|options| {
            options.get("max").and_then(Value::as_u64).map(|max| pass(&format!("limit:{max}")).middleware())
        });
        registry.register_middleware(entry.into()).unwrap();

        assert_eq!(registry.middleware("limit", &json!({ "max": 3 })).unwrap().name(), "limit:3");
        assert_eq!(registry.middleware("limit", &Value::Null).unwrap().name(), "limit");
        assert!(registry.middleware("missing", &Value::Null).is_none());
        assert_eq!(
            registry.require("missing", &Value::Null).err().unwrap(),
            RegistryError::UnknownMiddleware("missing".into())
        );
    }

    #[test]
    fn test_factory_sees_earlier_registrations() {
        let mut registry = Registry::new();
        registry.register_middleware(pass("auth").into()).unwrap();

        registry
            .register_handler(Entry::try_factory(|registry| {
                Ok(noop("secure").middleware(registry.require("auth", &Value::Null)?))
            }))
            .unwrap();

        let err = registry
            .register_handler(Entry::try_factory(|registry| {
                Ok(noop("broken").middleware(registry.require("csrf", &Value::Null)?))
            }))
            .unwrap_err();

        assert_eq!(err, RegistryError::UnknownMiddleware("csrf".into()));
        assert_eq!(registry.handler("secure").unwrap().local_middleware()[0].name(), "auth");
        assert!(registry.handler("broken").is_none());
    }

    #[test]
    fn test_middleware_factory() {
        let mut registry = Registry::new();
        registry
            .register_middleware(Entry::factory(|_registry| pass("late").global().priority(5)))
            .unwrap();
        assert_eq!(registry.middleware_entry("late").unwrap().priority_value(), 5);
    }
}
