//! The `Handlr` runtime.
//!
//! Collects registrations and configuration, then builds an
//! [`ExecutionContext`] with one installed pipeline per handler.
//!
//! # Lifecycle
//!
//! 1. Register middleware, handlers and initializers; set configuration
//! 2. [`Handlr::initialize`] runs initializers in registration order
//! 3. The global stack is sorted once by priority
//! 4. Each handler's schema is compiled and its pipeline installed
//!
//! Development-only handlers are skipped in production mode.

use handlr_config::{HandlrConfig, RuntimeMode, Settings};
use handlr_core::{HandlrResult, Value};
use handlr_middleware::{ExecutionContext, InstalledHandler, MiddlewareEntry};
use handlr_schema::compile;
use std::sync::Arc;

use crate::definition::HandlerDefinition;
use crate::error::RegistryError;
use crate::initializer::{self, BoxedInitializer};
use crate::registry::{Entry, Registry};

/// Handler registry and bootstrap.
///
/// # Example
///
/// ```
/// use handlr_runtime::{Handlr, HandlerDefinition};
/// use handlr_config::RuntimeMode;
/// use handlr_middleware::{MiddlewareEntry, Reply, RequestData};
/// use serde_json::json;
///
/// # tokio_test::block_on(async {
/// let mut app = Handlr::with_mode(RuntimeMode::Development);
/// app.set("greeting", "hello");
/// app.middleware([MiddlewareEntry::from_fn("audit", |_c, d, n| Box::pin(n.run(d))).global()])
///     .unwrap();
/// app.handler([HandlerDefinition::from_fn("greet", |ctx, input| {
///     Box::pin(async move {
///         let greeting = ctx.settings().get("greeting").cloned();
///         Ok(Reply::new(json!({ "greeting": greeting, "name": input["name"] })))
///     })
/// })
/// .input(["name"])])
/// .unwrap();
///
/// let ctx = app.initialize().await.unwrap();
/// let mut data = RequestData::from_value(json!({ "name": "ada" }));
/// let outcome = ctx.call("greet", &mut data).await.unwrap();
///
/// assert_eq!(outcome.response, json!({ "greeting": "hello", "name": "ada" }));
/// # });
/// ```
#[derive(Debug, Default)]
pub struct Handlr {
    registry: Registry,
    settings: Settings,
    mode: RuntimeMode,
}

impl Handlr {
    /// Creates a runtime whose mode is read from `HANDLR_ENV`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_mode(RuntimeMode::from_env())
    }

    /// Creates a runtime with an explicit mode.
    #[must_use]
    pub fn with_mode(mode: RuntimeMode) -> Self {
        Self {
            registry: Registry::new(),
            settings: Settings::new(),
            mode,
        }
    }

    /// Creates a runtime from loaded configuration.
    #[must_use]
    pub fn from_config(config: HandlrConfig) -> Self {
        Self {
            registry: Registry::new(),
            settings: config.settings,
            mode: config.mode,
        }
    }

    /// Registers handler definitions, directly or through factories.
    ///
    /// # Errors
    ///
    /// Stops at the first duplicate name or failing factory; entries before
    /// it stay registered.
    pub fn handler<I, E>(&mut self, entries: I) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry<HandlerDefinition>>,
    {
        for entry in entries {
            self.registry.register_handler(entry.into())?;
        }
        Ok(self)
    }

    /// Registers middleware, directly or through factories.
    ///
    /// # Errors
    ///
    /// Stops at the first duplicate name or failing factory.
    pub fn middleware<I, E>(&mut self, entries: I) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = E>,
        E: Into<Entry<MiddlewareEntry>>,
    {
        for entry in entries {
            self.registry.register_middleware(entry.into())?;
        }
        Ok(self)
    }

    /// Registers initializers.
    ///
    /// # Errors
    ///
    /// Stops at the first failing factory.
    pub fn initializer<I>(&mut self, entries: I) -> Result<&mut Self, RegistryError>
    where
        I: IntoIterator<Item = Entry<BoxedInitializer>>,
    {
        for entry in entries {
            self.registry.register_initializer(entry)?;
        }
        Ok(self)
    }

    /// Writes a value into the settings tree at a dotted path, creating
    /// intermediate objects.
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> &mut Self {
        self.settings.set(path, value);
        self
    }

    /// Reads a value from the settings tree.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.settings.get(path)
    }

    /// Returns the settings tree.
    #[must_use]
    pub const fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Returns the runtime mode.
    #[must_use]
    pub const fn mode(&self) -> RuntimeMode {
        self.mode
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Builds the execution context.
    ///
    /// Each call starts from a fresh copy of the settings, so it can be
    /// repeated and yields the same pipelines.
    ///
    /// # Errors
    ///
    /// Returns the first initializer failure, or a schema error if a
    /// handler's input description is malformed.
    pub async fn initialize(&self) -> HandlrResult<Arc<ExecutionContext>> {
        let mut ctx = ExecutionContext::new(self.settings.clone(), self.mode);

        initializer::run_all(self.registry.initializers(), &mut ctx).await?;

        let global = self.registry.global_stack().sorted();
        tracing::debug!(
            stack = ?global.iter().map(|m| m.name()).collect::<Vec<_>>(),
            "global stack composed"
        );

        for definition in self.registry.handlers() {
            if definition.is_dev() && self.mode.is_production() {
                tracing::debug!(handler = definition.name(), "skipping development handler");
                continue;
            }

            let schema = compile(definition.input_description())?;
            let builder = definition
                .local_middleware()
                .iter()
                .fold(InstalledHandler::builder(definition.name()).global(global.clone()), |builder, m| {
                    builder.local(Arc::clone(m))
                });

            ctx.install(builder.build(schema, definition.handler()));
            tracing::debug!(handler = definition.name(), "handler installed");
        }

        tracing::info!(
            mode = %self.mode,
            handlers = ctx.handler_names().count(),
            "handlr initialized"
        );
        Ok(Arc::new(ctx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_dotted() {
        let mut app = Handlr::with_mode(RuntimeMode::Development);
        app.set("db.pool.size", 8).set("db.url", "postgres://localhost");

        assert_eq!(app.get("db.pool.size"), Some(&json!(8)));
        assert_eq!(app.get("db"), Some(&json!({ "pool": { "size": 8 }, "url": "postgres://localhost" })));
        assert_eq!(app.get("missing.path"), None);
    }

    #[test]
    fn test_from_config() {
        let mut config = HandlrConfig::production();
        config.settings.set("region", "eu");
        let app = Handlr::from_config(config);

        assert!(app.mode().is_production());
        assert_eq!(app.get("region"), Some(&json!("eu")));
    }

    #[tokio::test]
    async fn test_empty_runtime_initializes() {
        let ctx = Handlr::with_mode(RuntimeMode::Development).initialize().await.unwrap();
        assert_eq!(ctx.handler_names().count(), 0);
        assert_eq!(ctx.mode(), RuntimeMode::Development);
    }
}
