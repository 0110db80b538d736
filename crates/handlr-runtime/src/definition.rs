//! Handler definitions.
//!
//! A [`HandlerDefinition`] is everything needed to install one handler: its
//! name, the schema describing its input, the handler body and any
//! handler-local middleware. Definitions are immutable once registered.

use handlr_core::{HandlrResult, Map, Value};
use handlr_middleware::{BoxFuture, BoxedHandler, BoxedMiddleware, ExecutionContext, FnHandler, Handler, Reply};
use handlr_schema::SchemaDescription;
use std::fmt;
use std::sync::Arc;

/// A named handler with its input schema and local middleware.
///
/// # Example
///
/// ```
/// use handlr_runtime::HandlerDefinition;
/// use handlr_middleware::Reply;
/// use handlr_schema::SchemaDescription;
/// use serde_json::json;
///
/// let definition = HandlerDefinition::from_fn("users.get", |_ctx, input| {
///     Box::pin(async move { Ok(Reply::new(json!({ "id": input["id"] }))) })
/// })
/// .input(SchemaDescription::fields(["id"]));
///
/// assert_eq!(definition.name(), "users.get");
/// assert!(!definition.is_dev());
/// ```
#[derive(Clone)]
pub struct HandlerDefinition {
    name: String,
    input: SchemaDescription,
    run: BoxedHandler,
    middleware: Vec<BoxedMiddleware>,
    dev: bool,
}

impl HandlerDefinition {
    /// Creates a definition with an empty input schema.
    pub fn new(name: impl Into<String>, run: impl Handler) -> Self {
        Self::from_boxed(name, Arc::new(run))
    }

    /// Creates a definition from a shared handler.
    pub fn from_boxed(name: impl Into<String>, run: BoxedHandler) -> Self {
        Self {
            name: name.into(),
            input: SchemaDescription::new(),
            run,
            middleware: Vec::new(),
            dev: false,
        }
    }

    /// Creates a definition from a closure.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a ExecutionContext, Map<String, Value>) -> BoxFuture<'a, HandlrResult<Reply>>
            + Send
            + Sync
            + 'static,
    {
        Self::new(name, FnHandler::new(func))
    }

    /// Sets the input schema.
    #[must_use]
    pub fn input(mut self, input: impl Into<SchemaDescription>) -> Self {
        self.input = input.into();
        self
    }

    /// Appends a handler-local middleware. Local middleware run after the
    /// global stack, in the order they were added.
    #[must_use]
    pub fn middleware(mut self, middleware: BoxedMiddleware) -> Self {
        self.middleware.push(middleware);
        self
    }

    /// Marks the handler as development-only: it is not installed in
    /// production mode.
    #[must_use]
    pub fn dev(mut self) -> Self {
        self.dev = true;
        self
    }

    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the input schema description.
    #[must_use]
    pub const fn input_description(&self) -> &SchemaDescription {
        &self.input
    }

    /// Returns the handler body.
    #[must_use]
    pub fn handler(&self) -> BoxedHandler {
        Arc::clone(&self.run)
    }

    /// Returns the local middleware in declared order.
    #[must_use]
    pub fn local_middleware(&self) -> &[BoxedMiddleware] {
        &self.middleware
    }

    /// Returns `true` for development-only handlers.
    #[must_use]
    pub const fn is_dev(&self) -> bool {
        self.dev
    }
}

impl fmt::Debug for HandlerDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerDefinition")
            .field("name", &self.name)
            .field("input", &self.input.len())
            .field(
                "middleware",
                &self.middleware.iter().map(|m| m.name()).collect::<Vec<_>>(),
            )
            .field("dev", &self.dev)
            .finish_non_exhaustive()
    }
}
