//! Bootstrap hooks.
//!
//! Initializers run once per `initialize`, in registration order, before
//! any handler is installed. They prepare the [`ExecutionContext`]: open
//! pools, read settings, store shared values as extensions.
//!
//! # Example
//!
//! ```
//! use handlr_runtime::FnInitializer;
//!
//! struct Greeting(String);
//!
//! let greeting = FnInitializer::new("greeting", |ctx| {
//!     Box::pin(async move {
//!         let text = ctx.settings().get_as::<String>("greeting")?.unwrap_or_default();
//!         ctx.extensions_mut().insert(Greeting(text));
//!         Ok(())
//!     })
//! });
//! # let _ = greeting;
//! ```

use handlr_core::HandlrResult;
use handlr_middleware::{BoxFuture, ExecutionContext};
use std::fmt;
use std::sync::Arc;

/// A type-erased initializer.
pub type BoxedInitializer = Arc<dyn Initializer>;

/// A hook run before handlers are installed.
pub trait Initializer: Send + Sync + 'static {
    /// Returns the name used in logs.
    fn name(&self) -> &str {
        "initializer"
    }

    /// Prepares the context. A failure aborts `initialize`.
    fn before<'a>(&'a self, ctx: &'a mut ExecutionContext) -> BoxFuture<'a, HandlrResult<()>>;
}

/// An initializer built from a closure.
pub struct FnInitializer<F> {
    name: String,
    func: F,
}

impl<F> FnInitializer<F>
where
    F: for<'a> Fn(&'a mut ExecutionContext) -> BoxFuture<'a, HandlrResult<()>> + Send + Sync + 'static,
{
    /// Wraps a closure.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Initializer for FnInitializer<F>
where
    F: for<'a> Fn(&'a mut ExecutionContext) -> BoxFuture<'a, HandlrResult<()>> + Send + Sync + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn before<'a>(&'a self, ctx: &'a mut ExecutionContext) -> BoxFuture<'a, HandlrResult<()>> {
        (self.func)(ctx)
    }
}

impl<F> fmt::Debug for FnInitializer<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnInitializer").field("name", &self.name).finish_non_exhaustive()
    }
}

/// Runs initializers in order, stopping at the first failure.
pub(crate) async fn run_all(initializers: &[BoxedInitializer], ctx: &mut ExecutionContext) -> HandlrResult<()> {
    for initializer in initializers {
        tracing::debug!(initializer = initializer.name(), "running initializer");
        if let Err(err) = initializer.before(ctx).await {
            tracing::error!(initializer = initializer.name(), error = %err, "initializer failed");
            return Err(err);
        }
    }
    Ok(())
}
