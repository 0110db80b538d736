//! Core middleware trait and the continuation that drives a chain.
//!
//! A handler pipeline is an ordered list of stages. Each stage receives the
//! shared [`ExecutionContext`], the invocation's [`RequestData`] and a
//! [`Next`] continuation; awaiting `next.run(data)` runs every downstream
//! stage before returning control, so a stage can act both before and after
//! the rest of the chain.
//!
//! # Example
//!
//! ```
//! use handlr_middleware::{BoxFuture, ExecutionContext, Middleware, Next, RequestData};
//! use handlr_core::HandlrResult;
//!
//! struct Audit;
//!
//! impl Middleware for Audit {
//!     fn name(&self) -> &str {
//!         "audit"
//!     }
//!
//!     fn process<'a>(
//!         &'a self,
//!         ctx: &'a ExecutionContext,
//!         data: &'a mut RequestData,
//!         next: Next<'a>,
//!     ) -> BoxFuture<'a, HandlrResult<()>> {
//!         Box::pin(async move {
//!             tracing::debug!(mode = %ctx.mode(), "before");
//!             next.run(data).await?;
//!             tracing::debug!(status = %data.status, "after");
//!             Ok(())
//!         })
//!     }
//! }
//! ```

use handlr_core::HandlrResult;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::context::{ExecutionContext, RequestData};

pub use handlr_schema::BoxFuture;

/// A type-erased middleware that can be stored in a vector.
pub type BoxedMiddleware = Arc<dyn Middleware>;

/// A pipeline stage.
///
/// # Invariants
///
/// - Call `next.run()` at most once; not calling it short-circuits the chain
/// - Await the continuation to completion before returning
/// - Propagate downstream errors with `?`; the engine catches them once
pub trait Middleware: Send + Sync + 'static {
    /// Returns the name of this stage, used in logs.
    fn name(&self) -> &str;

    /// Processes one invocation.
    fn process<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        data: &'a mut RequestData,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlrResult<()>>;
}

/// Continuation into the rest of the chain.
///
/// Consumed by [`Next::run`], so it can be invoked at most once.
pub struct Next<'a> {
    stages: &'a [BoxedMiddleware],
    ctx: &'a ExecutionContext,
    index: usize,
    steps: &'a AtomicUsize,
}

impl<'a> Next<'a> {
    /// Creates a continuation starting at the first stage.
    ///
    /// `steps` counts frames currently in flight and must start at zero.
    pub(crate) const fn start(stages: &'a [BoxedMiddleware], ctx: &'a ExecutionContext, steps: &'a AtomicUsize) -> Self {
        Self {
            stages,
            ctx,
            index: 0,
            steps,
        }
    }

    /// Returns the number of stages still to run, including the next one.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.stages.len().saturating_sub(self.index)
    }

    /// Runs the remaining chain.
    ///
    /// Past the last stage this is a no-op.
    ///
    /// # Errors
    ///
    /// Returns the first error raised by a downstream stage.
    pub async fn run(self, data: &mut RequestData) -> HandlrResult<()> {
        let Self {
            stages,
            ctx,
            index,
            steps,
        } = self;

        let Some(stage) = stages.get(index) else {
            return Ok(());
        };

        steps.fetch_add(1, Ordering::SeqCst);
        let next = Self {
            stages,
            ctx,
            index: index + 1,
            steps,
        };
        let result = stage.process(ctx, data, next).await;

        let in_flight = steps.fetch_sub(1, Ordering::SeqCst).saturating_sub(1);
        if in_flight != index {
            tracing::warn!(
                middleware = stage.name(),
                frame = index,
                in_flight,
                "out of order stack execution: a downstream frame did not run to completion"
            );
            steps.store(index, Ordering::SeqCst);
        }

        result
    }
}

impl fmt::Debug for Next<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Next")
            .field("index", &self.index)
            .field("remaining", &self.remaining())
            .finish_non_exhaustive()
    }
}

/// A middleware built from a closure.
///
/// ```
/// use handlr_middleware::FnMiddleware;
///
/// let stamp = FnMiddleware::new("stamp", |_ctx, data, next| {
///     Box::pin(async move {
///         next.run(data).await?;
///         data.response["stamped"] = true.into();
///         Ok(())
///     })
/// });
/// # let _ = stamp;
/// ```
pub struct FnMiddleware<F> {
    name: String,
    func: F,
}

impl<F> FnMiddleware<F>
where
    F: for<'a> Fn(&'a ExecutionContext, &'a mut RequestData, Next<'a>) -> BoxFuture<'a, HandlrResult<()>>
        + Send
        + Sync
        + 'static,
{
    /// Creates a new function-based middleware.
    pub fn new(name: impl Into<String>, func: F) -> Self {
        Self {
            name: name.into(),
            func,
        }
    }
}

impl<F> Middleware for FnMiddleware<F>
where
    F: for<'a> Fn(&'a ExecutionContext, &'a mut RequestData, Next<'a>) -> BoxFuture<'a, HandlrResult<()>>
        + Send
        + Sync
        + 'static,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn process<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        data: &'a mut RequestData,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlrResult<()>> {
        (self.func)(ctx, data, next)
    }
}

impl<F> fmt::Debug for FnMiddleware<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnMiddleware").field("name", &self.name).finish_non_exhaustive()
    }
}
