//! Installed handler pipelines.
//!
//! Every handler is installed as one fixed chain:
//!
//! ```text
//! [global, by priority] → [handler-local, declared order] → core step
//! ```
//!
//! The core step sanitizes the input with the handler's compiled schema,
//! runs the handler body on the sanitized fields, stores its reply and
//! merges the sanitized fields back into the request data. An object reply
//! is merged key by key into the response, so entries set by middleware
//! before the handler survive; any other reply replaces the response. The
//! chain is fixed when the pipeline is built and never changes afterwards.

use handlr_core::{ErrorBody, HandlrResult, Value};
use handlr_schema::{sanitize, Schema};
use http::StatusCode;
use std::fmt;
use std::sync::atomic::AtomicUsize;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;

use crate::context::{ExecutionContext, RequestData};
use crate::handler::BoxedHandler;
use crate::middleware::{BoxFuture, BoxedMiddleware, Middleware, Next};

/// Name of the final stage of every pipeline.
pub const CORE_STAGE: &str = "core";

/// The result of one invocation.
///
/// `error` is the serializable view of the caught failure. The raised
/// [`HandlrError`](handlr_core::HandlrError) itself, with its variant and
/// source chain, stays in [`RequestData::error`].
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// The caught failure, if any.
    pub error: Option<ErrorBody>,
    /// The response body.
    pub response: Value,
    /// The failure's own status if it has one, else the request status.
    pub status: StatusCode,
}

impl Outcome {
    fn from_data(data: &RequestData) -> Self {
        let status = data
            .error
            .as_ref()
            .and_then(handlr_core::HandlrError::status)
            .unwrap_or(data.status);
        Self {
            error: data.error.as_ref().map(handlr_core::HandlrError::to_body),
            response: data.response.clone(),
            status,
        }
    }

    /// Returns `true` if no failure was caught.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// A handler installed with its composed middleware chain.
pub struct InstalledHandler {
    name: String,
    stages: Vec<BoxedMiddleware>,
}

impl InstalledHandler {
    /// Creates a pipeline builder for the named handler.
    #[must_use]
    pub fn builder(name: impl Into<String>) -> PipelineBuilder {
        PipelineBuilder::new(name)
    }

    /// Returns the handler name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the names of all stages in execution order.
    #[must_use]
    pub fn stage_names(&self) -> Vec<&str> {
        self.stages.iter().map(|stage| stage.name()).collect()
    }

    /// Returns the number of stages, including the core step.
    #[must_use]
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    /// Runs one invocation.
    ///
    /// Resets `data` (no error, `{}` response, status 200), drives the chain
    /// and catches the first failure into `data.error`. Frames after a
    /// failure never run and nothing is retried.
    pub async fn call(&self, ctx: &ExecutionContext, data: &mut RequestData) -> Outcome {
        let started = Instant::now();
        data.reset();

        let steps = AtomicUsize::new(0);
        let span = tracing::debug_span!("handlr.invoke", handler = %self.name);
        let result = Next::start(&self.stages, ctx, &steps).run(data).instrument(span).await;

        if let Err(err) = result {
            tracing::debug!(handler = %self.name, error = err.name(), %err, "invocation failed");
            data.error = Some(err);
        }

        let outcome = Outcome::from_data(data);
        handlr_telemetry::record_invocation(&self.name, outcome.status.as_u16(), started.elapsed());
        outcome
    }
}

impl fmt::Debug for InstalledHandler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstalledHandler")
            .field("name", &self.name)
            .field("stages", &self.stage_names())
            .finish()
    }
}

/// Builder for an [`InstalledHandler`].
///
/// ```
/// use handlr_middleware::{FnHandler, InstalledHandler, MiddlewareEntry, Reply};
/// use handlr_schema::{compile, SchemaDescription};
/// use std::sync::Arc;
///
/// let auth = MiddlewareEntry::from_fn("auth", |_c, d, n| Box::pin(n.run(d)));
/// let handler = InstalledHandler::builder("users.get")
///     .global(vec![auth.middleware()])
///     .build(
///         compile(&SchemaDescription::fields(["id"])).unwrap(),
///         Arc::new(FnHandler::new(|_ctx, _input| Box::pin(async { Ok(Reply::empty()) }))),
///     );
///
/// assert_eq!(handler.stage_names(), vec!["auth", "core"]);
/// ```
pub struct PipelineBuilder {
    name: String,
    global: Vec<BoxedMiddleware>,
    local: Vec<BoxedMiddleware>,
}

impl PipelineBuilder {
    /// Creates a builder with no middleware.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            global: Vec::new(),
            local: Vec::new(),
        }
    }

    /// Sets the global middleware, already in execution order.
    #[must_use]
    pub fn global(mut self, stack: Vec<BoxedMiddleware>) -> Self {
        self.global = stack;
        self
    }

    /// Appends a handler-local middleware.
    #[must_use]
    pub fn local(mut self, middleware: BoxedMiddleware) -> Self {
        self.local.push(middleware);
        self
    }

    /// Finishes the chain with the core step.
    #[must_use]
    pub fn build(self, schema: Schema, handler: BoxedHandler) -> InstalledHandler {
        let core: BoxedMiddleware = Arc::new(CoreStep {
            handler_name: self.name.clone(),
            schema,
            handler,
        });

        let mut stages = self.global;
        stages.extend(self.local);
        stages.push(core);

        tracing::debug!(handler = %self.name, stages = stages.len(), "pipeline composed");
        InstalledHandler {
            name: self.name,
            stages,
        }
    }
}

impl fmt::Debug for PipelineBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineBuilder")
            .field("name", &self.name)
            .field("global", &self.global.len())
            .field("local", &self.local.len())
            .finish()
    }
}

struct CoreStep {
    handler_name: String,
    schema: Schema,
    handler: BoxedHandler,
}

impl Middleware for CoreStep {
    fn name(&self) -> &str {
        CORE_STAGE
    }

    fn process<'a>(
        &'a self,
        ctx: &'a ExecutionContext,
        data: &'a mut RequestData,
        next: Next<'a>,
    ) -> BoxFuture<'a, HandlrResult<()>> {
        Box::pin(async move {
            let raw = Value::Object(data.input.clone());
            let result = sanitize(&self.schema, &raw).await;

            let sanitized = match result {
                Ok(sanitized) => sanitized,
                Err(err) => {
                    if err.is_validation() {
                        handlr_telemetry::record_validation_failure(&self.handler_name);
                    }
                    return Err(err);
                }
            };

            let reply = self.handler.run(ctx, sanitized.clone()).await?;
            match reply.body {
                Value::Object(body) if data.response.is_object() => {
                    if let Some(response) = data.response.as_object_mut() {
                        response.extend(body);
                    }
                }
                body => data.response = body,
            }
            if let Some(status) = reply.status {
                data.status = status;
            }
            data.input.extend(sanitized);

            next.run(data).await
        })
    }
}
