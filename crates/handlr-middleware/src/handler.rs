//! Handler bodies.

use handlr_core::{HandlrResult, Map, Value};
use http::StatusCode;
use std::fmt;
use std::sync::Arc;

use crate::context::ExecutionContext;
use crate::middleware::BoxFuture;

/// A type-erased handler body.
pub type BoxedHandler = Arc<dyn Handler>;

/// What a handler body produces.
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    /// Response body. An object is merged into the response already built
    /// by middleware; anything else replaces it.
    pub body: Value,
    /// Status override; `None` keeps the status set by middleware.
    pub status: Option<StatusCode>,
}

impl Reply {
    /// A reply with a body and no status override.
    #[must_use]
    pub const fn new(body: Value) -> Self {
        Self { body, status: None }
    }

    /// An empty-object reply.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Value::Object(Map::new()))
    }

    /// Sets the status.
    #[must_use]
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = Some(status);
        self
    }
}

impl From<Value> for Reply {
    fn from(body: Value) -> Self {
        Self::new(body)
    }
}

impl From<()> for Reply {
    fn from((): ()) -> Self {
        Self::empty()
    }
}

/// The body of a handler: runs on sanitized input after all middleware.
pub trait Handler: Send + Sync + 'static {
    /// Runs the handler.
    fn run<'a>(&'a self, ctx: &'a ExecutionContext, input: Map<String, Value>) -> BoxFuture<'a, HandlrResult<Reply>>;
}

/// A handler built from a closure.
///
/// ```
/// use handlr_middleware::{FnHandler, Reply};
/// use serde_json::json;
///
/// let echo = FnHandler::new(|_ctx, input| {
///     Box::pin(async move { Ok(Reply::new(json!({ "echo": input }))) })
/// });
/// # let _ = echo;
/// ```
pub struct FnHandler<F> {
    func: F,
}

impl<F> FnHandler<F>
where
    F: for<'a> Fn(&'a ExecutionContext, Map<String, Value>) -> BoxFuture<'a, HandlrResult<Reply>>
        + Send
        + Sync
        + 'static,
{
    /// Wraps a closure.
    pub const fn new(func: F) -> Self {
        Self { func }
    }
}

impl<F> Handler for FnHandler<F>
where
    F: for<'a> Fn(&'a ExecutionContext, Map<String, Value>) -> BoxFuture<'a, HandlrResult<Reply>>
        + Send
        + Sync
        + 'static,
{
    fn run<'a>(&'a self, ctx: &'a ExecutionContext, input: Map<String, Value>) -> BoxFuture<'a, HandlrResult<Reply>> {
        (self.func)(ctx, input)
    }
}

impl<F> fmt::Debug for FnHandler<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnHandler").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_fn_handler_reads_settings() {
        let handler = FnHandler::new(|ctx, input| {
            Box::pin(async move {
                let greeting = ctx.settings().get("greeting").cloned().unwrap_or(Value::Null);
                Ok(Reply::new(json!({ "greeting": greeting, "name": input["name"] })))
            })
        });

        let mut settings = handlr_config::Settings::new();
        settings.set("greeting", "hello");
        let ctx = ExecutionContext::new(settings, handlr_config::RuntimeMode::Development);
        let input = json!({ "name": "ada" }).as_object().cloned().unwrap_or_default();

        let reply = handler.run(&ctx, input).await.unwrap();
        assert_eq!(reply.body, json!({ "greeting": "hello", "name": "ada" }));
        assert_eq!(reply.status, None);
    }

    #[test]
    fn test_reply_conversions() {
        assert_eq!(Reply::from(json!([1])).body, json!([1]));
        assert_eq!(Reply::from(()).body, json!({}));
        assert_eq!(
            Reply::empty().with_status(StatusCode::CREATED).status,
            Some(StatusCode::CREATED)
        );
    }
}
