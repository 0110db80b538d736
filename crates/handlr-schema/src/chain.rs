//! Validator and formatter chains.
//!
//! Formatters transform a field value; validators accept or reject it with a
//! message. Both may be synchronous or asynchronous and both may fail with an
//! unexpected fault, which aborts the enclosing sanitize call.
//!
//! # Example
//!
//! ```
//! use handlr_schema::{Formatter, Predicate, Validator};
//! use serde_json::{json, Value};
//!
//! let trim = Formatter::new(|v| match v {
//!     Value::String(s) => Value::String(s.trim().to_string()),
//!     other => other,
//! });
//! let non_empty = Validator::new(
//!     Predicate::new(|v| v.as_str().is_some_and(|s| !s.is_empty())),
//!     "empty",
//! );
//! # let _ = (trim, non_empty);
//! ```

use handlr_core::{HandlrResult, Value};
use std::fmt;
use std::future::{ready, Future};
use std::pin::Pin;
use std::sync::Arc;

/// A boxed, sendable future.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type PredicateFn = dyn Fn(&Value) -> BoxFuture<'static, HandlrResult<bool>> + Send + Sync;
type FormatterFn = dyn Fn(Value) -> BoxFuture<'static, HandlrResult<Value>> + Send + Sync;

/// Message paired with bare predicates.
pub const DEFAULT_MESSAGE: &str = "invalid";

/// A value test used by validators.
#[derive(Clone)]
pub struct Predicate {
    func: Arc<PredicateFn>,
}

impl Predicate {
    /// Creates a predicate from a synchronous test.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |value: &Value| -> BoxFuture<'static, HandlrResult<bool>> {
                Box::pin(ready(Ok(test(value))))
            }),
        }
    }

    /// Creates a predicate from a synchronous test that may fault.
    pub fn fallible<F>(test: F) -> Self
    where
        F: Fn(&Value) -> HandlrResult<bool> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |value: &Value| -> BoxFuture<'static, HandlrResult<bool>> {
                Box::pin(ready(test(value)))
            }),
        }
    }

    /// Creates a predicate from an asynchronous test.
    ///
    /// The test receives its own copy of the value.
    pub fn from_async<F, Fut>(test: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlrResult<bool>> + Send + 'static,
    {
        Self {
            func: Arc::new(move |value: &Value| -> BoxFuture<'static, HandlrResult<bool>> {
                Box::pin(test(value.clone()))
            }),
        }
    }

    /// Evaluates the predicate.
    pub async fn test(&self, value: &Value) -> HandlrResult<bool> {
        (self.func)(value).await
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Predicate").finish_non_exhaustive()
    }
}

/// A predicate paired with the message reported when it rejects a value.
#[derive(Clone, Debug)]
pub struct Validator {
    predicate: Predicate,
    message: String,
}

impl Validator {
    /// Pairs a predicate with a rejection message.
    pub fn new(predicate: Predicate, message: impl Into<String>) -> Self {
        Self {
            predicate,
            message: message.into(),
        }
    }

    /// Returns the rejection message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the predicate.
    #[must_use]
    pub const fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns `Ok(true)` if the value is accepted.
    pub async fn check(&self, value: &Value) -> HandlrResult<bool> {
        self.predicate.test(value).await
    }
}

/// A value transform.
#[derive(Clone)]
pub struct Formatter {
    func: Arc<FormatterFn>,
}

impl Formatter {
    /// Creates a formatter from a synchronous transform.
    pub fn new<F>(transform: F) -> Self
    where
        F: Fn(Value) -> Value + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |value: Value| -> BoxFuture<'static, HandlrResult<Value>> {
                Box::pin(ready(Ok(transform(value))))
            }),
        }
    }

    /// Creates a formatter from a synchronous transform that may fault.
    pub fn fallible<F>(transform: F) -> Self
    where
        F: Fn(Value) -> HandlrResult<Value> + Send + Sync + 'static,
    {
        Self {
            func: Arc::new(move |value: Value| -> BoxFuture<'static, HandlrResult<Value>> {
                Box::pin(ready(transform(value)))
            }),
        }
    }

    /// Creates a formatter from an asynchronous transform.
    pub fn from_async<F, Fut>(transform: F) -> Self
    where
        F: Fn(Value) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HandlrResult<Value>> + Send + 'static,
    {
        Self {
            func: Arc::new(move |value: Value| -> BoxFuture<'static, HandlrResult<Value>> {
                Box::pin(transform(value))
            }),
        }
    }

    /// Applies the transform.
    pub async fn apply(&self, value: Value) -> HandlrResult<Value> {
        (self.func)(value).await
    }
}

impl fmt::Debug for Formatter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Formatter").finish_non_exhaustive()
    }
}
