//! Middleware registration entries and the global stack.
//!
//! Global middleware run in front of every handler, ordered by ascending
//! priority. Equal priorities keep registration order.

use handlr_core::{HandlrResult, Value};
use std::fmt;
use std::sync::Arc;

use crate::context::{ExecutionContext, RequestData};
use crate::middleware::{BoxFuture, BoxedMiddleware, FnMiddleware, Middleware, Next};

/// Priority assigned to global middleware that do not set one.
pub const DEFAULT_PRIORITY: i32 = 100;

/// Builds a specialized middleware from handler-supplied options.
///
/// Returning `None` falls back to the entry's default middleware.
pub type Generator = Arc<dyn Fn(&Value) -> Option<BoxedMiddleware> + Send + Sync>;

/// A named middleware as registered with the runtime.
///
/// # Example
///
/// ```
/// use handlr_middleware::MiddlewareEntry;
///
/// let entry = MiddlewareEntry::from_fn("auth", |_ctx, data, next| Box::pin(next.run(data)))
///     .global()
///     .priority(10);
///
/// assert!(entry.is_global());
/// assert_eq!(entry.priority_value(), 10);
/// ```
#[derive(Clone)]
pub struct MiddlewareEntry {
    name: String,
    global: bool,
    priority: i32,
    run: BoxedMiddleware,
    generate: Option<Generator>,
}

impl MiddlewareEntry {
    /// Creates an entry from a middleware value.
    pub fn new(name: impl Into<String>, middleware: impl Middleware) -> Self {
        Self::from_boxed(name, Arc::new(middleware))
    }

    /// Creates an entry from a shared middleware.
    pub fn from_boxed(name: impl Into<String>, middleware: BoxedMiddleware) -> Self {
        Self {
            name: name.into(),
            global: false,
            priority: DEFAULT_PRIORITY,
            run: middleware,
            generate: None,
        }
    }

    /// Creates an entry from a closure.
    pub fn from_fn<F>(name: impl Into<String>, func: F) -> Self
    where
        F: for<'a> Fn(&'a ExecutionContext, &'a mut RequestData, Next<'a>) -> BoxFuture<'a, HandlrResult<()>>
            + Send
            + Sync
            + 'static,
    {
        let name = name.into();
        Self::new(name.clone(), FnMiddleware::new(name, func))
    }

    /// Adds the middleware to the global stack.
    #[must_use]
    pub fn global(mut self) -> Self {
        self.global = true;
        self
    }

    /// Sets the global priority; lower runs first.
    #[must_use]
    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Sets the generator used when a handler asks for this middleware with
    /// options.
    #[must_use]
    pub fn generate<F>(mut self, generator: F) -> Self
    where
        F: Fn(&Value) -> Option<BoxedMiddleware> + Send + Sync + 'static,
    {
        self.generate = Some(Arc::new(generator));
        self
    }

    /// Returns the entry name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns `true` if the entry joins the global stack.
    #[must_use]
    pub const fn is_global(&self) -> bool {
        self.global
    }

    /// Returns the global priority.
    #[must_use]
    pub const fn priority_value(&self) -> i32 {
        self.priority
    }

    /// Returns the default middleware.
    #[must_use]
    pub fn middleware(&self) -> BoxedMiddleware {
        Arc::clone(&self.run)
    }

    /// Resolves the middleware for a handler: the generator's product for
    /// `options`, or the default middleware.
    #[must_use]
    pub fn instantiate(&self, options: &Value) -> BoxedMiddleware {
        self.generate
            .as_ref()
            .and_then(|generate| generate(options))
            .unwrap_or_else(|| self.middleware())
    }
}

impl fmt::Debug for MiddlewareEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareEntry")
            .field("name", &self.name)
            .field("global", &self.global)
            .field("priority", &self.priority)
            .field("generate", &self.generate.is_some())
            .finish_non_exhaustive()
    }
}

/// The global middleware in registration order.
#[derive(Clone, Default)]
pub struct GlobalStack {
    entries: Vec<(i32, BoxedMiddleware)>,
}

impl fmt::Debug for GlobalStack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(priority, m)| (m.name(), priority)))
            .finish()
    }
}

impl GlobalStack {
    /// Creates an empty stack.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a global entry's default middleware. Non-global entries are
    /// ignored.
    pub fn push(&mut self, entry: &MiddlewareEntry) {
        if entry.is_global() {
            self.entries.push((entry.priority_value(), entry.middleware()));
        }
    }

    /// Returns the number of global middleware.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if no global middleware is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the middleware sorted by ascending priority.
    ///
    /// The sort is stable: equal priorities keep registration order, so
    /// repeated calls yield the same order.
    #[must_use]
    pub fn sorted(&self) -> Vec<BoxedMiddleware> {
        let mut entries = self.entries.clone();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter().map(|(_, middleware)| middleware).collect()
    }
}

impl Extend<MiddlewareEntry> for GlobalStack {
    fn extend<I: IntoIterator<Item = MiddlewareEntry>>(&mut self, iter: I) {
        for entry in iter {
            self.push(&entry);
        }
    }
}
