//! # Handlr Middleware
//!
//! Middleware composition and execution for Handlr handlers.
//!
//! Each handler is installed as one fixed pipeline:
//!
//! ```text
//! data → global (by priority) → local (declared order) → core step
//!                                                            ↓
//! Outcome ← error caught once ←──────── frames unwind ───────┘
//! ```
//!
//! | Stage | Source | Order |
//! |-------|--------|-------|
//! | Global | [`MiddlewareEntry::global`] | ascending priority, ties by registration |
//! | Local | handler definition | as declared |
//! | Core | schema + handler body | always last |
//!
//! The core step sanitizes input with the handler's schema, runs the
//! handler body and stores its [`Reply`]. Any failure aborts the remaining
//! frames and is stored in [`RequestData::error`].

#![doc(html_root_url = "https://docs.rs/handlr-middleware/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod context;
pub mod handler;
pub mod middleware;
pub mod pipeline;
pub mod stack;

pub use context::{ExecutionContext, Extensions, RequestData};
pub use handler::{BoxedHandler, FnHandler, Handler, Reply};
pub use middleware::{BoxFuture, BoxedMiddleware, FnMiddleware, Middleware, Next};
pub use pipeline::{InstalledHandler, Outcome, PipelineBuilder, CORE_STAGE};
pub use stack::{GlobalStack, Generator, MiddlewareEntry, DEFAULT_PRIORITY};
