//! # Handlr Runtime
//!
//! Registration and bootstrap for Handlr applications.
//!
//! [`Handlr`] collects three kinds of registrations plus a settings tree:
//!
//! - **Middleware** ([`handlr_middleware::MiddlewareEntry`]): named, optionally
//!   global with a priority, optionally with a generator for
//!   handler-specific variants
//! - **Handlers** ([`HandlerDefinition`]): name, input schema, body, local
//!   middleware, development flag
//! - **Initializers** ([`Initializer`]): hooks that prepare the context
//!
//! Any registration may be a factory receiving the [`Registry`], which is how
//! handlers look up named middleware. [`Handlr::initialize`] then produces a
//! shared [`handlr_middleware::ExecutionContext`].

#![doc(html_root_url = "https://docs.rs/handlr-runtime/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod definition;
mod error;
pub mod initializer;
pub mod registry;
mod runtime;

pub use definition::HandlerDefinition;
pub use error::RegistryError;
pub use initializer::{BoxedInitializer, FnInitializer, Initializer};
pub use registry::{Entry, Registry};
pub use runtime::Handlr;
