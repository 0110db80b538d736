//! # Handlr
//!
//! **Composable middleware and declarative input schemas for server-side
//! handlers**
//!
//! - **Declarative schemas**: required fields, defaults, nested objects,
//!   arrays, formatters and validators, sanitized concurrently
//! - **Aggregated failures**: every rejected field reported in one
//!   `validation_error`
//! - **Ordered middleware**: global middleware by priority, then
//!   handler-local middleware, then the handler
//! - **Layered configuration**: defaults, TOML/JSON files and `HANDLR__*`
//!   environment variables
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use handlr::prelude::*;
//! use serde_json::json;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConfigLoader::new().with_mode_from_env().with_optional_file("handlr.toml")?.load()?;
//!     let _metrics = handlr::telemetry::init_telemetry(&config.logging)?;
//!
//!     let mut app = Handlr::from_config(config);
//!     app.handler([HandlerDefinition::from_fn("users.create", |_ctx, input| {
//!         Box::pin(async move { Ok(Reply::new(json!({ "created": input["email"] }))) })
//!     })
//!     .input(SchemaDescription::new().field("email", FieldDef::new().required()))])?;
//!
//!     let ctx = app.initialize().await?;
//!     let mut data = RequestData::from_value(json!({ "email": "ada@example.com" }));
//!     let outcome = ctx.call("users.create", &mut data).await;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! Every handler is installed as one fixed pipeline:
//!
//! ```text
//! data → global (priority) → local → sanitize → handler → merge sanitized
//!                                                              ↓
//! Outcome { error, response, status } ←────────────────────────┘
//! ```

#![doc(html_root_url = "https://docs.rs/handlr/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

// Re-export error taxonomy and path helpers
pub use handlr_core as core;

// Re-export schema compiler and sanitizer
pub use handlr_schema as schema;

// Re-export middleware engine
pub use handlr_middleware as middleware;

// Re-export configuration
pub use handlr_config as config;

// Re-export logging and metrics
pub use handlr_telemetry as telemetry;

// Re-export registry and bootstrap
pub use handlr_runtime as runtime;

pub use handlr_runtime::Handlr;
pub use handlr_schema::{compile, sanitize};

/// Prelude module for convenient imports.
///
/// ```
/// use handlr::prelude::*;
/// ```
pub mod prelude {
    pub use handlr_core::{ErrorBody, HandlrError, HandlrResult, Map, StatusCode, ValidationFailure, Value};

    pub use handlr_schema::{compile, sanitize, FieldDef, Formatter, Predicate, Schema, SchemaDescription};

    pub use handlr_middleware::{
        BoxFuture, ExecutionContext, FnHandler, FnMiddleware, Handler, Middleware, MiddlewareEntry, Next, Outcome,
        Reply, RequestData,
    };

    pub use handlr_config::{ConfigLoader, HandlrConfig, RuntimeMode, Settings};

    pub use handlr_runtime::{Entry, FnInitializer, Handlr, HandlerDefinition, Initializer, RegistryError};
}
