//! # Handlr Core
//!
//! Core types shared by every Handlr crate.
//!
//! - [`HandlrError`] - The fixed error taxonomy (status code, message, cause)
//! - [`ValidationFailure`] - Field-path to message map carried by validation errors
//! - [`path`] - Dotted-path helpers for reading and writing JSON trees

#![doc(html_root_url = "https://docs.rs/handlr-core/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

mod error;
mod failure;
pub mod path;

pub use error::{ErrorBody, ErrorKind, HandlrError, HandlrResult};
pub use failure::{FieldFailure, ValidationFailure};

/// Status codes carried by errors and outcomes.
pub use http::StatusCode;
/// The dynamic value type used for input, output, and configuration trees.
pub use serde_json::{Map, Value};
