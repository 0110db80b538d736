//! # Handlr Schema
//!
//! Declarative input schemas for Handlr handlers.
//!
//! A handler describes its input with a [`SchemaDescription`]. At setup the
//! description is compiled once into an immutable [`Schema`] tree of
//! [`FieldSpec`]s; each request then runs [`sanitize`] against it.
//!
//! ```text
//! SchemaDescription ──compile──▶ Schema ──sanitize(input)──▶ sanitized tree
//!                                                        └─▶ ValidationError { cause }
//! ```
//!
//! Sanitizing one field means, in order:
//!
//! 1. Missing/null handling (`required`, `default`)
//! 2. Recursion into `properties` (objects) or `array` (sequences)
//! 3. Formatters, each consuming the previous output
//! 4. Validators, stopping at the first rejection
//!
//! All declared fields are sanitized concurrently on the calling task.
//! Declarative rejections are collected into one
//! [`HandlrError::Validation`](handlr_core::HandlrError::Validation); any other
//! fault aborts the whole call immediately.
//!
//! ## Example
//!
//! ```
//! use handlr_schema::{compile, sanitize, FieldDef, Predicate, SchemaDescription};
//! use serde_json::json;
//!
//! # tokio_test::block_on(async {
//! let description = SchemaDescription::new()
//!     .field("name", FieldDef::new().required())
//!     .field(
//!         "age",
//!         FieldDef::new().validator((Predicate::new(|v| v.as_i64().is_some_and(|n| n >= 0)), "negative")),
//!     );
//!
//! let schema = compile(&description).unwrap();
//! let sanitized = sanitize(&schema, &json!({ "name": "ada", "age": 36 })).await.unwrap();
//! assert_eq!(sanitized["name"], "ada");
//! # });
//! ```

#![doc(html_root_url = "https://docs.rs/handlr-schema/0.1.0")]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod chain;
mod compile;
mod description;
mod sanitize;

pub use chain::{BoxFuture, Formatter, Predicate, Validator};
pub use compile::{compile, FieldSpec, Required, Schema, SchemaError, Shape};
pub use description::{FieldDef, RawField, SchemaDescription, ValidatorEntry};
pub use sanitize::{sanitize, sanitize_field, FieldOutcome};
