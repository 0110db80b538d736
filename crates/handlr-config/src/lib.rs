//! Configuration for Handlr.
//!
//! This crate provides:
//! - [`Settings`] - the process-wide settings tree with dotted `get`/`set`
//! - [`RuntimeMode`] - development or production, resolved from `HANDLR_ENV`
//! - [`HandlrConfig`] - mode, logging and settings in one value
//! - [`ConfigLoader`] - layered loading (defaults → file → `.env` → env vars)
//!
//! # Example
//!
//! ```
//! use handlr_config::{ConfigLoader, RuntimeMode};
//! use serde_json::json;
//!
//! let config = ConfigLoader::new()
//!     .with_mode(RuntimeMode::Production)
//!     .with_string(r#"{"settings": {"db": {"url": "postgres://localhost"}}}"#, "json")
//!     .unwrap()
//!     .load()
//!     .unwrap();
//!
//! assert!(config.mode.is_production());
//! assert_eq!(config.settings.get("db.url"), Some(&json!("postgres://localhost")));
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod loader;
mod settings;

pub use config::{HandlrConfig, LogFormat, LoggingConfig, RuntimeMode, MODE_ENV_VAR};
pub use error::ConfigError;
pub use loader::{ConfigLoader, DEFAULT_ENV_PREFIX};
pub use settings::Settings;
