//! Configuration loader with layered approach.
//!
//! This module provides the [`ConfigLoader`] for loading configuration from
//! multiple sources: defaults, files, and environment variables.

use handlr_core::{path, Map, Value};
use std::env;
use std::fs;
use std::path::Path;

use crate::settings::merge_into;
use crate::{ConfigError, HandlrConfig, RuntimeMode};

/// Default environment variable prefix.
pub const DEFAULT_ENV_PREFIX: &str = "HANDLR";

/// Top-level keys that configure Handlr itself rather than the settings tree.
const RESERVED_SECTIONS: [&str; 2] = ["mode", "logging"];

/// Configuration loader with layered approach.
///
/// The loader applies configuration in layers, with later layers overriding
/// earlier ones:
/// 1. Default values (a preset)
/// 2. Configuration files (TOML or JSON), deep-merged in call order
/// 3. Environment variables
///
/// A configuration file has the shape of [`HandlrConfig`]:
///
/// ```toml
/// mode = "production"
///
/// [logging]
/// level = "info"
/// format = "json"
///
/// [settings.db]
/// url = "postgres://localhost/app"
/// ```
///
/// Environment variables use the format `PREFIX__A__B`. `PREFIX__MODE` and
/// `PREFIX__LOGGING__*` address the reserved sections; every other variable
/// lands in the settings tree, so `HANDLR__DB__URL` sets `db.url`. Values
/// that parse as JSON are stored as JSON, anything else as a string.
///
/// # Example
///
/// ```no_run
/// use handlr_config::ConfigLoader;
///
/// # fn main() -> Result<(), handlr_config::ConfigError> {
/// let config = ConfigLoader::new()
///     .with_mode_from_env()
///     .with_optional_file("handlr.toml")?
///     .with_dotenv()?
///     .with_env_prefix("HANDLR")
///     .load()?;
///
/// println!("running in {} mode", config.mode);
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ConfigLoader {
    base: HandlrConfig,
    overlay: Map<String, Value>,
    env_prefix: Option<String>,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a new configuration loader starting from development defaults.
    #[must_use]
    pub fn new() -> Self {
        Self {
            base: HandlrConfig::default(),
            overlay: Map::new(),
            env_prefix: None,
        }
    }

    /// Start from the preset of the given mode.
    ///
    /// ```
    /// use handlr_config::{ConfigLoader, LogFormat, RuntimeMode};
    ///
    /// let config = ConfigLoader::new()
    ///     .with_mode(RuntimeMode::Production)
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.logging.format, LogFormat::Json);
    /// ```
    #[must_use]
    pub fn with_mode(mut self, mode: RuntimeMode) -> Self {
        self.base = HandlrConfig::for_mode(mode);
        self
    }

    /// Start from the preset selected by `HANDLR_ENV`.
    #[must_use]
    pub fn with_mode_from_env(self) -> Self {
        self.with_mode(RuntimeMode::from_env())
    }

    /// Load configuration from a file.
    ///
    /// The format is chosen by extension: `.toml` or `.json`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - The file does not exist
    /// - The file cannot be read
    /// - The file contains invalid TOML/JSON
    pub fn with_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::file_not_found(path));
        }

        let content = fs::read_to_string(path).map_err(|e| ConfigError::read_error(path, e))?;

        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .ok_or_else(|| ConfigError::unsupported_format(path.display().to_string()))?;

        self.with_string(&content, &extension)
    }

    /// Load configuration from a file if it exists.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file exists but cannot be read or parsed.
    pub fn with_optional_file<P: AsRef<Path>>(self, path: P) -> Result<Self, ConfigError> {
        if path.as_ref().exists() {
            self.with_file(path)
        } else {
            Ok(self)
        }
    }

    /// Load configuration from a string in `"toml"` or `"json"` format.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the format is unknown, the content does not
    /// parse, or its root is not a table/object.
    ///
    /// ```
    /// use handlr_config::ConfigLoader;
    /// use serde_json::json;
    ///
    /// let toml = r#"
    ///     [settings.db]
    ///     url = "postgres://localhost/app"
    /// "#;
    ///
    /// let config = ConfigLoader::new()
    ///     .with_string(toml, "toml")
    ///     .unwrap()
    ///     .load()
    ///     .unwrap();
    ///
    /// assert_eq!(config.settings.get("db.url"), Some(&json!("postgres://localhost/app")));
    /// ```
    pub fn with_string(mut self, content: &str, format: &str) -> Result<Self, ConfigError> {
        let layer: Value = match format.to_lowercase().as_str() {
            "toml" => toml::from_str(content)?,
            "json" => serde_json::from_str(content)?,
            other => return Err(ConfigError::unsupported_format(other)),
        };

        let Value::Object(layer) = layer else {
            return Err(ConfigError::invalid_value("<root>", "expected a table"));
        };

        merge_into(&mut self.overlay, layer);
        Ok(self)
    }

    /// Set environment variable prefix for overrides.
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: &str) -> Self {
        self.env_prefix = Some(prefix.to_uppercase());
        self
    }

    /// Load a `.env` file from the current directory or its parents.
    ///
    /// A missing file is not an error.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Dotenv` if the file exists but cannot be parsed.
    pub fn with_dotenv(self) -> Result<Self, ConfigError> {
        match dotenvy::dotenv() {
            Ok(_) => Ok(self),
            Err(e) if e.not_found() => Ok(self),
            Err(e) => Err(e.into()),
        }
    }

    /// Finalize and return the loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if an environment variable is malformed, a
    /// layered value has the wrong type, or validation fails.
    pub fn load(mut self) -> Result<HandlrConfig, ConfigError> {
        if let Some(prefix) = self.env_prefix.take() {
            self.apply_env_overrides(&prefix)?;
        }

        let Value::Object(mut tree) = serde_json::to_value(&self.base)? else {
            return Err(ConfigError::invalid_value("<root>", "expected a table"));
        };
        merge_into(&mut tree, self.overlay);

        let config: HandlrConfig = serde_json::from_value(Value::Object(tree))?;
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self, prefix: &str) -> Result<(), ConfigError> {
        let marker = format!("{prefix}__");
        let mut vars: Vec<(String, String)> = env::vars().filter(|(k, _)| k.starts_with(&marker)).collect();
        vars.sort();

        for (key, value) in vars {
            self.apply_env_var(&key, &value, prefix)?;
        }

        Ok(())
    }

    fn apply_env_var(&mut self, key: &str, value: &str, prefix: &str) -> Result<(), ConfigError> {
        let rest = key
            .strip_prefix(prefix)
            .and_then(|k| k.strip_prefix("__"))
            .ok_or_else(|| ConfigError::env_parse_error(key, "invalid key format"))?;

        let segments: Vec<String> = rest.split("__").map(str::to_lowercase).collect();
        if segments.iter().any(String::is_empty) {
            return Err(ConfigError::env_parse_error(key, "empty path segment"));
        }

        let dotted = segments.join(".");
        let target = if RESERVED_SECTIONS.contains(&segments[0].as_str()) {
            dotted
        } else {
            format!("settings.{dotted}")
        };

        path::put(&mut self.overlay, &target, parse_env_value(value));
        Ok(())
    }
}

/// Parses an environment value as JSON, falling back to a plain string.
fn parse_env_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
