//! Configuration types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{ConfigError, Settings};

/// Environment variable that selects the [`RuntimeMode`].
pub const MODE_ENV_VAR: &str = "HANDLR_ENV";

/// Whether the process runs in development or production.
///
/// Production mode skips handlers flagged as development-only and switches
/// logging to JSON.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeMode {
    /// Development mode (the default).
    #[default]
    Development,
    /// Production mode.
    Production,
}

impl RuntimeMode {
    /// Resolves the mode from the `HANDLR_ENV` environment variable.
    ///
    /// `production` or `prod` (any case) select production; anything else,
    /// including an unset variable, selects development.
    #[must_use]
    pub fn from_env() -> Self {
        std::env::var(MODE_ENV_VAR)
            .map(|value| Self::from_env_value(&value))
            .unwrap_or_default()
    }

    fn from_env_value(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "production" | "prod" => Self::Production,
            _ => Self::Development,
        }
    }

    /// Returns `true` in production mode.
    #[must_use]
    pub const fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }

    /// Returns the lowercase name of the mode.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Development => "development",
            Self::Production => "production",
        }
    }
}

impl fmt::Display for RuntimeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RuntimeMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "development" | "dev" => Ok(Self::Development),
            "production" | "prod" => Ok(Self::Production),
            other => Err(ConfigError::invalid_value(
                "mode",
                format!("expected 'development' or 'production', got '{other}'"),
            )),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "pretty" => Ok(Self::Pretty),
            other => Err(ConfigError::invalid_value(
                "logging.format",
                format!("expected 'json' or 'pretty', got '{other}'"),
            )),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// Whether logging is installed at all.
    pub enabled: bool,
    /// Filter directive, e.g. `info` or `handlr_runtime=debug,info`.
    pub level: String,
    /// Output format.
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self::for_mode(RuntimeMode::Development)
    }
}

impl LoggingConfig {
    /// Returns the logging defaults for a runtime mode.
    #[must_use]
    pub fn for_mode(mode: RuntimeMode) -> Self {
        match mode {
            RuntimeMode::Development => Self {
                enabled: true,
                level: "debug".to_string(),
                format: LogFormat::Pretty,
            },
            RuntimeMode::Production => Self {
                enabled: true,
                level: "info".to_string(),
                format: LogFormat::Json,
            },
        }
    }
}

/// Complete Handlr configuration.
///
/// ```
/// use handlr_config::{HandlrConfig, LogFormat, RuntimeMode};
///
/// let config = HandlrConfig::production();
/// assert_eq!(config.mode, RuntimeMode::Production);
/// assert_eq!(config.logging.format, LogFormat::Json);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HandlrConfig {
    /// Runtime mode.
    pub mode: RuntimeMode,
    /// Logging settings.
    pub logging: LoggingConfig,
    /// Free-form settings available to handlers and initializers.
    pub settings: Settings,
}

impl HandlrConfig {
    /// Development preset.
    #[must_use]
    pub fn development() -> Self {
        Self::for_mode(RuntimeMode::Development)
    }

    /// Production preset.
    #[must_use]
    pub fn production() -> Self {
        Self::for_mode(RuntimeMode::Production)
    }

    /// Preset for a runtime mode.
    #[must_use]
    pub fn for_mode(mode: RuntimeMode) -> Self {
        Self {
            mode,
            logging: LoggingConfig::for_mode(mode),
            settings: Settings::new(),
        }
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] if the log level is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.logging.enabled && self.logging.level.trim().is_empty() {
            return Err(ConfigError::invalid_value("logging.level", "must not be empty"));
        }
        Ok(())
    }
}
