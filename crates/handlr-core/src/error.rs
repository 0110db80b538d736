//! Error taxonomy for Handlr.
//!
//! Every failure that crosses a handler pipeline is a [`HandlrError`]. The
//! taxonomy is fixed: each kind maps to one status code, and every error
//! exposes the same `{name, message, cause, status}` shape.
//!
//! | Kind | Name | Status |
//! |---|---|---|
//! | `Generic` | `generic_error` | caller-chosen |
//! | `Validation` | `validation_error` | 400 |
//! | `Value` | `value_error` | 400 |
//! | `Authentication` | `authentication_error` | 401 |
//! | `Forbidden` | `forbidden` | 403 |
//! | `Other` | `error` | none |
//!
//! Arbitrary faults (I/O, bugs in validators, downstream failures) travel as
//! [`HandlrError::Other`] and carry no status of their own.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::ValidationFailure;

/// Result type alias using [`HandlrError`].
pub type HandlrResult<T> = Result<T, HandlrError>;

/// Classification of a [`HandlrError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Generic error with a caller-chosen status.
    Generic,
    /// Input did not conform to the handler schema.
    Validation,
    /// A value was semantically invalid.
    Value,
    /// Missing or invalid credentials.
    Authentication,
    /// The caller is not allowed to perform the operation.
    Forbidden,
    /// An arbitrary fault outside the taxonomy.
    Other,
}

impl ErrorKind {
    /// Returns the wire name of this kind.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Generic => "generic_error",
            Self::Validation => "validation_error",
            Self::Value => "value_error",
            Self::Authentication => "authentication_error",
            Self::Forbidden => "forbidden",
            Self::Other => "error",
        }
    }

    /// Returns the fixed status code of this kind, if it has one.
    ///
    /// `Generic` errors carry their own status and `Other` faults have none.
    #[must_use]
    pub const fn fixed_status(self) -> Option<StatusCode> {
        match self {
            Self::Validation | Self::Value => Some(StatusCode::BAD_REQUEST),
            Self::Authentication => Some(StatusCode::UNAUTHORIZED),
            Self::Forbidden => Some(StatusCode::FORBIDDEN),
            Self::Generic | Self::Other => None,
        }
    }
}

/// Standard error type for Handlr.
///
/// # Example
///
/// ```
/// use handlr_core::{HandlrError, ValidationFailure};
/// use http::StatusCode;
///
/// let mut failure = ValidationFailure::new();
/// failure.insert("email", "required");
///
/// let error = HandlrError::validation(failure);
/// assert_eq!(error.name(), "validation_error");
/// assert_eq!(error.status(), Some(StatusCode::BAD_REQUEST));
/// ```
#[derive(Error, Debug)]
pub enum HandlrError {
    /// Generic error with an explicit status.
    #[error("{message}")]
    Generic {
        /// Status code reported to the caller.
        status: StatusCode,
        /// Human-readable message.
        message: String,
        /// Optional structured cause.
        cause: Option<Value>,
    },

    /// Input validation failed.
    #[error("{message}")]
    Validation {
        /// Human-readable message.
        message: String,
        /// Field-level failures.
        cause: ValidationFailure,
    },

    /// A value was rejected.
    #[error("{message}")]
    Value {
        /// Human-readable message.
        message: String,
        /// Optional structured cause.
        cause: Option<Value>,
    },

    /// Authentication failed.
    #[error("{message}")]
    Authentication {
        /// Human-readable message.
        message: String,
        /// Optional structured cause.
        cause: Option<Value>,
    },

    /// Access denied.
    #[error("{message}")]
    Forbidden {
        /// Human-readable message.
        message: String,
        /// Optional structured cause.
        cause: Option<Value>,
    },

    /// Any other fault.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Message used when sanitization rejects an input tree.
pub(crate) const VALIDATION_MESSAGE: &str = "Input values do not conform to the expected schema";

impl HandlrError {
    /// Creates a generic error with an explicit status.
    #[must_use]
    pub fn generic(status: StatusCode, message: impl Into<String>) -> Self {
        Self::Generic {
            status,
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a validation error with the standard message.
    #[must_use]
    pub fn validation(cause: ValidationFailure) -> Self {
        Self::validation_with_message(VALIDATION_MESSAGE, cause)
    }

    /// Creates a validation error with a custom message.
    #[must_use]
    pub fn validation_with_message(message: impl Into<String>, cause: ValidationFailure) -> Self {
        Self::Validation {
            message: message.into(),
            cause,
        }
    }

    /// Creates a value error.
    #[must_use]
    pub fn value(message: impl Into<String>) -> Self {
        Self::Value {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates an authentication error.
    #[must_use]
    pub fn authentication(message: impl Into<String>) -> Self {
        Self::Authentication {
            message: message.into(),
            cause: None,
        }
    }

    /// Creates a forbidden error.
    #[must_use]
    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Forbidden {
            message: message.into(),
            cause: None,
        }
    }

    /// Wraps an arbitrary fault.
    pub fn other(fault: impl Into<anyhow::Error>) -> Self {
        Self::Other(fault.into())
    }

    /// Attaches a structured cause.
    ///
    /// Validation errors keep their failure map and `Other` faults have no
    /// cause slot; both are returned unchanged.
    #[must_use]
    pub fn with_cause(mut self, value: Value) -> Self {
        match &mut self {
            Self::Generic { cause, .. }
            | Self::Value { cause, .. }
            | Self::Authentication { cause, .. }
            | Self::Forbidden { cause, .. } => *cause = Some(value),
            Self::Validation { .. } | Self::Other(_) => {}
        }
        self
    }

    /// Returns the error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Generic { .. } => ErrorKind::Generic,
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Value { .. } => ErrorKind::Value,
            Self::Authentication { .. } => ErrorKind::Authentication,
            Self::Forbidden { .. } => ErrorKind::Forbidden,
            Self::Other(_) => ErrorKind::Other,
        }
    }

    /// Returns the wire name, e.g. `validation_error`.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.kind().name()
    }

    /// Returns the status carried by this error, if any.
    #[must_use]
    pub const fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Generic { status, .. } => Some(*status),
            _ => self.kind().fixed_status(),
        }
    }

    /// Returns the structured cause as JSON.
    #[must_use]
    pub fn cause(&self) -> Option<Value> {
        match self {
            Self::Validation { cause, .. } => serde_json::to_value(cause).ok(),
            Self::Generic { cause, .. }
            | Self::Value { cause, .. }
            | Self::Authentication { cause, .. }
            | Self::Forbidden { cause, .. } => cause.clone(),
            Self::Other(_) => None,
        }
    }

    /// Returns the field failures of a validation error.
    #[must_use]
    pub const fn failure(&self) -> Option<&ValidationFailure> {
        match self {
            Self::Validation { cause, .. } => Some(cause),
            _ => None,
        }
    }

    /// Returns `true` for validation errors.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation { .. })
    }

    /// Converts this error to its serializable body.
    #[must_use]
    pub fn to_body(&self) -> ErrorBody {
        ErrorBody {
            name: self.name().to_string(),
            message: self.to_string(),
            cause: self.cause(),
            status: self.status().map(|s| s.as_u16()),
        }
    }
}

/// Serializable `{name, message, cause, status}` view of a [`HandlrError`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Wire name of the error kind.
    pub name: String,
    /// Human-readable message.
    pub message: String,
    /// Structured cause.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cause: Option<Value>,
    /// Status code, absent for arbitrary faults.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fixed_statuses() {
        assert_eq!(
            HandlrError::validation(ValidationFailure::new()).status(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            HandlrError::value("bad").status(),
            Some(StatusCode::BAD_REQUEST)
        );
        assert_eq!(
            HandlrError::authentication("who").status(),
            Some(StatusCode::UNAUTHORIZED)
        );
        assert_eq!(
            HandlrError::forbidden("no").status(),
            Some(StatusCode::FORBIDDEN)
        );
        assert_eq!(
            HandlrError::generic(StatusCode::CONFLICT, "again").status(),
            Some(StatusCode::CONFLICT)
        );
        assert_eq!(HandlrError::other(anyhow::anyhow!("boom")).status(), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(HandlrError::value("x").name(), "value_error");
        assert_eq!(HandlrError::authentication("x").name(), "authentication_error");
        assert_eq!(HandlrError::forbidden("x").name(), "forbidden");
        assert_eq!(
            HandlrError::generic(StatusCode::IM_A_TEAPOT, "x").name(),
            "generic_error"
        );
        assert_eq!(HandlrError::other(anyhow::anyhow!("x")).name(), "error");
    }

    #[test]
    fn test_validation_cause_is_failure_map() {
        let mut failure = ValidationFailure::new();
        failure.insert("a", "required");

        let error = HandlrError::validation(failure);
        assert!(error.is_validation());
        assert_eq!(error.cause(), Some(json!({ "a": "required" })));
        assert_eq!(
            error.to_string(),
            "Input values do not conform to the expected schema"
        );
    }

    #[test]
    fn test_with_cause() {
        let error = HandlrError::forbidden("denied").with_cause(json!({ "role": "admin" }));
        assert_eq!(error.cause(), Some(json!({ "role": "admin" })));

        let fault = HandlrError::other(anyhow::anyhow!("boom")).with_cause(json!(1));
        assert_eq!(fault.cause(), None);
    }

    #[test]
    fn test_body_serialization() {
        let body = HandlrError::authentication("token expired").to_body();
        let json = serde_json::to_value(&body).expect("serialization should work");
        assert_eq!(
            json,
            json!({
                "name": "authentication_error",
                "message": "token expired",
                "status": 401
            })
        );

        let fault = HandlrError::other(anyhow::anyhow!("disk full")).to_body();
        assert_eq!(fault.status, None);
        assert_eq!(fault.message, "disk full");
    }
}
