//! Registration errors.

use handlr_core::HandlrError;
use thiserror::Error;

/// Errors raised while registering handlers, middleware or initializers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// A handler with this name is already registered.
    #[error("handler '{0}' is already registered")]
    DuplicateHandler(String),

    /// A middleware with this name is already registered.
    #[error("middleware '{0}' is already registered")]
    DuplicateMiddleware(String),

    /// A handler asked for a middleware that is not registered.
    #[error("middleware '{0}' is not registered")]
    UnknownMiddleware(String),

    /// A definition is unusable as given.
    #[error("invalid definition '{name}': {reason}")]
    InvalidDefinition {
        /// Name of the offending definition.
        name: String,
        /// What is wrong with it.
        reason: String,
    },
}

impl RegistryError {
    /// Creates an invalid-definition error.
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDefinition {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

impl From<RegistryError> for HandlrError {
    fn from(err: RegistryError) -> Self {
        Self::other(err)
    }
}
