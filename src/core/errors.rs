// Domain error types - internal details never reach clients

use crate::chain::verify::ProtocolError;
use thiserror::Error;

/// Main error type for identity resolution
#[derive(Error, Debug)]
pub enum IdentityError {
    /// Authentication required or credentials rejected (HTTP 401)
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// Access denied for an authenticated caller (HTTP 403)
    #[error("forbidden")]
    Forbidden,

    /// No scheme could be resolved for a challenge: several handlers are
    /// registered, no default scheme is configured and none was requested
    #[error("ambiguous authentication scheme")]
    AmbiguousScheme,

    /// A scheme was requested that no registered handler provides
    #[error("invalid authentication scheme: {0}")]
    InvalidScheme(String),

    /// A handler violated the verify or responder contract
    #[error("authentication protocol violation: {0}")]
    Protocol(#[from] ProtocolError),

    /// Error reported by a handler, passed through unchanged
    #[error("authentication handler error: {0}")]
    Handler(anyhow::Error),

    /// Invalid configuration (HTTP 500)
    #[error("configuration error: {0}")]
    Configuration(String),

    /// Credential or session store failure (HTTP 500)
    #[error("store error: {0}")]
    Store(String),
}

impl IdentityError {
    /// Get HTTP status code for this error
    pub fn status_code(&self) -> u16 {
        match self {
            IdentityError::Unauthorized(_) => 401,
            IdentityError::Forbidden => 403,
            IdentityError::AmbiguousScheme => 500,
            IdentityError::InvalidScheme(_) => 500,
            IdentityError::Protocol(_) => 500,
            IdentityError::Handler(_) => 500,
            IdentityError::Configuration(_) => 500,
            IdentityError::Store(_) => 500,
        }
    }

    /// Get user-facing error message (no sensitive information)
    pub fn user_message(&self) -> String {
        match self {
            IdentityError::Unauthorized(message) => message.clone(),
            IdentityError::Forbidden => "Forbidden".to_string(),
            IdentityError::AmbiguousScheme => "Internal error".to_string(),
            IdentityError::InvalidScheme(_) => "Internal error".to_string(),
            IdentityError::Protocol(_) => "Internal error".to_string(),
            IdentityError::Handler(_) => "Internal error".to_string(),
            IdentityError::Configuration(_) => "Internal error".to_string(),
            IdentityError::Store(_) => "Internal error".to_string(),
        }
    }
}
