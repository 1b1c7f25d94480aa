//! Error types for the wufoo-sync core library
//!
//! Remote validation failures are not errors: they come back as
//! [`SaveOutcome::Rejected`](crate::SaveOutcome). The variants below cover
//! transport problems, unreadable responses and missing configuration.

use thiserror::Error;

/// Main error type for wufoo-sync operations
#[derive(Error, Debug)]
pub enum Error {
    /// HTTP/Network related errors
    #[error("HTTP error: {message}")]
    Http {
        message: String,
        status_code: Option<u16>,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// HTTP client or request construction errors
    #[error("HTTP request error: {message}")]
    HttpRequest {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// JSON parsing and serialization errors
    #[error("JSON error: {message}")]
    Json {
        message: String,
        #[source]
        source: serde_json::Error,
    },

    /// The remote service answered with a body we could not interpret
    #[error("Unexpected response from {operation}: {message}")]
    Response {
        operation: String,
        message: String,
    },

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration {
        message: String,
        #[source]
        source: Option<anyhow::Error>,
    },

    /// IO errors
    #[error("IO error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic internal error with context
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

/// Convenience type alias for Results using our Error type
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a configuration error without a source
    pub fn configuration(message: impl Into<String>) -> Self {
        Error::Configuration {
            message: message.into(),
            source: None,
        }
    }

    /// Create a response error for the named remote operation
    pub fn response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Response {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// HTTP status code, when the failure came from a remote response
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Error::Http { status_code, .. } => *status_code,
            _ => None,
        }
    }
}

// Conversion implementations
impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Error::Internal {
            message: err.to_string(),
            source: err,
        }
    }
}
