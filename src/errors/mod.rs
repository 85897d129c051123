//! Error types for the SegView client.
//!
//! Every failure surfaces as a [`SegViewError`]. The variants separate local
//! mistakes (bad configuration, invalid input, unreadable files) from failures
//! reported by the remote service or the network in between.

use thiserror::Error;

/// Result type alias for SegView operations.
pub type SegViewResult<T> = Result<T, SegViewError>;

/// Status carried by errors that did not come with an HTTP status.
pub const DEFAULT_ERROR_STATUS: u16 = 500;

/// Status reported for configuration and validation errors.
pub const CLIENT_ERROR_STATUS: u16 = 400;

/// Error type for SegView client operations.
#[derive(Debug, Error)]
pub enum SegViewError {
    /// Invalid client configuration (missing credentials, missing base URL).
    #[error("Configuration error: {message}")]
    Configuration {
        /// Error message describing the configuration issue.
        message: String,
    },

    /// Caller input rejected before any I/O took place.
    #[error("Validation error: {message}")]
    Validation {
        /// Error message describing the validation issue.
        message: String,
    },

    /// A local file could not be read.
    #[error("Local I/O error: {message}")]
    LocalIo {
        /// Error message.
        message: String,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// Failure reported by the service or the transport.
    #[error("SegView service error (HTTP {status}): {message}")]
    Service {
        /// Human readable message.
        message: String,
        /// HTTP status, 500 when the failure happened before a response.
        status: u16,
    },
}

impl SegViewError {
    /// Creates a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        SegViewError::Configuration {
            message: message.into(),
        }
    }

    /// Creates a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        SegViewError::Validation {
            message: message.into(),
        }
    }

    /// Creates a service error with an explicit status.
    pub fn service(message: impl Into<String>, status: u16) -> Self {
        SegViewError::Service {
            message: message.into(),
            status,
        }
    }

    /// Creates a service error with the default status (500).
    pub fn service_default(message: impl Into<String>) -> Self {
        Self::service(message, DEFAULT_ERROR_STATUS)
    }

    /// Returns the status associated with this error.
    pub fn status(&self) -> u16 {
        match self {
            SegViewError::Configuration { .. } | SegViewError::Validation { .. } => {
                CLIENT_ERROR_STATUS
            }
            SegViewError::LocalIo { .. } => DEFAULT_ERROR_STATUS,
            SegViewError::Service { status, .. } => *status,
        }
    }

    /// Returns the bare message without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            SegViewError::Configuration { message }
            | SegViewError::Validation { message }
            | SegViewError::LocalIo { message, .. }
            | SegViewError::Service { message, .. } => message,
        }
    }

    /// Returns true if the failure originated at the service or transport.
    pub fn is_service(&self) -> bool {
        matches!(self, SegViewError::Service { .. })
    }
}

impl From<std::io::Error> for SegViewError {
    fn from(err: std::io::Error) -> Self {
        SegViewError::LocalIo {
            message: err.to_string(),
            source: err,
        }
    }
}

impl From<url::ParseError> for SegViewError {
    fn from(err: url::ParseError) -> Self {
        SegViewError::Configuration {
            message: format!("Invalid URL: {}", err),
        }
    }
}
