//! Error types for the Porkbun provider
//!
//! This module defines all error types used throughout the workspace.
//!
//! Wire-level failures fall into four kinds that callers can tell apart
//! through [`Error::kind`]:
//!
//! - **Transport**: the HTTP round-trip did not complete (network, timeout)
//! - **Cancelled**: the caller's cancellation token fired first
//! - **Decode**: the response body is not the expected JSON shape
//! - **Api**: a well-formed envelope whose status is not `SUCCESS`
//!
//! None of them is retried. Input validation errors are raised before any
//! network call is made.

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the Porkbun provider
#[derive(Error, Debug)]
pub enum Error {
    /// Network or timeout failure while talking to the registrar
    #[error("Transport error: {0}")]
    Transport(String),

    /// The operation was cancelled before the registrar answered
    #[error("Operation cancelled: {0}")]
    Cancelled(String),

    /// The response body could not be decoded
    #[error("Decode error: {0}")]
    Decode(String),

    /// The registrar answered with a non-`SUCCESS` status
    #[error("Registrar error: {message}")]
    Api {
        /// Registrar-supplied message
        message: String,
    },

    /// Non-2xx HTTP status without a decodable envelope
    #[error("HTTP error: {status} - {body}")]
    Http {
        /// HTTP status code
        status: u16,
        /// Raw (truncated) response body
        body: String,
    },

    /// Invalid input, caught before any network call
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// State store-related errors
    #[error("State store error: {0}")]
    StateStore(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

/// Coarse classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Network, timeout or non-2xx HTTP failure
    Transport,
    /// Cancellation requested by the caller
    Cancelled,
    /// Unparseable response body
    Decode,
    /// Application-level failure reported by the registrar
    Api,
    /// Rejected input
    InvalidInput,
    /// Configuration, state or host failure
    Local,
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a cancellation error
    pub fn cancelled(msg: impl Into<String>) -> Self {
        Self::Cancelled(msg.into())
    }

    /// Create a decode error
    pub fn decode(msg: impl Into<String>) -> Self {
        Self::Decode(msg.into())
    }

    /// Create an application failure carrying the registrar message
    pub fn api(message: impl Into<String>) -> Self {
        Self::Api {
            message: message.into(),
        }
    }

    /// Create an HTTP status error
    pub fn http(status: u16, body: impl Into<String>) -> Self {
        Self::Http {
            status,
            body: body.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a state store error
    pub fn state_store(msg: impl Into<String>) -> Self {
        Self::StateStore(msg.into())
    }

    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Transport(_) | Self::Http { .. } => ErrorKind::Transport,
            Self::Cancelled(_) => ErrorKind::Cancelled,
            Self::Decode(_) => ErrorKind::Decode,
            Self::Api { .. } => ErrorKind::Api,
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::Config(_)
            | Self::StateStore(_)
            | Self::Json(_)
            | Self::Io(_)
            | Self::Other(_) => ErrorKind::Local,
        }
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
