//! Error types for the console client
//!
//! This module defines all error types used throughout the crate.

use thiserror::Error;

/// Result type alias for console operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the console client
#[derive(Error, Debug)]
pub enum Error {
    /// Login rejected (wrong username or password)
    #[error("invalid username or password")]
    InvalidCredentials,

    /// Account creation rejected (username taken)
    #[error("user already exists")]
    UserExists,

    /// The server rejected the bearer token (or no token is held)
    #[error("not authorized")]
    Unauthorized,

    /// The server rejected a submitted address value (HTTP 400)
    #[error("value failed server-side format validation")]
    InvalidFormat,

    /// Unexpected HTTP status from the API
    #[error("unexpected API status: {status}")]
    Api {
        /// The HTTP status code returned
        status: u16,
    },

    /// Transport-level failure (connection refused, timeout, TLS, ...)
    #[error("transport error: {0}")]
    Transport(String),

    /// Token store errors (reading or persisting the credential)
    #[error("token store error: {0}")]
    TokenStore(String),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a token store error
    pub fn token_store(msg: impl Into<String>) -> Self {
        Self::TokenStore(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an error for an unexpected HTTP status
    pub fn api(status: u16) -> Self {
        Self::Api { status }
    }

    /// Whether this error means the session token is no longer accepted
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }
}

/// Helper for converting anyhow::Error to our Error type
impl From<anyhow::Error> for Error {
    fn from(err: anyhow::Error) -> Self {
        Self::Other(err.to_string())
    }
}
