//! Server error types.

use std::io;
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur in the server.
#[derive(Debug, Error)]
pub enum ServerError {
    /// IO error (bind, accept, socket).
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Protocol error (framing, decoding).
    #[error("Protocol error: {0}")]
    Protocol(#[from] linecast_protocol::ProtocolError),

    /// Configuration error.
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl ServerError {
    /// Creates a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}
