//! Protocol error types.

use thiserror::Error;

/// Result type for protocol operations.
pub type ProtocolResult<T> = Result<T, ProtocolError>;

/// Errors that can occur while framing or deframing.
///
/// `MalformedHeader` and `BodyTooLarge` are unrecoverable for the stream
/// they occur on: the peer and this end no longer agree on frame
/// boundaries, so the caller must drop the connection.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// Header bytes are not a space-padded ASCII decimal number.
    #[error("malformed frame header: {header:?}")]
    MalformedHeader { header: [u8; 4] },

    /// Header decoded to a length above the body cap.
    #[error("frame body too large: {length} bytes (max: {max})")]
    BodyTooLarge { length: usize, max: usize },

    /// Buffer ended before a complete frame was available.
    #[error("incomplete frame: expected {expected} bytes, got {received}")]
    IncompleteFrame { expected: usize, received: usize },

    /// IO error during read/write.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
