//! The frame type: one unit of wire transfer and of room history.

use crate::MAX_BODY_LEN;

/// A single chat frame.
///
/// The body is opaque bytes to this crate; by convention the application
/// layer fills it with `"name: text"`. Construction clamps the body to
/// [`MAX_BODY_LEN`] bytes — a deliberate, silent size cap rather than an
/// error, so callers never have to handle an oversize failure on send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    body: Vec<u8>,
}

impl Frame {
    /// Creates a frame, truncating the body to the first 512 bytes.
    pub fn new(body: impl Into<Vec<u8>>) -> Self {
        let mut body = body.into();
        body.truncate(MAX_BODY_LEN);
        Self { body }
    }

    /// Returns the body bytes.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Returns the body length in bytes.
    pub fn body_len(&self) -> usize {
        self.body.len()
    }

    /// Consumes the frame, returning the body.
    pub fn into_body(self) -> Vec<u8> {
        self.body
    }
}

impl From<&str> for Frame {
    fn from(text: &str) -> Self {
        Self::new(text.as_bytes().to_vec())
    }
}
