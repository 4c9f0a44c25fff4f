//! Header encoding/decoding and framed stream IO.

use std::io::{Read, Write};

use crate::error::{ProtocolError, ProtocolResult};
use crate::frame::Frame;
use crate::{HEADER_LEN, MAX_BODY_LEN};

/// Encodes a body length as the 4-byte wire header.
///
/// The length is rendered as right-justified, space-padded ASCII decimal.
/// Lengths above the body cap are clamped to it, the same policy as
/// [`Frame::new`], so the header always fits in 4 bytes and always decodes.
pub fn encode_header(body_len: usize) -> [u8; HEADER_LEN] {
    let body_len = body_len.min(MAX_BODY_LEN);
    let text = format!("{:>4}", body_len);
    let mut header = [0u8; HEADER_LEN];
    header.copy_from_slice(text.as_bytes());
    header
}

/// Decodes the 4-byte wire header into a body length.
///
/// Accepts space- or zero-padded decimal digits. Fails with
/// [`ProtocolError::MalformedHeader`] on anything else and with
/// [`ProtocolError::BodyTooLarge`] if the value exceeds the body cap.
/// Either failure means the stream position is lost; the caller must
/// close the connection without attempting a body read.
pub fn decode_header(header: &[u8; HEADER_LEN]) -> ProtocolResult<usize> {
    let malformed = || ProtocolError::MalformedHeader { header: *header };

    let text = std::str::from_utf8(header).map_err(|_| malformed())?;
    let digits = text.trim_start_matches(' ');
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err(malformed());
    }

    let length: usize = digits.parse().map_err(|_| malformed())?;
    if length > MAX_BODY_LEN {
        return Err(ProtocolError::BodyTooLarge {
            length,
            max: MAX_BODY_LEN,
        });
    }
    Ok(length)
}

/// Encodes a frame to bytes ready for transmission.
pub fn encode_frame(frame: &Frame) -> Vec<u8> {
    let mut buffer = Vec::with_capacity(HEADER_LEN + frame.body_len());
    buffer.extend_from_slice(&encode_header(frame.body_len()));
    buffer.extend_from_slice(frame.body());
    buffer
}

/// Decodes a frame from a complete in-memory buffer (header + body).
pub fn decode_frame(data: &[u8]) -> ProtocolResult<Frame> {
    if data.len() < HEADER_LEN {
        return Err(ProtocolError::IncompleteFrame {
            expected: HEADER_LEN,
            received: data.len(),
        });
    }

    let header: [u8; HEADER_LEN] = data[..HEADER_LEN].try_into().expect("sliced to header length");
    let body_len = decode_header(&header)?;

    if data.len() < HEADER_LEN + body_len {
        return Err(ProtocolError::IncompleteFrame {
            expected: HEADER_LEN + body_len,
            received: data.len(),
        });
    }

    Ok(Frame::new(data[HEADER_LEN..HEADER_LEN + body_len].to_vec()))
}

/// Reads frames from a byte stream.
pub struct FrameReader<R> {
    reader: R,
}

impl<R: Read> FrameReader<R> {
    /// Creates a new FrameReader wrapping the given reader.
    pub fn new(reader: R) -> Self {
        Self { reader }
    }

    /// Reads a single frame.
    ///
    /// Returns `Ok(None)` on clean EOF at a frame boundary. EOF after the
    /// header has started is an error — the peer vanished mid-frame.
    pub fn read_frame(&mut self) -> ProtocolResult<Option<Frame>> {
        let mut header = [0u8; HEADER_LEN];
        match self.reader.read_exact(&mut header) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        }

        let body_len = decode_header(&header)?;

        let mut body = vec![0u8; body_len];
        self.reader.read_exact(&mut body)?;
        Ok(Some(Frame::new(body)))
    }

    /// Unwraps this FrameReader, returning the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

/// Writes frames to a byte stream.
pub struct FrameWriter<W> {
    writer: W,
}

impl<W: Write> FrameWriter<W> {
    /// Creates a new FrameWriter wrapping the given writer.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Writes a single frame, header and body together.
    pub fn write_frame(&mut self, frame: &Frame) -> ProtocolResult<()> {
        self.writer.write_all(&encode_frame(frame))?;
        Ok(())
    }

    /// Flushes the underlying writer.
    pub fn flush(&mut self) -> ProtocolResult<()> {
        self.writer.flush()?;
        Ok(())
    }

    /// Unwraps this FrameWriter, returning the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
