//! Wire framing for linecast.
//!
//! Every message on the wire is a single frame:
//!
//! ```text
//! +-------------------+------------------+
//! | header (4 bytes)  |  body (0..512)   |
//! +-------------------+------------------+
//! ```
//!
//! The header is the body length as right-justified, space-padded ASCII
//! decimal (`"   9"` for a 9-byte body). There is no magic number, version
//! field, or checksum; both ends rely on the 4-byte header and the 512-byte
//! body cap. A header that fails to decode is fatal to the connection — the
//! stream offers no way to resynchronize.
//!
//! # Example
//!
//! ```rust
//! use linecast_protocol::{Frame, decode_frame, encode_frame};
//!
//! let frame = Frame::new("alice: hi");
//! let bytes = encode_frame(&frame);
//! assert_eq!(&bytes[..4], b"   9");
//! let decoded = decode_frame(&bytes).unwrap();
//! assert_eq!(decoded.body(), b"alice: hi");
//! ```

mod error;
mod frame;
mod framing;

pub use error::{ProtocolError, ProtocolResult};
pub use frame::Frame;
pub use framing::{FrameReader, FrameWriter, decode_frame, decode_header, encode_frame, encode_header};

/// Header length in bytes.
pub const HEADER_LEN: usize = 4;

/// Maximum body length in bytes. Longer bodies are clamped, not rejected.
pub const MAX_BODY_LEN: usize = 512;

/// Default TCP port for the broadcast server.
pub const DEFAULT_PORT: u16 = 8080;
