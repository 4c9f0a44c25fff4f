//! Duplex connection machinery shared by the server sessions and the client.
//!
//! The read half is [`read_frame`]: read exactly 4 header bytes, decode,
//! read exactly the body — or fail. Application code never sees a partial
//! frame.
//!
//! The write half is a FIFO queue drained by a pump task: [`WriteQueue`] is
//! the cloneable handle, [`spawn_write_pump`] owns the socket's write half
//! and transmits one fully encoded frame at a time, in submission order.
//! Close requests travel through the same queue, so all mutation of the
//! transport happens on the pump task.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

use linecast_protocol::{Frame, HEADER_LEN, ProtocolResult, decode_header, encode_frame};

/// A queued instruction for the write pump.
#[derive(Debug)]
pub enum Command {
    /// Transmit this frame.
    Frame(Frame),
    /// Shut the transport down and stop.
    Close,
}

/// Sending handle for a connection's outbound queue.
///
/// Frames are transmitted strictly in `send` order. Once the pump stops
/// (write error or close), queued frames are discarded and `send` reports
/// the queue as gone.
#[derive(Debug, Clone)]
pub struct WriteQueue {
    tx: mpsc::UnboundedSender<Command>,
}

impl WriteQueue {
    /// Creates a queue handle and the command receiver the pump drains.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<Command>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    /// Enqueues a frame for transmission.
    ///
    /// Returns `false` if the pump is gone; the frame is dropped in that
    /// case, never redirected.
    pub fn send(&self, frame: Frame) -> bool {
        self.tx.send(Command::Frame(frame)).is_ok()
    }

    /// Requests the pump to shut the transport down. Best-effort: a pump
    /// that already stopped makes this a no-op.
    pub fn close(&self) {
        let _ = self.tx.send(Command::Close);
    }
}

/// Reads one frame from the stream.
///
/// Returns `Ok(None)` on clean EOF before the first header byte. A decode
/// failure or an EOF mid-frame is an error, and the caller must treat the
/// connection as dead — no body read is attempted after a bad header and
/// no resynchronization is possible.
pub async fn read_frame<R>(reader: &mut R) -> ProtocolResult<Option<Frame>>
where
    R: AsyncRead + Unpin,
{
    let mut header = [0u8; HEADER_LEN];
    match reader.read_exact(&mut header).await {
        Ok(_) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
            return Ok(None);
        }
        Err(e) => return Err(e.into()),
    }

    let body_len = decode_header(&header)?;

    let mut body = vec![0u8; body_len];
    reader.read_exact(&mut body).await?;
    Ok(Some(Frame::new(body)))
}

/// Spawns the task that drains a connection's outbound queue.
///
/// One `write_all` of a complete encoded frame is in flight at a time, so
/// frames never interleave on the wire. On a write error or a close
/// command the pump shuts the writer down and exits; anything still queued
/// is dropped with the receiver.
pub fn spawn_write_pump<W>(
    mut writer: W,
    mut rx: mpsc::UnboundedReceiver<Command>,
) -> JoinHandle<()>
where
    W: AsyncWrite + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        while let Some(command) = rx.recv().await {
            match command {
                Command::Frame(frame) => {
                    trace!(body_len = frame.body_len(), "writing frame");
                    if let Err(e) = writer.write_all(&encode_frame(&frame)).await {
                        debug!(error = %e, "write failed, discarding outbound queue");
                        break;
                    }
                }
                Command::Close => {
                    debug!("close requested");
                    break;
                }
            }
        }
        rx.close();
        let _ = writer.shutdown().await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecast_protocol::ProtocolError;

    #[tokio::test]
    async fn read_frame_roundtrip() {
        let bytes = encode_frame(&Frame::from("alice: hi"));
        let mut reader: &[u8] = &bytes;

        let frame = read_frame(&mut reader).await.unwrap().unwrap();
        assert_eq!(frame.body(), b"alice: hi");
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_frame_clean_eof() {
        let mut reader: &[u8] = &[];
        assert!(read_frame(&mut reader).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn read_frame_malformed_header_reads_no_body() {
        let mut reader: &[u8] = b"abcdleftover";

        let result = read_frame(&mut reader).await;
        assert!(matches!(result, Err(ProtocolError::MalformedHeader { .. })));
        // Only the header was consumed.
        assert_eq!(reader, b"leftover");
    }

    #[tokio::test]
    async fn read_frame_eof_mid_body_is_error() {
        let mut bytes = encode_frame(&Frame::from("hello"));
        bytes.truncate(HEADER_LEN + 2);
        let mut reader: &[u8] = &bytes;

        assert!(matches!(
            read_frame(&mut reader).await,
            Err(ProtocolError::Io(_))
        ));
    }

    #[tokio::test]
    async fn write_pump_preserves_fifo_order() {
        let (local, mut remote) = tokio::io::duplex(4096);
        let (queue, rx) = WriteQueue::channel();
        let pump = spawn_write_pump(local, rx);

        assert!(queue.send(Frame::from("A")));
        assert!(queue.send(Frame::from("B")));
        assert!(queue.send(Frame::from("C")));

        for expected in ["A", "B", "C"] {
            let frame = read_frame(&mut remote).await.unwrap().unwrap();
            assert_eq!(frame.body(), expected.as_bytes());
        }

        queue.close();
        pump.await.unwrap();
        // Pump shut the writer down: remote sees EOF.
        assert!(read_frame(&mut remote).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn write_pump_stops_on_write_error() {
        let (local, remote) = tokio::io::duplex(16);
        drop(remote);

        let (queue, rx) = WriteQueue::channel();
        let pump = spawn_write_pump(local, rx);

        assert!(queue.send(Frame::new(vec![b'x'; 256])));
        pump.await.unwrap();

        // Pump is gone; later sends report the closed queue.
        assert!(!queue.send(Frame::from("late")));
    }
}
