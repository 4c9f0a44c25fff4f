//! Single-connection chat controller.
//!
//! [`ChatClient`] mirrors a server session without the fan-out: the socket
//! is driven by background tasks (the read loop and the write pump), and
//! the foreground consumes inbound traffic through an event channel. That
//! channel is the one hand-off that crosses from the network tasks to the
//! caller's thread of control, and it is the only one — the controller
//! shares no other mutable state with its tasks.

use std::net::SocketAddr;

use tokio::net::{TcpStream, ToSocketAddrs};
use tokio::sync::mpsc;
use tracing::{debug, warn};

use linecast_protocol::Frame;
use linecast_server::connection::{WriteQueue, read_frame, spawn_write_pump};

use crate::error::{ClientError, ClientResult};

/// Inbound notification from the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientEvent {
    /// One complete frame body, in arrival order.
    Message(Vec<u8>),
    /// The connection is gone (EOF, transport error, or decode failure).
    /// Terminal: nothing follows, and the controller does not reconnect.
    Disconnected,
}

/// Receiving end of the inbound event stream.
pub type ClientEvents = mpsc::UnboundedReceiver<ClientEvent>;

/// Handle to one live connection to the broadcast server.
pub struct ChatClient {
    queue: WriteQueue,
    peer_addr: SocketAddr,
}

impl ChatClient {
    /// Connects to the server and starts the socket tasks.
    ///
    /// Returns the controller plus the event stream. The stream yields one
    /// [`ClientEvent::Message`] per fully assembled frame, then a single
    /// [`ClientEvent::Disconnected`] when the connection dies.
    pub async fn connect(addr: impl ToSocketAddrs) -> ClientResult<(Self, ClientEvents)> {
        let stream = TcpStream::connect(addr)
            .await
            .map_err(|e| ClientError::Connection(format!("failed to connect: {e}")))?;
        let peer_addr = stream.peer_addr()?;
        debug!(%peer_addr, "connected to server");

        let (mut read_half, write_half) = stream.into_split();
        let (queue, rx) = WriteQueue::channel();
        spawn_write_pump(write_half, rx);

        let (event_tx, events) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            loop {
                match read_frame(&mut read_half).await {
                    Ok(Some(frame)) => {
                        if event_tx.send(ClientEvent::Message(frame.into_body())).is_err() {
                            // Nobody is listening anymore.
                            return;
                        }
                    }
                    Ok(None) => {
                        debug!("server closed the connection");
                        break;
                    }
                    Err(e) => {
                        warn!(error = %e, "connection lost");
                        break;
                    }
                }
            }
            let _ = event_tx.send(ClientEvent::Disconnected);
        });

        Ok((Self { queue, peer_addr }, events))
    }

    /// Returns the server address this client is connected to.
    pub fn peer_addr(&self) -> SocketAddr {
        self.peer_addr
    }

    /// Enqueues a body for transmission, clamped to the 512-byte cap.
    ///
    /// Bodies are transmitted in `send` order. Fails with
    /// [`ClientError::Closed`] once the connection is gone.
    pub fn send(&self, body: impl Into<Vec<u8>>) -> ClientResult<()> {
        if self.queue.send(Frame::new(body)) {
            Ok(())
        } else {
            Err(ClientError::Closed)
        }
    }

    /// Requests the connection to close. The event stream will end with
    /// [`ClientEvent::Disconnected`] once the socket is torn down.
    pub fn close(&self) {
        self.queue.close();
    }
}
