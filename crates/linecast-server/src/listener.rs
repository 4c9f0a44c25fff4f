//! TCP listener and per-connection session driver.

use std::net::SocketAddr;

use tokio::net::{TcpListener, TcpStream};
use tracing::{debug, error, info, warn};

use crate::config::ServerConfig;
use crate::connection::{WriteQueue, read_frame, spawn_write_pump};
use crate::error::ServerResult;
use crate::room::Room;

/// TCP listener that attaches every accepted connection to one room.
pub struct Listener {
    listener: TcpListener,
    room: Room,
}

impl Listener {
    /// Binds to the configured address.
    pub async fn bind(config: &ServerConfig) -> ServerResult<Self> {
        let listener = TcpListener::bind(config.bind_addr).await?;
        info!(addr = %listener.local_addr()?, "server listening");

        Ok(Self {
            listener,
            room: Room::new(config.max_history),
        })
    }

    /// Returns the bound address (useful when binding to port 0).
    pub fn local_addr(&self) -> ServerResult<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Returns a handle to the room this listener feeds.
    pub fn room(&self) -> Room {
        self.room.clone()
    }

    /// Runs the accept loop indefinitely.
    ///
    /// Each accepted connection gets its own session task, so accept
    /// throughput is never serialized behind session setup. Accept errors
    /// are logged and the loop keeps going.
    pub async fn run(&self) -> ServerResult<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, peer)) => {
                    debug!(%peer, "accepted connection");
                    spawn_session(stream, self.room.clone());
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }

    /// Runs the accept loop until the shutdown future completes.
    pub async fn run_until_shutdown<S>(&self, shutdown: S) -> ServerResult<()>
    where
        S: Future<Output = ()> + Send,
    {
        tokio::select! {
            result = self.run() => result,
            _ = shutdown => {
                info!("shutdown signal received");
                Ok(())
            }
        }
    }
}

/// Spawns the session task for one accepted connection.
///
/// The session joins the room (which replays the backlog into its write
/// queue), then loops reading frames into `Room::deliver`. Any read error,
/// decode failure, or clean EOF ends the session: the member leaves the
/// room exactly once and the write pump is told to shut the socket down.
fn spawn_session(stream: TcpStream, room: Room) {
    tokio::spawn(async move {
        let (mut read_half, write_half) = stream.into_split();
        let (queue, rx) = WriteQueue::channel();
        spawn_write_pump(write_half, rx);

        let id = room.join(queue.clone()).await;

        loop {
            match read_frame(&mut read_half).await {
                Ok(Some(frame)) => room.deliver(frame).await,
                Ok(None) => {
                    debug!(%id, "peer closed connection");
                    break;
                }
                Err(e) => {
                    warn!(%id, error = %e, "connection failed");
                    break;
                }
            }
        }

        room.leave(id).await;
        queue.close();
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use linecast_protocol::{Frame, encode_frame};
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpStream;

    async fn start_listener() -> (SocketAddr, Room) {
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap());
        let listener = Listener::bind(&config).await.unwrap();
        let addr = listener.local_addr().unwrap();
        let room = listener.room();
        tokio::spawn(async move {
            let _ = listener.run().await;
        });
        (addr, room)
    }

    async fn send(stream: &mut TcpStream, body: &str) {
        stream
            .write_all(&encode_frame(&Frame::from(body)))
            .await
            .unwrap();
    }

    async fn recv(stream: &mut TcpStream) -> String {
        let frame = read_frame(stream).await.unwrap().expect("frame");
        String::from_utf8_lossy(frame.body()).into_owned()
    }

    async fn wait_for_members(room: &Room, count: usize) {
        let mut tries = 0;
        while room.member_count().await != count && tries < 200 {
            tokio::time::sleep(std::time::Duration::from_millis(5)).await;
            tries += 1;
        }
        assert_eq!(room.member_count().await, count);
    }

    #[tokio::test]
    async fn broadcast_echoes_to_all_members_including_sender() {
        let (addr, room) = start_listener().await;

        let mut alice = TcpStream::connect(addr).await.unwrap();
        let mut bob = TcpStream::connect(addr).await.unwrap();
        wait_for_members(&room, 2).await;

        send(&mut alice, "alice: hi").await;

        assert_eq!(recv(&mut alice).await, "alice: hi");
        assert_eq!(recv(&mut bob).await, "alice: hi");
        assert_eq!(room.history().await.len(), 1);
    }

    #[tokio::test]
    async fn late_joiner_receives_backlog_then_live_traffic() {
        let (addr, _room) = start_listener().await;

        let mut alice = TcpStream::connect(addr).await.unwrap();
        for i in 1..=5 {
            send(&mut alice, &format!("{i}")).await;
            // Wait for the echo so the server has processed the frame.
            assert_eq!(recv(&mut alice).await, format!("{i}"));
        }

        let mut late = TcpStream::connect(addr).await.unwrap();
        for i in 1..=5 {
            assert_eq!(recv(&mut late).await, format!("{i}"));
        }

        send(&mut alice, "6").await;
        assert_eq!(recv(&mut late).await, "6");
    }

    #[tokio::test]
    async fn malformed_header_closes_connection_without_broadcast() {
        let (addr, room) = start_listener().await;

        let mut bob = TcpStream::connect(addr).await.unwrap();
        let mut mallory = TcpStream::connect(addr).await.unwrap();

        mallory.write_all(b"abcd").await.unwrap();

        // The server drops mallory: clean EOF from this side.
        assert!(read_frame(&mut mallory).await.unwrap().is_none());

        // Nothing reached the room; bob's next frame is the first broadcast.
        send(&mut bob, "bob: ok").await;
        assert_eq!(recv(&mut bob).await, "bob: ok");
        assert_eq!(room.history().await.len(), 1);
    }

    #[tokio::test]
    async fn disconnect_leaves_the_room() {
        let (addr, room) = start_listener().await;

        let mut alice = TcpStream::connect(addr).await.unwrap();
        send(&mut alice, "hello").await;
        assert_eq!(recv(&mut alice).await, "hello");
        assert_eq!(room.member_count().await, 1);

        drop(alice);

        // The session notices EOF and unregisters.
        wait_for_members(&room, 0).await;
    }

    #[tokio::test]
    async fn run_until_shutdown_returns_on_signal() {
        let config = ServerConfig::new("127.0.0.1:0".parse().unwrap());
        let listener = Listener::bind(&config).await.unwrap();

        listener.run_until_shutdown(async {}).await.unwrap();
    }
}
