//! Broadcast server: room, connection machinery, TCP listener.
//!
//! Accepted connections join one shared [`Room`]; every frame a connection
//! reads is delivered to the room, which appends it to a bounded history
//! and fans it out to all members' write queues. New members receive the
//! retained history before any live traffic.
//!
//! The duplex connection primitives in [`connection`] are also used by the
//! client crate — the read/write state machine is the same on both ends of
//! the wire.
//!
//! # Example
//!
//! ```rust,no_run
//! use linecast_server::{Listener, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServerConfig::default();
//!     let listener = Listener::bind(&config).await?;
//!     listener.run().await?;
//!     Ok(())
//! }
//! ```

pub mod connection;

mod config;
mod error;
mod listener;
mod room;

pub use config::{DEFAULT_MAX_HISTORY, ServerConfig};
pub use error::{ServerError, ServerResult};
pub use listener::Listener;
pub use room::{ConnId, Room};
