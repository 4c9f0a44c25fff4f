//! Client library: single-connection controller for the broadcast server.
//!
//! [`ChatClient`] owns the outbound side of one connection; inbound frames
//! and the terminal disconnect notification arrive on the paired
//! [`ClientEvents`] stream. The interactive binary in this crate is a thin
//! consumer of that API — all protocol and connection logic lives below it.

mod controller;
pub mod error;

pub use controller::{ChatClient, ClientEvent, ClientEvents};
pub use error::{ClientError, ClientResult};
