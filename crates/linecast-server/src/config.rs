//! Server configuration.

use std::net::{Ipv4Addr, SocketAddr};

use linecast_protocol::DEFAULT_PORT;

/// How many delivered frames the room keeps for replay to new joiners.
pub const DEFAULT_MAX_HISTORY: usize = 100;

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the TCP listener binds to.
    pub bind_addr: SocketAddr,

    /// Upper bound on retained room history.
    pub max_history: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, DEFAULT_PORT)),
            max_history: DEFAULT_MAX_HISTORY,
        }
    }
}

impl ServerConfig {
    /// Creates a new server configuration with the given bind address.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            ..Default::default()
        }
    }

    /// Builder: set the bind address.
    pub fn with_bind_addr(mut self, bind_addr: SocketAddr) -> Self {
        self.bind_addr = bind_addr;
        self
    }

    /// Builder: set the history bound.
    pub fn with_max_history(mut self, max_history: usize) -> Self {
        self.max_history = max_history;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr.port(), DEFAULT_PORT);
        assert!(config.bind_addr.ip().is_unspecified());
        assert_eq!(config.max_history, 100);
    }

    #[test]
    fn custom_config() {
        let addr: SocketAddr = "127.0.0.1:9000".parse().unwrap();
        let config = ServerConfig::new(addr).with_max_history(10);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_history, 10);
    }
}
