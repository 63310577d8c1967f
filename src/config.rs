//! Fixed reference configuration.
//!
//! The conformance setup is deliberately constant (no CLI flags, no
//! environment variables, no config file) so that every client
//! implementation is tested against the same ports and paths. Tests
//! substitute port 0 to get ephemeral bindings.

use std::net::{Ipv4Addr, SocketAddr};

/// Port for the raw socket transport.
pub const SOCKET_PORT: u16 = 9191;

/// Port for the HTTP transport.
pub const HTTP_PORT: u16 = 8181;

/// Base context path for the HTTP transport.
pub const CONTEXT_PATH: &str = "/test";

/// Sub-path serving the baseline contract.
pub const BASIC_PATH: &str = "/test";

/// Sub-path serving the extended contract.
pub const EXTENDED_PATH: &str = "/test2";

/// Resolved bind addresses. `Default` is the reference configuration.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub socket_addr: SocketAddr,
    pub http_addr: SocketAddr,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        HarnessConfig {
            socket_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, SOCKET_PORT)),
            http_addr: SocketAddr::from((Ipv4Addr::UNSPECIFIED, HTTP_PORT)),
        }
    }
}
