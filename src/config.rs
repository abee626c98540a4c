use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::sync::Arc;

pub const DEFAULT_PORT: u16 = 5173;

/// Server configuration: fixed at startup, immutable afterwards, threaded
/// explicitly into the request handlers through axum state.
pub struct ServeConfig {
    /// Absolute root directory; no request may resolve outside it.
    pub root: PathBuf,
    pub host: IpAddr,
    pub port: u16,
}

impl ServeConfig {
    pub fn new(root: PathBuf, host: IpAddr, port: u16) -> Self {
        Self { root, host, port }
    }

    /// Get the socket address for binding
    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for ServeConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: DEFAULT_PORT,
        }
    }
}

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServeConfig>,
}
