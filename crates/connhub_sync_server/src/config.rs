//! Server configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Configuration for the sync server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to.
    pub bind_addr: SocketAddr,
    /// Directory holding uploaded files. Cleared on every start.
    pub storage_root: PathBuf,
    /// Directory holding `index.html` and `favicon.ico`, if any.
    pub asset_dir: Option<PathBuf>,
    /// Longest wait for the next chunk of a request body.
    pub read_timeout: Duration,
    /// Maximum size of a text body.
    pub max_text_bytes: usize,
    /// Maximum size of a multipart part header block.
    pub max_part_header_bytes: usize,
    /// Whether stopping the server also removes the storage directory.
    pub clear_storage_on_stop: bool,
}

impl ServerConfig {
    /// Creates a new server configuration.
    pub fn new(bind_addr: SocketAddr) -> Self {
        Self {
            bind_addr,
            storage_root: PathBuf::from("./temp"),
            asset_dir: None,
            read_timeout: Duration::from_secs(5),
            max_text_bytes: 16 * 1024 * 1024,
            max_part_header_bytes: 16 * 1024,
            clear_storage_on_stop: false,
        }
    }

    /// Sets the storage directory.
    pub fn with_storage_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.storage_root = root.into();
        self
    }

    /// Sets the static asset directory.
    pub fn with_asset_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.asset_dir = Some(dir.into());
        self
    }

    /// Sets the request body idle timeout.
    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    /// Sets the maximum text body size.
    pub fn with_max_text_bytes(mut self, max: usize) -> Self {
        self.max_text_bytes = max;
        self
    }

    /// Sets the maximum multipart part header size.
    pub fn with_max_part_header_bytes(mut self, max: usize) -> Self {
        self.max_part_header_bytes = max;
        self
    }

    /// Removes the storage directory when the server stops.
    pub fn with_clear_storage_on_stop(mut self, clear: bool) -> Self {
        self.clear_storage_on_stop = clear;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new(SocketAddr::from(([0, 0, 0, 0], 8000)))
    }
}
