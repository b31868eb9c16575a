//! Capabilities supplied by the embedding host.
//!
//! The server never reaches for a global logger or asset bundle. The host
//! hands it a [`HostEvents`] sink for user-visible log lines and address
//! announcements, and an [`AssetSource`] for the two static pages.

use std::collections::HashMap;
use std::path::PathBuf;
use tokio::sync::mpsc;

/// Sink for user-visible server events.
pub trait HostEvents: Send + Sync + 'static {
    /// Records a free-form log line.
    fn log(&self, message: &str);

    /// Announces a URL the server can be reached at, e.g. `http://192.168.1.5:8000`.
    fn announce_address(&self, url: &str);
}

/// Forwards host events to `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingHost;

impl HostEvents for TracingHost {
    fn log(&self, message: &str) {
        tracing::info!(target: "connhub", "{message}");
    }

    fn announce_address(&self, url: &str) {
        tracing::info!(target: "connhub", url, "reachable at");
    }
}

/// A host event relayed over a channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostEvent {
    /// A log line.
    Log(String),
    /// A reachable address.
    Address(String),
}

/// Relays host events to a receiver, typically a UI task.
///
/// Events sent after the receiver is dropped are discarded.
#[derive(Debug, Clone)]
pub struct ChannelHost {
    tx: mpsc::UnboundedSender<HostEvent>,
}

impl ChannelHost {
    /// Creates a host and the receiver its events arrive on.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<HostEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl HostEvents for ChannelHost {
    fn log(&self, message: &str) {
        let _ = self.tx.send(HostEvent::Log(message.to_string()));
    }

    fn announce_address(&self, url: &str) {
        let _ = self.tx.send(HostEvent::Address(url.to_string()));
    }
}

/// Byte source for static assets.
pub trait AssetSource: Send + Sync + 'static {
    /// Returns the asset's bytes, or `None` if it does not exist.
    fn read(&self, name: &str) -> Option<Vec<u8>>;
}

/// Serves assets from a directory.
#[derive(Debug, Clone)]
pub struct DirAssets {
    dir: PathBuf,
}

impl DirAssets {
    /// Creates a source reading from `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl AssetSource for DirAssets {
    fn read(&self, name: &str) -> Option<Vec<u8>> {
        if name.contains(['/', '\\']) || name.starts_with('.') {
            return None;
        }
        std::fs::read(self.dir.join(name)).ok()
    }
}

/// A source with no assets.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAssets;

impl AssetSource for NoAssets {
    fn read(&self, _name: &str) -> Option<Vec<u8>> {
        None
    }
}

impl AssetSource for HashMap<String, Vec<u8>> {
    fn read(&self, name: &str) -> Option<Vec<u8>> {
        self.get(name).cloned()
    }
}
