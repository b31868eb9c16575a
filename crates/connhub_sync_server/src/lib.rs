//! # ConnHub Sync Server
//!
//! HTTP server that shares one text blob and a set of files across a LAN.
//!
//! This crate provides:
//! - The sync state store (shared text and ordered file list, each versioned)
//! - Streaming multipart upload ingestion into the file repository
//! - HTTP endpoints (state, text, upload, download, delete) and static pages
//! - A Stopped/Running lifecycle with host callbacks for logs and addresses
//!
//! # Polling
//!
//! Clients poll `GET /api/state?text_ts=..&files_ts=..` with the versions they
//! last saw. A resource whose version is newer comes back in full with its
//! new version; otherwise it is reported as `{"updated": false}`. The server
//! keeps no per-client state.
//!
//! ```rust,no_run
//! use connhub_sync_server::{ServerConfig, SyncServer};
//!
//! # async fn run() -> connhub_sync_server::ServerResult<()> {
//! let config = ServerConfig::default()
//!     .with_storage_root("./temp")
//!     .with_asset_dir("./assets");
//! let server = SyncServer::new(config);
//! server.start().await?;
//! tokio::signal::ctrl_c().await?;
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod body;
mod config;
mod error;
mod handler;
mod host;
mod ingest;
mod net;
mod router;
mod server;
mod state;

pub use body::body_reader;
pub use config::ServerConfig;
pub use error::{ServerError, ServerResult};
pub use handler::{content_disposition, HandlerContext, TEXT_PLAIN};
pub use host::{AssetSource, ChannelHost, DirAssets, HostEvent, HostEvents, NoAssets, TracingHost};
pub use ingest::{ingest_upload, Ingested};
pub use net::{local_urls, urls_for};
pub use router::build_router;
pub use server::{ServerStatus, SyncServer};
pub use state::{FileList, FilesSnapshot, SyncState, TextSnapshot};
