//! Server lifecycle: Stopped and Running.

use crate::config::ServerConfig;
use crate::error::{ServerError, ServerResult};
use crate::handler::HandlerContext;
use crate::host::{AssetSource, DirAssets, HostEvents, NoAssets, TracingHost};
use crate::net::local_urls;
use crate::router::build_router;
use axum::Router;
use connhub_storage::{FileRepository, ResetReport};
use hyper_util::rt::{TokioExecutor, TokioIo, TokioTimer};
use hyper_util::server::conn::auto::Builder as ConnBuilder;
use hyper_util::service::TowerToHyperService;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, info, warn};

/// Whether the server is accepting connections.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServerStatus {
    /// Not listening; no state is held.
    Stopped,
    /// Listening on the given address.
    Running(SocketAddr),
}

struct Running {
    local_addr: SocketAddr,
    context: Arc<HandlerContext>,
    accept_task: JoinHandle<()>,
}

/// The LAN sync server.
///
/// Starting clears the storage directory, creates fresh in-memory state and
/// begins accepting connections. Stopping closes the listener and every open
/// connection at once and discards the state; in-flight requests are not
/// waited for.
///
/// # Example
///
/// ```no_run
/// use connhub_sync_server::{ServerConfig, SyncServer};
///
/// # async fn run() -> connhub_sync_server::ServerResult<()> {
/// let server = SyncServer::new(ServerConfig::default().with_storage_root("./temp"));
/// let addr = server.start().await?;
/// println!("listening on {addr}");
/// server.stop().await?;
/// # Ok(())
/// # }
/// ```
pub struct SyncServer {
    config: ServerConfig,
    host: Arc<dyn HostEvents>,
    assets: Arc<dyn AssetSource>,
    running: Mutex<Option<Running>>,
}

impl SyncServer {
    /// Creates a stopped server that logs through `tracing`.
    ///
    /// Static assets are read from `config.asset_dir` when set.
    pub fn new(config: ServerConfig) -> Self {
        let assets: Arc<dyn AssetSource> = match &config.asset_dir {
            Some(dir) => Arc::new(DirAssets::new(dir)),
            None => Arc::new(NoAssets),
        };
        Self {
            config,
            host: Arc::new(TracingHost),
            assets,
            running: Mutex::new(None),
        }
    }

    /// Replaces the host event sink.
    pub fn with_host(mut self, host: Arc<dyn HostEvents>) -> Self {
        self.host = host;
        self
    }

    /// Replaces the static asset source.
    pub fn with_assets(mut self, assets: Arc<dyn AssetSource>) -> Self {
        self.assets = assets;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Starts the server, returning the bound address.
    ///
    /// # Errors
    ///
    /// - [`ServerError::AlreadyRunning`] if the server was already started.
    /// - [`ServerError::Bind`] if the address cannot be bound; the server
    ///   stays stopped and storage is left untouched.
    ///
    /// Failures while clearing storage are logged and do not stop startup.
    pub async fn start(&self) -> ServerResult<SocketAddr> {
        let mut running = self.running.lock().await;
        if running.is_some() {
            return Err(ServerError::AlreadyRunning);
        }

        let addr = self.config.bind_addr;
        let listener = match TcpListener::bind(addr).await {
            Ok(listener) => listener,
            Err(source) => {
                self.host.log(&format!("cannot listen on {addr}: {source}"));
                return Err(ServerError::Bind { addr, source });
            }
        };
        let local_addr = listener.local_addr()?;

        let report = self.reset_storage().await?;
        for failure in &report.failures {
            self.host.log(&format!(
                "cannot clear {}: {}",
                failure.path.display(),
                failure.error
            ));
        }

        let context = Arc::new(HandlerContext::new(
            self.config.clone(),
            Arc::clone(&self.host),
            Arc::clone(&self.assets),
        ));
        self.host.log("server initialized");

        for url in local_urls(local_addr) {
            self.host.announce_address(&url);
        }

        let router = build_router(Arc::clone(&context));
        let accept_task = tokio::spawn(accept_loop(listener, router, self.connection_builder()));
        self.host.log("server starting...");
        info!(addr = %local_addr, root = %self.config.storage_root.display(), "server running");

        *running = Some(Running {
            local_addr,
            context,
            accept_task,
        });
        Ok(local_addr)
    }

    /// Stops the server. Stopping a stopped server is a no-op.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::Storage`] if `clear_storage_on_stop` is set and
    /// the storage directory cannot be removed. The server is stopped either
    /// way.
    pub async fn stop(&self) -> ServerResult<()> {
        let Some(running) = self.running.lock().await.take() else {
            return Ok(());
        };
        self.host.log("server stopping...");

        running.accept_task.abort();
        if let Err(e) = running.accept_task.await {
            if e.is_panic() {
                warn!(error = %e, "accept loop panicked");
            }
        }
        info!(addr = %running.local_addr, "server stopped");

        if self.config.clear_storage_on_stop {
            if let Err(e) = running.context.repository.remove_all() {
                self.host.log(&format!("cannot remove storage: {e}"));
                return Err(e.into());
            }
        }
        Ok(())
    }

    /// Returns the current status.
    pub async fn status(&self) -> ServerStatus {
        match self.running.lock().await.as_ref() {
            Some(running) => ServerStatus::Running(running.local_addr),
            None => ServerStatus::Stopped,
        }
    }

    /// Returns true while the server is running.
    pub async fn is_running(&self) -> bool {
        self.running.lock().await.is_some()
    }

    /// Returns the bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        self.running.lock().await.as_ref().map(|r| r.local_addr)
    }

    /// Returns the handler context of the current run.
    pub async fn context(&self) -> Option<Arc<HandlerContext>> {
        self.running
            .lock()
            .await
            .as_ref()
            .map(|r| Arc::clone(&r.context))
    }

    async fn reset_storage(&self) -> ServerResult<ResetReport> {
        let repository = FileRepository::new(&self.config.storage_root);
        tokio::task::spawn_blocking(move || repository.reset())
            .await
            .map_err(|e| ServerError::Internal(format!("storage reset task failed: {e}")))
    }

    fn connection_builder(&self) -> ConnBuilder<TokioExecutor> {
        let mut builder = ConnBuilder::new(TokioExecutor::new());
        builder
            .http1()
            .timer(TokioTimer::new())
            .header_read_timeout(self.config.read_timeout);
        builder
    }
}

impl Drop for SyncServer {
    fn drop(&mut self) {
        if let Some(running) = self.running.get_mut().take() {
            running.accept_task.abort();
        }
    }
}

/// Accepts connections until aborted.
///
/// Connections live in a `JoinSet` owned by this task, so aborting it drops
/// the set and closes every socket.
async fn accept_loop(listener: TcpListener, router: Router, http: ConnBuilder<TokioExecutor>) {
    let mut connections = JoinSet::new();
    loop {
        tokio::select! {
            accepted = listener.accept() => match accepted {
                Ok((socket, peer)) => {
                    let service = TowerToHyperService::new(router.clone());
                    let http = http.clone();
                    connections.spawn(async move {
                        if let Err(e) = http.serve_connection(TokioIo::new(socket), service).await {
                            debug!(peer = %peer, error = %e, "connection ended with error");
                        }
                    });
                }
                Err(e) => warn!(error = %e, "failed to accept connection"),
            },
            Some(_) = connections.join_next(), if !connections.is_empty() => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::{ChannelHost, HostEvent};
    use tempfile::tempdir;

    fn local_config(root: &std::path::Path) -> ServerConfig {
        ServerConfig::new("127.0.0.1:0".parse().unwrap()).with_storage_root(root.join("store"))
    }

    #[tokio::test]
    async fn start_and_stop() {
        let dir = tempdir().unwrap();
        let server = SyncServer::new(local_config(dir.path()));
        assert_eq!(server.status().await, ServerStatus::Stopped);

        let addr = server.start().await.unwrap();
        assert_eq!(server.status().await, ServerStatus::Running(addr));
        assert!(dir.path().join("store").is_dir());

        server.stop().await.unwrap();
        assert!(!server.is_running().await);
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn double_start_is_rejected() {
        let dir = tempdir().unwrap();
        let server = SyncServer::new(local_config(dir.path()));
        server.start().await.unwrap();
        assert!(matches!(
            server.start().await,
            Err(ServerError::AlreadyRunning)
        ));
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn lifecycle_logs_through_host() {
        let dir = tempdir().unwrap();
        let (host, mut rx) = ChannelHost::new();
        let server = SyncServer::new(local_config(dir.path())).with_host(Arc::new(host));

        server.start().await.unwrap();
        server.stop().await.unwrap();

        let mut events = Vec::new();
        while let Ok(event) = rx.try_recv() {
            events.push(event);
        }
        assert_eq!(
            events,
            vec![
                HostEvent::Log("server initialized".into()),
                HostEvent::Log("server starting...".into()),
                HostEvent::Log("server stopping...".into()),
            ]
        );
    }

    #[tokio::test]
    async fn bind_failure_keeps_server_stopped() {
        let dir = tempdir().unwrap();
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let config = ServerConfig::new(taken.local_addr().unwrap())
            .with_storage_root(dir.path().join("store"));
        std::fs::create_dir_all(dir.path().join("store")).unwrap();
        std::fs::write(dir.path().join("store").join("keep"), b"x").unwrap();

        let server = SyncServer::new(config);
        let err = server.start().await.unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert!(!server.is_running().await);
        assert!(dir.path().join("store").join("keep").exists());
    }

    #[tokio::test]
    async fn restart_clears_storage_and_state() {
        let dir = tempdir().unwrap();
        let server = SyncServer::new(local_config(dir.path()));

        server.start().await.unwrap();
        let context = server.context().await.unwrap();
        context.state.set_text("before restart".into());
        std::fs::write(dir.path().join("store").join("stale"), b"x").unwrap();
        server.stop().await.unwrap();

        server.start().await.unwrap();
        let context = server.context().await.unwrap();
        let text = context
            .state
            .text_if_newer(connhub_sync_protocol::Version::ZERO)
            .unwrap();
        assert_eq!(text.content, "");
        assert!(!dir.path().join("store").join("stale").exists());
        server.stop().await.unwrap();
    }

    #[tokio::test]
    async fn clear_on_stop_removes_storage() {
        let dir = tempdir().unwrap();
        let server =
            SyncServer::new(local_config(dir.path()).with_clear_storage_on_stop(true));
        server.start().await.unwrap();
        assert!(dir.path().join("store").exists());
        server.stop().await.unwrap();
        assert!(!dir.path().join("store").exists());
    }
}
