//! Serve command implementation.

use crate::ServeArgs;
use connhub_sync_server::{ChannelHost, HostEvent, ServerConfig, SyncServer};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const DEFAULT_PORT: u16 = 8000;

/// Builds the server configuration for `args`.
pub fn config_from(args: &ServeArgs) -> ServerConfig {
    let port = args.port_arg.or(args.port).unwrap_or(DEFAULT_PORT);
    let mut config = ServerConfig::new(SocketAddr::new(args.host, port))
        .with_storage_root(&args.root)
        .with_read_timeout(Duration::from_secs(args.read_timeout_secs))
        .with_clear_storage_on_stop(args.clear_on_exit);
    if let Some(dir) = &args.assets {
        config = config.with_asset_dir(dir);
    }
    config
}

/// Runs the server until Ctrl+C.
pub fn run(args: ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = config_from(&args);
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(serve(config))
}

async fn serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    let (host, mut events) = ChannelHost::new();
    let printer = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                HostEvent::Log(line) => info!(target: "connhub", "{line}"),
                HostEvent::Address(url) => println!("Open {url} on another device"),
            }
        }
    });

    let server = SyncServer::new(config).with_host(Arc::new(host));
    server.start().await?;

    tokio::signal::ctrl_c().await?;
    info!("Received Ctrl+C, shutting down...");
    let stopped = server.stop().await;

    drop(server);
    let _ = printer.await;
    stopped?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        serve: ServeArgs,
    }

    fn parse(args: &[&str]) -> ServeArgs {
        Harness::parse_from(std::iter::once("connhub").chain(args.iter().copied())).serve
    }

    #[test]
    fn defaults() {
        let config = config_from(&parse(&[]));
        assert_eq!(config.bind_addr, "0.0.0.0:8000".parse().unwrap());
        assert_eq!(config.storage_root, std::path::PathBuf::from("./temp"));
        assert_eq!(config.read_timeout, Duration::from_secs(5));
        assert!(!config.clear_storage_on_stop);
        assert!(config.asset_dir.is_none());
    }

    #[test]
    fn bare_port() {
        let config = config_from(&parse(&["9000"]));
        assert_eq!(config.bind_addr.port(), 9000);
    }

    #[test]
    fn flags() {
        let config = config_from(&parse(&[
            "--port",
            "9001",
            "--host",
            "127.0.0.1",
            "--root",
            "/tmp/share",
            "--assets",
            "web",
            "--read-timeout-secs",
            "30",
            "--clear-on-exit",
        ]));
        assert_eq!(config.bind_addr, "127.0.0.1:9001".parse().unwrap());
        assert_eq!(config.storage_root, std::path::PathBuf::from("/tmp/share"));
        assert_eq!(config.asset_dir, Some(std::path::PathBuf::from("web")));
        assert_eq!(config.read_timeout, Duration::from_secs(30));
        assert!(config.clear_storage_on_stop);
    }

    #[test]
    fn bare_port_conflicts_with_flag() {
        let result = Harness::try_parse_from(["connhub", "9000", "--port", "9001"]);
        assert!(result.is_err());
    }
}
