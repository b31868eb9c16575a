//! ConnHub CLI
//!
//! Runs the LAN sync server and maintains its storage directory.
//!
//! # Commands
//!
//! - `serve` - Share text and files on the local network
//! - `restore` - Rename a storage directory's files back to their original names
//! - `version` - Show version information

mod commands;

use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// ConnHub: share a clipboard and files across your LAN.
#[derive(Parser)]
#[command(name = "connhub")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    // Serve options when no subcommand is given.
    #[command(flatten)]
    serve: ServeArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Share text and files on the local network
    Serve(ServeArgs),

    /// Rename hex-named files in a storage directory back to their original names
    Restore {
        /// Storage directory to restore
        dir: PathBuf,
    },

    /// Show version information
    Version,
}

/// Options for `serve`.
#[derive(Args, Debug)]
pub struct ServeArgs {
    /// Port to listen on (same as --port)
    #[arg(value_name = "PORT", conflicts_with = "port")]
    pub port_arg: Option<u16>,

    /// Port to listen on [default: 8000]
    #[arg(short, long)]
    pub port: Option<u16>,

    /// Address to bind to
    #[arg(long, default_value = "0.0.0.0")]
    pub host: IpAddr,

    /// Storage directory for uploaded files (cleared on start)
    #[arg(short, long, default_value = "./temp")]
    pub root: PathBuf,

    /// Directory holding index.html and favicon.ico
    #[arg(short, long)]
    pub assets: Option<PathBuf>,

    /// Seconds to wait for a stalled request body
    #[arg(long, default_value = "5")]
    pub read_timeout_secs: u64,

    /// Remove the storage directory when the server stops
    #[arg(long)]
    pub clear_on_exit: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Some(Commands::Serve(args)) => commands::serve::run(args)?,
        None => commands::serve::run(cli.serve)?,
        Some(Commands::Restore { dir }) => commands::restore::run(&dir)?,
        Some(Commands::Version) => {
            println!("ConnHub CLI v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_port_serves() {
        let cli = Cli::try_parse_from(["connhub", "9000"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port_arg, Some(9000));
        assert_eq!(cli.serve.port, None);
    }

    #[test]
    fn no_arguments_uses_serve_defaults() {
        let cli = Cli::try_parse_from(["connhub"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port_arg, None);
        assert_eq!(cli.serve.root, PathBuf::from("./temp"));
        assert_eq!(cli.serve.read_timeout_secs, 5);
        assert!(!cli.serve.clear_on_exit);
    }

    #[test]
    fn top_level_flags_serve() {
        let cli = Cli::try_parse_from(["connhub", "--port", "8100", "--clear-on-exit"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.serve.port, Some(8100));
        assert!(cli.serve.clear_on_exit);
    }

    #[test]
    fn subcommands_still_parse() {
        let cli = Cli::try_parse_from(["connhub", "serve", "9001"]).unwrap();
        assert!(matches!(
            cli.command,
            Some(Commands::Serve(ServeArgs { port_arg: Some(9001), .. }))
        ));

        let cli = Cli::try_parse_from(["connhub", "restore", "/tmp/store", "-v"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Restore { .. })));
        assert!(cli.verbose);
    }

    #[test]
    fn positional_and_flag_port_conflict() {
        assert!(Cli::try_parse_from(["connhub", "9000", "--port", "9001"]).is_err());
    }

    #[test]
    fn top_level_args_conflict_with_subcommand() {
        assert!(Cli::try_parse_from(["connhub", "--port", "9000", "version"]).is_err());
    }
}
