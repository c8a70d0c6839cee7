//! tar-lineage: inspect and re-link TAR tokens across EVM networks
//!
//! ## Commands
//!
//! - **read**: show a token and its full predecessor/successor history
//! - **replace**: point a predecessor at its successor (with back-pointer check)
//! - **networks**: list configured networks and their chain ids
//! - **parse**: validate a token id offline
//!
//! ## Example Usage
//!
//! ```bash
//! # Read a token and its lineage as JSON
//! tar-lineage read urn:tar:eip155.11155111:<address> --json
//!
//! # Replace a Sepolia token with its Amoy successor
//! tar-lineage --network sepolia replace <predecessor-id> <successor-id>
//!
//! # Use a custom endpoint list
//! tar-lineage --networks ./networks.json networks
//! ```
//!
//! Logging goes to stderr and is controlled by `RUST_LOG` (default `warn`);
//! `--verbose` forces `debug`.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod lineage_cli;

use lineage_cli::{
    networks::NetworksCmd, parse::ParseCmd, read::ReadCmd, replace::ReplaceCmd, CliContext,
};

#[derive(Parser)]
#[command(
    name = "tar-lineage",
    author,
    version,
    about = "Resolve, trace, and replace TAR tokens across EVM networks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Network configuration file (JSON)
    #[arg(long, global = true, value_name = "FILE")]
    networks: Option<PathBuf>,

    /// Active network; replacements are sent through it
    #[arg(long, global = true, env = "TAR_NETWORK")]
    network: Option<String>,

    /// Output as JSON instead of human-readable format
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a token and its lineage
    Read(ReadCmd),

    /// Replace a token with its successor
    Replace(ReplaceCmd),

    /// List configured networks
    Networks(NetworksCmd),

    /// Parse a token id without network access
    Parse(ParseCmd),
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    let Cli {
        command,
        networks,
        network,
        json,
        verbose,
    } = Cli::parse();
    init_tracing(verbose);

    let ctx = CliContext {
        networks_file: networks,
        network,
        json,
    };

    match command {
        Commands::Read(cmd) => cmd.execute(&ctx).await,
        Commands::Replace(cmd) => cmd.execute(&ctx).await,
        Commands::Networks(cmd) => cmd.execute(&ctx).await,
        Commands::Parse(cmd) => cmd.execute(json),
    }
}
