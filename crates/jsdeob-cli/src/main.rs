//! Thin CLI entrypoint (§6 "CLI / environment"). Parses the handful of
//! overridable flags, falls back to the ambient environment variables
//! `jsdeob_server::ServerConfig::from_env` reads, and starts the server —
//! adapted from `otter-cli::main`'s shape (clap + tracing-subscriber +
//! tokio multi-thread runtime), minus its subcommand surface since this
//! binary only ever does one thing.

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::filter::EnvFilter;

use jsdeob_server::{run_server, ServerConfig};

#[derive(Parser)]
#[command(name = "jsdeob", version, about = "JavaScript de-obfuscation workbench server")]
struct Cli {
    /// Overrides the PORT environment variable.
    #[arg(long)]
    port: Option<u16>,

    /// Overrides JSDEOB_BASE_DIR (the directory rooting data/ and plugins/).
    #[arg(long)]
    base_dir: Option<String>,

    /// Overrides JSDEOB_ALLOW_EVAL.
    #[arg(long)]
    allow_eval: Option<bool>,

    /// Overrides JSDEOB_WORKER_POOL_SIZE.
    #[arg(long)]
    worker_pool_size: Option<usize>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let mut config = ServerConfig::from_env();
    if let Some(port) = cli.port {
        config.port = port;
    }
    if let Some(base_dir) = cli.base_dir {
        config.base_dir = base_dir;
    }
    if let Some(allow_eval) = cli.allow_eval {
        config.allow_eval = allow_eval;
    }
    if let Some(worker_pool_size) = cli.worker_pool_size {
        config.worker_pool_size = worker_pool_size;
    }

    run_server(config).await
}
