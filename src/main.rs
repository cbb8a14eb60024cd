mod config;
mod product;
mod protocol;
mod server;
mod store;

use std::fs::OpenOptions;
use std::sync::Mutex;

use anyhow::Context;
use clap::Parser;
use config::Config;
use server::{AppState, Server};
use tracing::{info, warn};

/// Products API backed by a key-value store
#[derive(Debug, Parser)]
#[command(name = "productdb", version)]
struct Args {
    /// Path to a TOML config file
    #[arg(short, long)]
    config: Option<String>,

    /// Listening address, overrides the config file
    #[arg(long)]
    addr: Option<String>,
}

fn init_logging(log: &config::LogConfig) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log.level));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(true);

    match &log.file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("failed to open log file '{}'", path))?;
            builder.with_ansi(false).with_writer(Mutex::new(file)).init();
        }
        None => builder.init(),
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => Config::from_file(path)?,
        None => Config::default(),
    }
    .with_env(|name| std::env::var(name).ok());
    if let Some(addr) = args.addr {
        config.server_addr = addr;
    }

    init_logging(&config.log)?;

    info!("Starting productdb");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let admin_key = config.validate()?;

    let store = match &config.kv {
        Some(kv) => Some(store::open(kv).context("failed to open key-value store")?),
        None => {
            warn!("No [kv] section configured; product reads and writes will fail");
            None
        }
    };

    let state = AppState::new(store, admin_key, config.max_body_bytes);
    let server = Server::bind(&config.server_addr, state)
        .await
        .with_context(|| format!("failed to bind {}", config.server_addr))?;
    info!("Server listening on: {}", server.local_addr());

    server.run().await?;

    Ok(())
}
