//! Concierge API Server
//!
//! Run with: cargo run --bin concierge
//!
//! # Configuration
//!
//! Settings come from `--config <file>`, or the first of
//! `~/.config/concierge/config.toml`, `/etc/concierge/config.toml` and
//! `./config.toml`. `CONCIERGE_*` environment variables override them.
//! `RUST_LOG` overrides the configured log level.

use anyhow::Context;
use clap::Parser;
use concierge::config::Config;
use concierge::domain::default_directory;
use concierge::store::{AppointmentStore, SqliteStore};
use concierge::{serve, telemetry, AppState};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "concierge")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Booking and chat assistant API for the agency site")]
struct Args {
    /// Config file (default: search the standard locations)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_with_env(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load_default(),
    };

    telemetry::init(&config.logging);

    tracing::info!("Starting Concierge API server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Database: {}", config.database.path);

    let store = SqliteStore::open(&config.database.path)
        .with_context(|| format!("opening database {}", config.database.path))?;

    if config.database.seed_staff {
        let inserted = store
            .seed_staff(&default_directory())
            .await
            .context("seeding staff directory")?;
        if inserted > 0 {
            tracing::info!("Seeded {} staff members", inserted);
        }
    }

    let state = AppState::new(Arc::new(store), &config);
    serve(state).await.context("running API server")?;

    tracing::info!("Concierge API server stopped");
    Ok(())
}
