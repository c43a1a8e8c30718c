mod action;
mod app;
mod app_state;
mod component;
mod components;
mod log_layer;
mod scene;
mod theme;
mod widgets;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use records_proto::config::Config;
use records_proto::discogs;
use records_proto::repository::{self, CatalogRepository};
use tokio::sync::mpsc;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::log_layer::ToastLayer;

#[derive(Parser, Debug)]
#[command(name = "records", about = "Browse a vinyl collection as an animated record stack")]
struct Cli {
    /// Fetch from Discogs even when a cache exists
    #[arg(long)]
    live: bool,

    /// Config file (defaults to the platform config dir)
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let data_dir = records_proto::platform::data_dir();
    std::fs::create_dir_all(&data_dir)?;
    let log_path = data_dir.join("records.log");

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)?;

    // Allow RUST_LOG override; default to debug for app code but suppress noisy
    // connection-level DEBUG from HTTP client internals.
    let log_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "debug,hyper_util=warn,reqwest=warn,hyper=warn".to_string());

    let (log_tx, log_rx) = mpsc::unbounded_channel();
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(log_file)
                .with_ansi(false),
        )
        .with(ToastLayer::new(log_tx))
        .with(tracing_subscriber::EnvFilter::new(log_filter))
        .init();

    // Print log path to stderr so the operator can tail it immediately.
    eprintln!("records log: {}", log_path.display());
    tracing::info!("records starting…");

    // ── Load config ──────────────────────────────────────────────────────────
    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load().unwrap_or_default(),
    };

    // ── Load the collection before the UI starts ─────────────────────────────
    let repo = repository::from_config(&config, cli.live || discogs::live_requested());
    let source = if repo.is_live() { "discogs" } else { "cache" };
    if repo.is_live() {
        eprintln!("fetching collection for {}…", config.catalog.username);
    }
    let records = repo.records().await;

    // ── Run TUI ──────────────────────────────────────────────────────────────
    let app = app::App::new(&config, &records, source);
    app.run(log_rx).await?;

    Ok(())
}
