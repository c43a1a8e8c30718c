mod http;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use records_proto::cache::CachedStore;
use records_proto::classify::{classify_cache, CoverClassifier};
use records_proto::config::Config;
use records_proto::discogs;
use records_proto::repository::{self, CatalogRepository};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "records-sync", about = "Sync a Discogs collection for the records browser")]
struct Cli {
    /// Config file (defaults to the platform config dir)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch the collection, download covers and refresh the cache
    Fetch {
        /// Bypass the cache even when it exists
        #[arg(long)]
        live: bool,
    },
    /// Re-run label detection over the cached collection
    Classify,
    /// Summarize what is in the cache
    Status,
    /// Serve the stack layout and cover images over HTTP
    Serve {
        #[arg(long)]
        port: Option<u16>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,reqwest=warn,hyper=warn")),
        )
        .init();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => Config::load()?,
    };

    match cli.command {
        Command::Fetch { live } => fetch(&config, live || discogs::live_requested()).await,
        Command::Classify => classify(&config).await,
        Command::Status => status(&config).await,
        Command::Serve { port } => {
            let mut config = config;
            if let Some(port) = port {
                config.http.port = port;
            }
            http::start_server(Arc::new(config), discogs::live_requested())
                .await
                .context("HTTP server task failed")?
        }
    }
}

async fn fetch(config: &Config, force_live: bool) -> anyhow::Result<()> {
    let repo = repository::from_config(config, force_live);
    if repo.is_live() {
        info!("Fetching collection for {}", config.catalog.username);
    }
    let records = repo.records().await;
    let labels = records.iter().filter(|r| r.is_label_image).count();
    println!(
        "{} records ({} label images) from {}",
        records.len(),
        labels,
        if repo.is_live() { "Discogs" } else { "cache" }
    );
    Ok(())
}

async fn classify(config: &Config) -> anyhow::Result<()> {
    let store = CachedStore::new(config.paths.cache_file.clone());
    if !store.exists() {
        anyhow::bail!(
            "no cache at {}; run `records-sync fetch` first",
            store.path().display()
        );
    }
    let summary = classify_cache(
        &store,
        &config.paths.covers_dir,
        CoverClassifier::new(&config.classifier),
    )
    .await?;
    println!(
        "Found {} vinyl label images out of {} total",
        summary.labels, summary.total
    );
    Ok(())
}

async fn status(config: &Config) -> anyhow::Result<()> {
    let store = CachedStore::new(config.paths.cache_file.clone());
    println!("cache:  {}", store.path().display());
    println!("covers: {}", config.paths.covers_dir.display());
    if !store.exists() {
        println!("no cached collection");
        return Ok(());
    }

    let records = store.load().await?;
    let labels = records.iter().filter(|r| r.is_label_image).count();
    let mut genres: BTreeMap<&str, usize> = BTreeMap::new();
    for record in &records {
        *genres.entry(record.genre.as_str()).or_default() += 1;
    }

    println!("{} records, {} label images", records.len(), labels);
    for (genre, count) in genres {
        println!("  {:<20} {}", genre, count);
    }
    Ok(())
}
