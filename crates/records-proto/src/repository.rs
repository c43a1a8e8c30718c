//! Catalog repositories: where the record list comes from.
//!
//! `CachedStore` serves the snapshot on disk; `LiveFetcher` pages through the
//! catalog API, downloads covers, classifies them and refreshes the snapshot.
//! Callers pick one with [`Repository::select`]. Neither ever fails: problems
//! are logged and replaced with the safest data available.

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use tracing::{error, info, warn};

use crate::cache::CachedStore;
use crate::catalog::{cover_file_name, mock_catalog, CatalogItem};
use crate::classify::{classify_blocking, CoverClassifier};
use crate::config::Config;
use crate::discogs::{CatalogApi, DiscogsClient};

pub trait CatalogRepository: Send + Sync {
    fn records(&self) -> impl Future<Output = Vec<CatalogItem>> + Send;
}

impl CatalogRepository for CachedStore {
    async fn records(&self) -> Vec<CatalogItem> {
        match self.load().await {
            Ok(records) => {
                info!("Using cached Discogs data ({} records)", records.len());
                records
            }
            Err(e) => {
                warn!("{}; using mock data", e);
                mock_catalog()
            }
        }
    }
}

pub struct LiveFetcher<A> {
    /// `None` when no credential is configured.
    api: Option<A>,
    store: CachedStore,
    covers_dir: PathBuf,
    covers_url_prefix: String,
    classifier: CoverClassifier,
    page_delay: Duration,
}

impl<A: CatalogApi> LiveFetcher<A> {
    pub fn new(api: Option<A>, store: CachedStore, config: &Config) -> Self {
        Self {
            api,
            store,
            covers_dir: config.paths.covers_dir.clone(),
            covers_url_prefix: config.paths.covers_url_prefix.clone(),
            classifier: CoverClassifier::new(&config.classifier),
            page_delay: Duration::from_millis(config.catalog.page_delay_ms),
        }
    }

    pub fn store(&self) -> &CachedStore {
        &self.store
    }

    async fn fetch(&self, api: &A) -> Vec<CatalogItem> {
        if let Err(e) = tokio::fs::create_dir_all(&self.covers_dir).await {
            warn!(
                "Could not create covers dir {}: {}",
                self.covers_dir.display(),
                e
            );
        }

        let mut records = Vec::new();
        let mut page = 1;
        let mut total_pages = 1;

        while page <= total_pages {
            let data = match api.fetch_page(page).await {
                Ok(data) => data,
                Err(e) => {
                    error!("Discogs API error: {} - possibly rate limited", e);
                    // Keep what we have; only an empty pass falls back to mock data
                    if records.is_empty() {
                        return mock_catalog();
                    }
                    return self.classify_all(records).await;
                }
            };
            total_pages = data.pagination.pages;

            for release in &data.releases {
                self.download_cover(api, release.cover_source(), release.instance_id)
                    .await;
                records.push(release.to_item(&self.covers_url_prefix));
            }

            info!("Fetched page {} of {}", page, total_pages);
            page += 1;

            if page <= total_pages && !self.page_delay.is_zero() {
                tokio::time::sleep(self.page_delay).await;
            }
        }

        let records = self.classify_all(records).await;
        match self.store.save(&records).await {
            Ok(()) => info!("Downloaded and cached {} records", records.len()),
            Err(e) => warn!("Failed to write catalog cache: {}", e),
        }
        records
    }

    async fn download_cover(&self, api: &A, url: &str, id: u64) {
        let path = self.covers_dir.join(cover_file_name(id));
        if path.exists() {
            return;
        }
        if url.is_empty() {
            warn!("Release {} has no cover image", id);
            return;
        }

        let bytes = match api.fetch_image(url).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to download image {}: {}", url, e);
                return;
            }
        };
        if let Err(e) = tokio::fs::write(&path, bytes).await {
            warn!("Failed to save cover {}: {}", path.display(), e);
        }
    }

    async fn classify_all(&self, records: Vec<CatalogItem>) -> Vec<CatalogItem> {
        let mut classified = Vec::with_capacity(records.len());
        for record in records {
            let path = self.covers_dir.join(record.cover_file_name());
            let is_label = path.exists() && classify_blocking(self.classifier, path).await;
            classified.push(record.with_label_image(is_label));
        }
        classified
    }
}

impl<A: CatalogApi> CatalogRepository for LiveFetcher<A> {
    async fn records(&self) -> Vec<CatalogItem> {
        match &self.api {
            Some(api) => self.fetch(api).await,
            None => {
                warn!("DISCOGS_TOKEN not set, using mock data");
                mock_catalog()
            }
        }
    }
}

/// The caller's choice between the snapshot and the live pipeline.
pub enum Repository<A> {
    Cached(CachedStore),
    Live(LiveFetcher<A>),
}

impl<A: CatalogApi> Repository<A> {
    /// Serve the cache when it exists, unless live data was asked for.
    pub fn select(live: LiveFetcher<A>, force_live: bool) -> Self {
        if !force_live && live.store().exists() {
            Repository::Cached(live.store().clone())
        } else {
            Repository::Live(live)
        }
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Repository::Live(_))
    }
}

impl<A: CatalogApi> CatalogRepository for Repository<A> {
    async fn records(&self) -> Vec<CatalogItem> {
        match self {
            Repository::Cached(store) => store.records().await,
            Repository::Live(live) => live.records().await,
        }
    }
}

/// Wire the Discogs-backed repository from configuration and the environment.
pub fn from_config(config: &Config, force_live: bool) -> Repository<DiscogsClient> {
    let store = CachedStore::new(config.paths.cache_file.clone());
    let live = LiveFetcher::new(DiscogsClient::from_env(&config.catalog), store, config);
    Repository::select(live, force_live)
}
