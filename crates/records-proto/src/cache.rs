//! Catalog cache: a JSON snapshot of the fetch + classification pipeline.

use std::path::{Path, PathBuf};

use crate::catalog::CatalogItem;

#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache file {path} is not a valid catalog: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads and writes the cache file. The file's presence is what lets callers
/// skip the network entirely.
#[derive(Debug, Clone)]
pub struct CachedStore {
    path: PathBuf,
}

impl CachedStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    pub async fn load(&self) -> Result<Vec<CatalogItem>, CacheError> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .map_err(|source| self.io_error(source))?;
        serde_json::from_str(&content).map_err(|source| CacheError::Json {
            path: self.path.clone(),
            source,
        })
    }

    pub async fn save(&self, records: &[CatalogItem]) -> Result<(), CacheError> {
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|source| self.io_error(source))?;
        }
        let json = serde_json::to_string_pretty(records).map_err(|source| CacheError::Json {
            path: self.path.clone(),
            source,
        })?;
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|source| self.io_error(source))
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
