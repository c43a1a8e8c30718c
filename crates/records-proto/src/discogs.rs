//! Discogs collection API client

use std::future::Future;

use serde::Deserialize;

use crate::catalog::{cover_file_name, CatalogItem, UNKNOWN_GENRE};
use crate::config::CatalogConfig;

pub const TOKEN_ENV: &str = "DISCOGS_TOKEN";
pub const LIVE_ENV: &str = "DISCOGS_LIVE";

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("catalog API returned status {0}")]
    Status(u16),
}

/// One page of `/users/{user}/collection/folders/0/releases`
#[derive(Debug, Deserialize)]
pub struct CollectionPage {
    pub pagination: Pagination,
    pub releases: Vec<Release>,
}

#[derive(Debug, Deserialize)]
pub struct Pagination {
    pub pages: u32,
    pub page: u32,
    pub per_page: u32,
    pub items: u32,
}

#[derive(Debug, Deserialize)]
pub struct Release {
    pub id: u64,
    pub instance_id: u64,
    pub basic_information: BasicInformation,
}

#[derive(Debug, Deserialize)]
pub struct BasicInformation {
    pub id: u64,
    pub title: String,
    #[serde(default)]
    pub year: u32,
    #[serde(default)]
    pub thumb: String,
    #[serde(default)]
    pub cover_image: String,
    #[serde(default)]
    pub artists: Vec<Artist>,
    #[serde(default)]
    pub genres: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct Artist {
    pub name: String,
}

impl Release {
    /// Image to download: the full cover, or the thumbnail when there is none.
    pub fn cover_source(&self) -> &str {
        let info = &self.basic_information;
        if info.cover_image.is_empty() {
            &info.thumb
        } else {
            &info.cover_image
        }
    }

    pub fn to_item(&self, covers_url_prefix: &str) -> CatalogItem {
        let info = &self.basic_information;
        let artist = info
            .artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let genre = info
            .genres
            .first()
            .filter(|g| !g.is_empty())
            .cloned()
            .unwrap_or_else(|| UNKNOWN_GENRE.to_string());

        CatalogItem {
            id: self.instance_id,
            title: info.title.clone(),
            artist,
            year: info.year,
            cover_url: info.cover_image.clone(),
            local_cover: format!(
                "{}/{}",
                covers_url_prefix.trim_end_matches('/'),
                cover_file_name(self.instance_id)
            ),
            is_label_image: false,
            genre,
        }
    }
}

/// Transport used by the live fetcher.
///
/// Futures are `Send` so repositories can be driven from HTTP handlers.
pub trait CatalogApi: Send + Sync {
    /// Fetch a 1-based page of the collection.
    fn fetch_page(&self, page: u32) -> impl Future<Output = Result<CollectionPage, ApiError>> + Send;

    /// Download raw image bytes.
    fn fetch_image(&self, url: &str) -> impl Future<Output = Result<Vec<u8>, ApiError>> + Send;
}

pub struct DiscogsClient {
    http: reqwest::Client,
    token: String,
    api_base: String,
    username: String,
    per_page: u32,
}

impl DiscogsClient {
    pub fn new(config: &CatalogConfig, token: impl Into<String>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .build()?;
        Ok(Self {
            http,
            token: token.into(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            username: config.username.clone(),
            per_page: config.per_page,
        })
    }

    /// Build a client from `DISCOGS_TOKEN`. `None` when the credential is unset
    /// or the HTTP client cannot be constructed.
    pub fn from_env(config: &CatalogConfig) -> Option<Self> {
        let token = std::env::var(TOKEN_ENV).ok().filter(|t| !t.trim().is_empty())?;
        match Self::new(config, token.trim()) {
            Ok(client) => Some(client),
            Err(e) => {
                tracing::error!("Failed to build Discogs client: {}", e);
                None
            }
        }
    }

    fn page_url(&self, page: u32) -> String {
        format!(
            "{}/users/{}/collection/folders/0/releases?page={}&per_page={}&sort=added&sort_order=desc",
            self.api_base, self.username, page, self.per_page
        )
    }
}

impl CatalogApi for DiscogsClient {
    async fn fetch_page(&self, page: u32) -> Result<CollectionPage, ApiError> {
        let response = self
            .http
            .get(self.page_url(page))
            .header("Authorization", format!("Discogs token={}", self.token))
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        Ok(response.json().await?)
    }

    async fn fetch_image(&self, url: &str) -> Result<Vec<u8>, ApiError> {
        let response = self.http.get(url).send().await?;

        if !response.status().is_success() {
            return Err(ApiError::Status(response.status().as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}

/// Whether `DISCOGS_LIVE` asks to bypass the cache.
pub fn live_requested() -> bool {
    std::env::var(LIVE_ENV)
        .map(|v| is_truthy(&v))
        .unwrap_or(false)
}

fn is_truthy(value: &str) -> bool {
    let v = value.trim();
    v.eq_ignore_ascii_case("true") || v == "1"
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE_JSON: &str = r#"{
        "pagination": { "page": 1, "pages": 3, "per_page": 100, "items": 250, "urls": {} },
        "releases": [
            {
                "id": 1001,
                "instance_id": 555,
                "date_added": "2024-01-01T00:00:00-08:00",
                "basic_information": {
                    "id": 1001,
                    "title": "Moon Safari",
                    "year": 1998,
                    "thumb": "https://img.example/t.jpg",
                    "cover_image": "https://img.example/c.jpg",
                    "artists": [{ "name": "Air", "id": 1 }, { "name": "Beth Hirsch", "id": 2 }],
                    "genres": ["Electronic", "Pop"],
                    "styles": ["Downtempo"]
                }
            },
            {
                "id": 1002,
                "instance_id": 556,
                "basic_information": {
                    "id": 1002,
                    "title": "Untitled",
                    "year": 0,
                    "thumb": "https://img.example/t2.jpg",
                    "cover_image": "",
                    "artists": [{ "name": "Unknown Artist" }]
                }
            }
        ]
    }"#;

    #[test]
    fn test_parse_collection_page() {
        let page: CollectionPage = serde_json::from_str(PAGE_JSON).unwrap();
        assert_eq!(page.pagination.pages, 3);
        assert_eq!(page.releases.len(), 2);
    }

    #[test]
    fn test_release_to_item() {
        let page: CollectionPage = serde_json::from_str(PAGE_JSON).unwrap();
        let item = page.releases[0].to_item("/records/covers/");
        assert_eq!(item.id, 555);
        assert_eq!(item.artist, "Air, Beth Hirsch");
        assert_eq!(item.year, 1998);
        assert_eq!(item.genre, "Electronic");
        assert_eq!(item.local_cover, "/records/covers/555.jpg");
        assert_eq!(item.cover_url, "https://img.example/c.jpg");
    }

    #[test]
    fn test_missing_cover_falls_back_to_thumb_and_unknown_genre() {
        let page: CollectionPage = serde_json::from_str(PAGE_JSON).unwrap();
        let release = &page.releases[1];
        assert_eq!(release.cover_source(), "https://img.example/t2.jpg");
        let item = release.to_item("/records/covers");
        assert_eq!(item.genre, UNKNOWN_GENRE);
        assert_eq!(item.year, 0);
    }

    #[test]
    fn test_page_url() {
        let client = DiscogsClient::new(&CatalogConfig::default(), "tok").unwrap();
        assert_eq!(
            client.page_url(2),
            "https://api.discogs.com/users/oggadog/collection/folders/0/releases?page=2&per_page=100&sort=added&sort_order=desc"
        );
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy("true"));
        assert!(is_truthy("TRUE"));
        assert!(is_truthy(" 1 "));
        assert!(!is_truthy("false"));
        assert!(!is_truthy(""));
    }
}
