use std::sync::Arc;

use anyhow::Context;
use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use records_proto::config::Config;
use records_proto::layout::build_stack;
use records_proto::repository::{self, CatalogRepository};
use serde::Deserialize;
use tokio::net::TcpListener;
use tokio::sync::Mutex;
use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tracing::{error, info};

#[derive(Clone)]
struct HttpState {
    config: Arc<Config>,
    /// Live mode requested for every request (`DISCOGS_LIVE`).
    force_live: bool,
    /// Held for a whole live pass; passes share the cache file and the
    /// Discogs rate limit, so they run one at a time.
    live_pass: Arc<Mutex<()>>,
}

impl HttpState {
    fn new(config: Arc<Config>, force_live: bool) -> Self {
        Self {
            config,
            force_live,
            live_pass: Arc::new(Mutex::new(())),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct RecordsQuery {
    #[serde(default)]
    live: bool,
}

pub fn router(config: Arc<Config>, force_live: bool) -> Router {
    app(HttpState::new(config, force_live))
}

fn app(state: HttpState) -> Router {
    let covers = ServeDir::new(&state.config.paths.covers_dir);
    let covers_prefix = state.config.paths.covers_url_prefix.clone();

    Router::new()
        .route("/api/records", get(get_records))
        .nest_service(&covers_prefix, covers)
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Bind and serve until the listener fails. Bind errors are returned, not
/// swallowed, so `serve` exits non-zero.
pub fn start_server(
    config: Arc<Config>,
    force_live: bool,
) -> tokio::task::JoinHandle<anyhow::Result<()>> {
    tokio::spawn(async move {
        let addr = format!("{}:{}", config.http.bind_address, config.http.port);
        let app = router(config, force_live);

        let listener = match TcpListener::bind(&addr).await {
            Ok(l) => l,
            Err(e) => {
                error!("Failed to bind HTTP server to {}: {}", addr, e);
                return Err(e).with_context(|| format!("failed to bind {}", addr));
            }
        };

        info!("Records API listening on http://{}", addr);

        axum::serve(listener, app).await.map_err(|e| {
            error!("HTTP server error: {}", e);
            anyhow::Error::new(e).context("HTTP server error")
        })
    })
}

/// The genre-sorted stack with dividers, positions and record metadata.
async fn get_records(State(state): State<HttpState>, Query(query): Query<RecordsQuery>) -> Response {
    let repo = repository::from_config(&state.config, query.live || state.force_live);
    let records = if repo.is_live() {
        let _pass = state.live_pass.lock().await;
        info!("HTTP API: records (live)");
        repo.records().await
    } else {
        info!("HTTP API: records (cached)");
        repo.records().await
    };
    Json(build_stack(&records)).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use records_proto::cache::CachedStore;
    use records_proto::catalog::{mock_catalog, CatalogItem};
    use std::time::Duration;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn test_config(dir: &TempDir) -> Arc<Config> {
        let mut config = Config::default();
        config.paths.cache_file = dir.path().join("discogs-cache.json");
        config.paths.covers_dir = dir.path().join("covers");
        Arc::new(config)
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec())
    }

    #[tokio::test]
    async fn test_records_served_from_cache() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        CachedStore::new(&config.paths.cache_file)
            .save(&mock_catalog())
            .await
            .unwrap();

        let (status, body) = get(router(config, false), "/api/records").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["total"], 16);
        assert_eq!(value["items"][0]["kind"], "divider");
        assert_eq!(value["items"][0]["genre"], "Electronic");
        assert_eq!(value["items"][1]["item"]["localCover"], "/records/covers/1.jpg");
    }

    #[tokio::test]
    async fn test_cover_files_are_served() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        std::fs::create_dir_all(&config.paths.covers_dir).unwrap();
        std::fs::write(config.paths.covers_dir.join("7.jpg"), b"jpeg bytes").unwrap();

        let (status, body) = get(router(config.clone(), false), "/records/covers/7.jpg").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, b"jpeg bytes");

        let (status, _) = get(router(config, false), "/records/covers/8.jpg").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    async fn cache_one_record(config: &Config) {
        let record = CatalogItem {
            title: "FROM CACHE".into(),
            ..mock_catalog().remove(0)
        };
        CachedStore::new(&config.paths.cache_file)
            .save(&[record])
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_forced_live_mode_bypasses_cache() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        cache_one_record(&config).await;

        // No token in tests: the live pass falls back to the mock collection
        let (status, body) = get(router(config, true), "/api/records").await;
        assert_eq!(status, StatusCode::OK);

        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["total"], 16);
        assert_ne!(value["items"][1]["item"]["title"], "FROM CACHE");
    }

    #[tokio::test]
    async fn test_live_passes_wait_for_each_other() {
        let dir = TempDir::new().unwrap();
        let config = test_config(&dir);
        cache_one_record(&config).await;

        let state = HttpState::new(config, false);
        let running = state.live_pass.clone();
        let guard = running.lock().await;

        // Cached reads are not held up by a live pass
        let (status, _) = get(app(state.clone()), "/api/records").await;
        assert_eq!(status, StatusCode::OK);

        let live = tokio::spawn(get(app(state), "/api/records?live=true"));
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!live.is_finished());

        drop(guard);
        let (status, body) = live.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value["total"], 16);
    }

    #[tokio::test]
    async fn test_bind_failure_is_returned() {
        let taken = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let mut config = Config::default();
        config.http.bind_address = "127.0.0.1".into();
        config.http.port = taken.local_addr().unwrap().port();

        let result = start_server(Arc::new(config), false).await.unwrap();
        assert!(result.is_err());
    }

    #[test]
    fn test_live_query_flag() {
        let query: RecordsQuery = parse_query("live=true");
        assert!(query.live);
        let query: RecordsQuery = parse_query("");
        assert!(!query.live);
    }

    fn parse_query(raw: &str) -> RecordsQuery {
        let uri: axum::http::Uri = format!("/api/records?{}", raw).parse().unwrap();
        Query::<RecordsQuery>::try_from_uri(&uri).unwrap().0
    }
}
