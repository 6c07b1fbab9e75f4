//! Shared, refreshable route database snapshot.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{info, warn};

use super::cache::RouteDbCache;
use super::client::RouteDbClient;
use super::error::RouteDbError;
use super::types::RouteDb;

struct Snapshot {
    db: Arc<RouteDb>,
    loaded_at: DateTime<Utc>,
}

/// Thread-safe handle to the current route database snapshot.
///
/// Cloning the handle shares the snapshot. Readers take an `Arc<RouteDb>`
/// and keep using it even if a refresh swaps in a newer one.
#[derive(Clone)]
pub struct RouteDbHandle {
    inner: Arc<RwLock<Snapshot>>,
    client: RouteDbClient,
    cache: Option<RouteDbCache>,
}

impl RouteDbHandle {
    /// Load the database, preferring a fresh disk cache over a download.
    ///
    /// This will fail if there is no usable cache and the download fails.
    pub async fn load(
        client: RouteDbClient,
        cache: Option<RouteDbCache>,
    ) -> Result<Self, RouteDbError> {
        let cached = cache.as_ref().and_then(|c| {
            let cached = c.load()?;
            let loaded_at = DateTime::<Utc>::from_timestamp(cached.cached_at_secs as i64, 0)?;
            match RouteDb::from_value(cached.document) {
                Ok(db) => Some((db, loaded_at)),
                Err(e) => {
                    warn!(path = %c.path().display(), error = %e, "ignoring unusable route database cache");
                    None
                }
            }
        });

        let (db, loaded_at) = match cached {
            Some(found) => {
                info!("using cached route database");
                found
            }
            None => {
                info!(url = client.url(), "downloading route database");
                let document = client.fetch_document().await?;
                let loaded_at = Utc::now();
                let db = RouteDb::from_value(document.clone())?;
                store(cache.as_ref(), &document);
                (db, loaded_at)
            }
        };

        Ok(Self {
            inner: Arc::new(RwLock::new(Snapshot {
                db: Arc::new(db),
                loaded_at,
            })),
            client,
            cache,
        })
    }

    /// Wrap an already-parsed database, e.g. for tests or offline use.
    pub fn from_db(db: RouteDb, client: RouteDbClient) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Snapshot {
                db: Arc::new(db),
                loaded_at: Utc::now(),
            })),
            client,
            cache: None,
        }
    }

    /// The current snapshot.
    pub async fn current(&self) -> Arc<RouteDb> {
        let guard = self.inner.read().await;
        guard.db.clone()
    }

    /// When the current snapshot was downloaded.
    pub async fn loaded_at(&self) -> DateTime<Utc> {
        let guard = self.inner.read().await;
        guard.loaded_at
    }

    /// Re-download the database and swap it in.
    ///
    /// On success, returns the number of routes in the new snapshot. On
    /// failure, the existing snapshot is preserved and the error is returned.
    pub async fn refresh(&self) -> Result<usize, RouteDbError> {
        let document = self.client.fetch_document().await?;
        let loaded_at = Utc::now();
        // only a document that parses may replace the cached copy
        let db = RouteDb::from_value(document.clone())?;
        store(self.cache.as_ref(), &document);
        let count = db.route_count();

        let mut guard = self.inner.write().await;
        *guard = Snapshot {
            db: Arc::new(db),
            loaded_at,
        };

        Ok(count)
    }
}

fn store(cache: Option<&RouteDbCache>, document: &Value) {
    if let Some(cache) = cache
        && let Err(e) = cache.save(document)
    {
        warn!(error = %e, "failed to write route database cache");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::routedb::{RouteDbCacheConfig, RouteDbClientConfig};
    use serde_json::json;
    use tempfile::tempdir;

    fn unreachable_client() -> RouteDbClient {
        RouteDbClient::new(RouteDbClientConfig::new("http://127.0.0.1:9/db.json").with_timeout(2))
            .unwrap()
    }

    /// Serve `document` at `/db.json` on an ephemeral local port.
    async fn serve_document(document: Value) -> RouteDbClient {
        let app = axum::Router::new().route(
            "/db.json",
            axum::routing::get(move || {
                let document = document.clone();
                async move { axum::Json(document) }
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });

        RouteDbClient::new(RouteDbClientConfig::new(format!("http://{addr}/db.json")).with_timeout(5))
            .unwrap()
    }

    fn db_with_one_route() -> RouteDb {
        RouteDb::from_value(json!({"routeList": {"1+1+A+B": {"route": "1", "co": ["kmb"]}}}))
            .unwrap()
    }

    #[tokio::test]
    async fn from_db_exposes_snapshot() {
        let before = Utc::now();
        let handle = RouteDbHandle::from_db(db_with_one_route(), unreachable_client());

        assert_eq!(handle.current().await.route_count(), 1);
        assert!(handle.loaded_at().await >= before);
    }

    #[tokio::test]
    async fn failed_refresh_keeps_old_snapshot() {
        let handle = RouteDbHandle::from_db(db_with_one_route(), unreachable_client());
        let loaded_at = handle.loaded_at().await;

        assert!(handle.refresh().await.is_err());
        assert_eq!(handle.current().await.route_count(), 1);
        assert_eq!(handle.loaded_at().await, loaded_at);
    }

    #[tokio::test]
    async fn load_prefers_fresh_disk_cache() {
        let dir = tempdir().unwrap();
        let cache = RouteDbCache::new(RouteDbCacheConfig::new(dir.path().join("db.json")));
        let written_at = cache
            .save(&json!({"routeList": {"a": {"route": "1"}, "b": {"route": "2"}}}))
            .unwrap();

        let handle = RouteDbHandle::load(unreachable_client(), Some(cache))
            .await
            .unwrap();

        assert_eq!(handle.current().await.route_count(), 2);
        assert_eq!(handle.loaded_at().await.timestamp(), written_at as i64);
    }

    #[tokio::test]
    async fn load_without_cache_or_network_fails() {
        assert!(RouteDbHandle::load(unreachable_client(), None).await.is_err());
    }

    #[tokio::test]
    async fn invalid_download_does_not_replace_cache() {
        let dir = tempdir().unwrap();
        let cache = RouteDbCache::new(RouteDbCacheConfig::new(dir.path().join("db.json")));
        let written_at = cache
            .save(&json!({"routeList": {"a": {"route": "1"}, "b": {"route": "2"}}}))
            .unwrap();

        let client = serve_document(json!({"stopList": {}})).await;
        let handle = RouteDbHandle::load(client, Some(cache.clone()))
            .await
            .unwrap();

        let err = handle.refresh().await.unwrap_err();
        assert!(matches!(err, RouteDbError::MissingStructure("routeList")));
        assert_eq!(handle.current().await.route_count(), 2);

        let cached = cache.load().unwrap();
        assert_eq!(cached.cached_at_secs, written_at);
        assert_eq!(RouteDb::from_value(cached.document).unwrap().route_count(), 2);
    }

    #[tokio::test]
    async fn invalid_first_download_writes_no_cache() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let cache = RouteDbCache::new(RouteDbCacheConfig::new(&path));

        let client = serve_document(json!({"stopList": {}})).await;
        assert!(RouteDbHandle::load(client, Some(cache)).await.is_err());
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn successful_refresh_updates_snapshot_and_cache() {
        let dir = tempdir().unwrap();
        let cache = RouteDbCache::new(RouteDbCacheConfig::new(dir.path().join("db.json")));
        cache
            .save(&json!({"routeList": {"a": {"route": "1"}, "b": {"route": "2"}}}))
            .unwrap();

        let client = serve_document(json!({"routeList": {"c": {"route": "3"}}})).await;
        let handle = RouteDbHandle::load(client, Some(cache.clone()))
            .await
            .unwrap();
        assert_eq!(handle.current().await.route_count(), 2);

        assert_eq!(handle.refresh().await.unwrap(), 1);
        assert_eq!(handle.current().await.route_count(), 1);

        let cached = cache.load().unwrap();
        assert_eq!(RouteDb::from_value(cached.document).unwrap().route_count(), 1);
    }
}
