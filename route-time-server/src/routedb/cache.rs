//! On-disk copy of the last downloaded route database.
//!
//! The upstream document is tens of megabytes, so a restart within the
//! TTL reuses the local copy instead of downloading it again.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::error::RouteDbError;

const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// A document read back from the disk cache.
#[derive(Debug, Deserialize)]
pub struct CachedDocument {
    /// Unix seconds at which the document was downloaded.
    pub cached_at_secs: u64,
    pub document: Value,
}

impl CachedDocument {
    fn age(&self, now_secs: u64) -> Duration {
        Duration::from_secs(now_secs.saturating_sub(self.cached_at_secs))
    }
}

#[derive(Serialize)]
struct CacheFile<'a> {
    cached_at_secs: u64,
    document: &'a Value,
}

#[derive(Debug, Clone)]
pub struct RouteDbCacheConfig {
    pub path: PathBuf,
    /// Copies older than this are ignored. Defaults to 24 hours.
    pub ttl: Duration,
}

impl RouteDbCacheConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            ttl: DEFAULT_TTL,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }
}

/// Reads and writes the cached route database file.
#[derive(Debug, Clone)]
pub struct RouteDbCache {
    config: RouteDbCacheConfig,
}

impl RouteDbCache {
    pub fn new(config: RouteDbCacheConfig) -> Self {
        Self { config }
    }

    /// The cached document, if one exists, parses, and is younger than the TTL.
    pub fn load(&self) -> Option<CachedDocument> {
        let path = &self.config.path;
        let bytes = std::fs::read(path).ok()?;
        let cached: CachedDocument = match serde_json::from_slice(&bytes) {
            Ok(cached) => cached,
            Err(e) => {
                debug!(path = %path.display(), error = %e, "unreadable route database cache");
                return None;
            }
        };

        let age = cached.age(unix_now().ok()?);
        if age >= self.config.ttl {
            debug!(path = %path.display(), age_secs = age.as_secs(), "route database cache expired");
            return None;
        }
        Some(cached)
    }

    /// Write `document` to the cache and return its timestamp.
    ///
    /// The file is written beside the target and renamed into place, so a
    /// reader never sees a partial document.
    pub fn save(&self, document: &Value) -> Result<u64, RouteDbError> {
        let cached_at_secs = unix_now()?;
        let path = &self.config.path;

        if let Some(dir) = path.parent()
            && !dir.as_os_str().is_empty()
        {
            std::fs::create_dir_all(dir).map_err(|e| cache_error("create directory", dir, e))?;
        }

        let bytes = serde_json::to_vec(&CacheFile {
            cached_at_secs,
            document,
        })
        .map_err(|e| RouteDbError::Cache {
            message: format!("cannot encode document: {e}"),
        })?;

        let partial = path.with_extension("partial");
        std::fs::write(&partial, bytes).map_err(|e| cache_error("write", &partial, e))?;
        std::fs::rename(&partial, path).map_err(|e| cache_error("replace", path, e))?;

        debug!(path = %path.display(), cached_at_secs, "saved route database cache");
        Ok(cached_at_secs)
    }

    pub fn path(&self) -> &Path {
        &self.config.path
    }

    pub fn ttl(&self) -> Duration {
        self.config.ttl
    }
}

fn cache_error(action: &str, path: &Path, e: std::io::Error) -> RouteDbError {
    RouteDbError::Cache {
        message: format!("cannot {action} {}: {e}", path.display()),
    }
}

fn unix_now() -> Result<u64, RouteDbError> {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs())
        .map_err(|_| RouteDbError::Cache {
            message: "system clock is before the unix epoch".to_string(),
        })
}
