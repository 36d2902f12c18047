//! Namespaced key/value cache with per-entry TTL.
//!
//! Staleness is computed, never enforced by deletion: an expired entry
//! is still readable and callers decide whether to use it
//! (stale-while-revalidate). `get` cannot fail — storage errors and
//! corrupt entries are misses.

use std::future::Future;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use tracing::warn;

const CACHE_PREFIX: &str = "cache:";

/// Persisted key/value storage: async get/set/remove by string key,
/// survives restarts. `remove_prefix` exists so the cache can clear its
/// own namespace without disturbing unrelated persisted state.
pub trait Storage: Send + Sync + 'static {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> + Send;
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<()>> + Send;
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> + Send;
    fn remove_prefix(&self, prefix: &str) -> impl Future<Output = Result<()>> + Send;
}

/// One file per key under a root directory.
pub struct FsStorage {
    root: PathBuf,
}

impl FsStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{}.json", sanitize(key)))
    }
}

/// Keys become file names; the mapping is char-wise so key prefixes stay
/// file-name prefixes (needed by `remove_prefix`).
fn sanitize(key: &str) -> String {
    key.chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .collect()
}

impl Storage for FsStorage {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match tokio::fs::read_to_string(self.path_for(key)).await {
            Ok(s) => Ok(Some(s)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e).context("failed to read storage entry"),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .context("failed to create storage dir")?;
        tokio::fs::write(self.path_for(key), value)
            .await
            .context("failed to write storage entry")
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(key)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).context("failed to remove storage entry"),
        }
    }

    async fn remove_prefix(&self, prefix: &str) -> Result<()> {
        let sanitized = sanitize(prefix);
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => return Err(e).context("failed to list storage dir"),
        };
        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name();
            let Some(name) = name.to_str() else { continue };
            if name.starts_with(&sanitized) {
                let _ = tokio::fs::remove_file(entry.path()).await;
            }
        }
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct CacheEntry {
    data: serde_json::Value,
    expires_at_ms: i64,
}

/// A cache read: the value plus whether its TTL has lapsed.
#[derive(Debug, Clone, PartialEq)]
pub struct Cached<T> {
    pub data: T,
    pub stale: bool,
}

pub struct CacheStore<S> {
    storage: S,
}

impl<S: Storage> CacheStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub async fn get<T: DeserializeOwned>(&self, key: &str) -> Option<Cached<T>> {
        self.get_at(key, now_ms()).await
    }

    pub(crate) async fn get_at<T: DeserializeOwned>(&self, key: &str, now_ms: i64) -> Option<Cached<T>> {
        let raw = match self.storage.get(&namespaced(key)).await {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e) => {
                warn!("[cache] read failed for {}: {}", key, e);
                return None;
            }
        };
        // Corrupt entries are misses, never errors.
        let entry: CacheEntry = serde_json::from_str(&raw).ok()?;
        let data: T = serde_json::from_value(entry.data).ok()?;
        Some(Cached {
            data,
            stale: now_ms > entry.expires_at_ms,
        })
    }

    pub async fn set<T: Serialize>(&self, key: &str, data: &T, ttl_ms: i64) {
        self.set_at(key, data, ttl_ms, now_ms()).await;
    }

    pub(crate) async fn set_at<T: Serialize>(&self, key: &str, data: &T, ttl_ms: i64, now_ms: i64) {
        let entry = match serde_json::to_value(data) {
            Ok(data) => CacheEntry {
                data,
                expires_at_ms: now_ms + ttl_ms,
            },
            Err(e) => {
                warn!("[cache] serialize failed for {}: {}", key, e);
                return;
            }
        };
        let raw = match serde_json::to_string(&entry) {
            Ok(raw) => raw,
            Err(e) => {
                warn!("[cache] serialize failed for {}: {}", key, e);
                return;
            }
        };
        // Write failures degrade to network-only operation.
        if let Err(e) = self.storage.set(&namespaced(key), raw).await {
            warn!("[cache] write failed for {}: {}", key, e);
        }
    }

    pub async fn invalidate(&self, key: &str) {
        if let Err(e) = self.storage.remove(&namespaced(key)).await {
            warn!("[cache] invalidate failed for {}: {}", key, e);
        }
    }

    /// Removes every entry under the cache namespace; unrelated
    /// persisted state is untouched.
    pub async fn invalidate_all(&self) {
        if let Err(e) = self.storage.remove_prefix(CACHE_PREFIX).await {
            warn!("[cache] invalidate_all failed: {}", e);
        }
    }

    pub(crate) fn storage(&self) -> &S {
        &self.storage
    }
}

fn namespaced(key: &str) -> String {
    format!("{}{}", CACHE_PREFIX, key)
}

fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}
