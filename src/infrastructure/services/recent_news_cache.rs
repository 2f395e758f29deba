//! Cache-aside slot holding the recent-news window

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::warn;

use crate::domain::article::Article;
use crate::domain::cache::{Cache, CacheExt};
use crate::domain::DomainError;
use crate::infrastructure::timeout::with_timeout;

/// What to do with a cached value that no longer decodes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptEntryPolicy {
    /// Fail the request
    #[default]
    Fail,
    /// Treat the entry as absent and repopulate it from the store
    Miss,
}

#[derive(Debug, Clone)]
pub struct RecentNewsCacheConfig {
    /// Name of the single cache slot
    pub key: String,
    /// Lifetime of a populated slot
    pub ttl: Duration,
    /// Trailing span of publication time held in the slot
    pub window: chrono::Duration,
    pub corrupt_entry: CorruptEntryPolicy,
    /// Deadline for each cache call
    pub timeout: Duration,
}

impl Default for RecentNewsCacheConfig {
    fn default() -> Self {
        Self {
            key: "recentNews".to_string(),
            ttl: Duration::from_secs(3600),
            window: chrono::Duration::hours(12),
            corrupt_entry: CorruptEntryPolicy::default(),
            timeout: Duration::from_secs(2),
        }
    }
}

/// The recent-news slot: one serialized, ordered list under a fixed key.
///
/// The slot is written only when a read misses. Ingestion never invalidates
/// it, so it may lag the store by up to its TTL.
#[derive(Debug, Clone)]
pub struct RecentNewsCache {
    cache: Arc<dyn Cache>,
    config: RecentNewsCacheConfig,
}

impl RecentNewsCache {
    pub fn new(cache: Arc<dyn Cache>, config: RecentNewsCacheConfig) -> Self {
        Self { cache, config }
    }

    pub fn config(&self) -> &RecentNewsCacheConfig {
        &self.config
    }

    /// Oldest publication time that belongs in the slot
    pub fn window_start(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now - self.config.window
    }

    /// Read the slot. `Ok(None)` is a miss.
    pub async fn get(&self) -> Result<Option<Vec<Article>>, DomainError> {
        let raw = with_timeout(
            "cache.get",
            self.config.timeout,
            self.cache.get_raw(&self.config.key),
        )
        .await?;

        let Some(raw) = raw else {
            return Ok(None);
        };

        match serde_json::from_str::<Vec<Article>>(&raw) {
            Ok(articles) => Ok(Some(articles)),
            Err(e) => match self.config.corrupt_entry {
                CorruptEntryPolicy::Fail => Err(DomainError::cache(format!(
                    "Failed to deserialize cache entry '{}': {}",
                    self.config.key, e
                ))),
                CorruptEntryPolicy::Miss => {
                    warn!(key = %self.config.key, error = %e, "Discarding undecodable cache entry");
                    Ok(None)
                }
            },
        }
    }

    /// Overwrite the slot. Last writer wins.
    pub async fn set(&self, articles: &[Article]) -> Result<(), DomainError> {
        with_timeout(
            "cache.set",
            self.config.timeout,
            self.cache.set(&self.config.key, &articles, self.config.ttl),
        )
        .await
    }

    /// Backend reachability, for readiness checks
    pub async fn ping(&self) -> Result<(), DomainError> {
        with_timeout("cache.ping", self.config.timeout, self.cache.ping()).await
    }
}
