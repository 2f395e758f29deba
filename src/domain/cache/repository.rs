//! Cache trait definition

use std::fmt::Debug;
use std::time::Duration;

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};

use crate::domain::DomainError;

/// Key/value cache with per-entry TTL
///
/// Values travel as JSON strings so the trait stays dyn-compatible.
/// Use [`CacheExt`] for typed access.
#[async_trait]
pub trait Cache: Send + Sync + Debug {
    /// Gets a raw JSON value from the cache
    async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError>;

    /// Sets a raw JSON value in the cache with a TTL
    async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError>;

    /// Round-trips to the backend. Used by the readiness probe.
    async fn ping(&self) -> Result<(), DomainError> {
        self.get_raw("__ping__").await.map(|_| ())
    }
}

/// Extension trait providing typed get/set operations
pub trait CacheExt: Cache {
    /// Gets a typed value from the cache
    fn get<'a, V>(
        &'a self,
        key: &'a str,
    ) -> impl std::future::Future<Output = Result<Option<V>, DomainError>> + Send
    where
        V: DeserializeOwned + Send,
    {
        async move {
            match self.get_raw(key).await? {
                Some(data) => {
                    let value: V = serde_json::from_str(&data).map_err(|e| {
                        DomainError::cache(format!("Failed to deserialize cache value: {}", e))
                    })?;
                    Ok(Some(value))
                }
                None => Ok(None),
            }
        }
    }

    /// Sets a typed value in the cache with a TTL
    fn set<'a, V>(
        &'a self,
        key: &'a str,
        value: &'a V,
        ttl: Duration,
    ) -> impl std::future::Future<Output = Result<(), DomainError>> + Send
    where
        V: Serialize + Send + Sync,
    {
        async move {
            let data = serde_json::to_string(value).map_err(|e| {
                DomainError::cache(format!("Failed to serialize cache value: {}", e))
            })?;
            self.set_raw(key, &data, ttl).await
        }
    }
}

impl<T: Cache + ?Sized> CacheExt for T {}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Mock cache for testing
    #[derive(Debug, Default)]
    pub struct MockCache {
        entries: Mutex<HashMap<String, (String, Option<Duration>)>>,
        error: Mutex<Option<String>>,
        write_error: Mutex<Option<String>>,
        gets: AtomicUsize,
        sets: AtomicUsize,
    }

    impl MockCache {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with_entry<V: Serialize>(self, key: &str, value: &V, ttl: Option<Duration>) -> Self {
            let json = serde_json::to_string(value).unwrap();
            self.with_raw_entry(key, &json, ttl)
        }

        /// Store a value verbatim, e.g. to simulate a corrupt entry
        pub fn with_raw_entry(self, key: &str, raw: &str, ttl: Option<Duration>) -> Self {
            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (raw.to_string(), ttl));
            self
        }

        /// Fail every operation
        pub fn with_error(self, error: impl Into<String>) -> Self {
            *self.error.lock().unwrap() = Some(error.into());
            self
        }

        /// Fail writes only
        pub fn with_write_error(self, error: impl Into<String>) -> Self {
            *self.write_error.lock().unwrap() = Some(error.into());
            self
        }

        pub fn raw_entry(&self, key: &str) -> Option<String> {
            self.entries
                .lock()
                .unwrap()
                .get(key)
                .map(|(json, _)| json.clone())
        }

        /// TTL passed with the last write of `key`
        pub fn entry_ttl(&self, key: &str) -> Option<Duration> {
            self.entries.lock().unwrap().get(key).and_then(|(_, ttl)| *ttl)
        }

        pub fn get_calls(&self) -> usize {
            self.gets.load(Ordering::SeqCst)
        }

        pub fn set_calls(&self) -> usize {
            self.sets.load(Ordering::SeqCst)
        }

        fn check_error(&self) -> Result<(), DomainError> {
            if let Some(error) = self.error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl Cache for MockCache {
        async fn get_raw(&self, key: &str) -> Result<Option<String>, DomainError> {
            self.gets.fetch_add(1, Ordering::SeqCst);
            self.check_error()?;
            Ok(self.raw_entry(key))
        }

        async fn set_raw(&self, key: &str, value: &str, ttl: Duration) -> Result<(), DomainError> {
            self.sets.fetch_add(1, Ordering::SeqCst);
            self.check_error()?;

            if let Some(error) = self.write_error.lock().unwrap().clone() {
                return Err(DomainError::cache(error));
            }

            self.entries
                .lock()
                .unwrap()
                .insert(key.to_string(), (value.to_string(), Some(ttl)));
            Ok(())
        }

    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[tokio::test]
        async fn test_mock_cache_set_get() {
            let cache = MockCache::new();
            cache
                .set("key1", &"value1", Duration::from_secs(60))
                .await
                .unwrap();

            let result: Option<String> = cache.get("key1").await.unwrap();
            assert_eq!(result, Some("value1".to_string()));
            assert_eq!(cache.entry_ttl("key1"), Some(Duration::from_secs(60)));
        }

        #[tokio::test]
        async fn test_mock_cache_get_missing() {
            let cache = MockCache::new();

            let result: Option<String> = cache.get("missing").await.unwrap();
            assert!(result.is_none());
            assert_eq!(cache.get_calls(), 1);
        }

        #[tokio::test]
        async fn test_typed_get_of_corrupt_entry_is_cache_error() {
            let cache = MockCache::new().with_raw_entry("key", "{not json", None);

            let result: Result<Option<Vec<String>>, _> = cache.get("key").await;
            assert!(matches!(result, Err(DomainError::Cache { .. })));
        }

        #[tokio::test]
        async fn test_mock_cache_with_error() {
            let cache = MockCache::new().with_error("Test error");

            let result: Result<Option<String>, _> = cache.get("key").await;
            assert!(result.is_err());
            assert!(cache.ping().await.is_err());
        }

        #[tokio::test]
        async fn test_mock_cache_write_error_still_reads() {
            let cache = MockCache::new()
                .with_entry("key", &"value", None)
                .with_write_error("read only");

            let result: Option<String> = cache.get("key").await.unwrap();
            assert_eq!(result.as_deref(), Some("value"));
            assert!(cache.set("key", &"other", Duration::from_secs(1)).await.is_err());
        }
    }
}
