use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::observability::ObservabilityConfig;
use crate::infrastructure::services::CorruptEntryPolicy;
use crate::infrastructure::timeout::Timeouts;

/// Application configuration
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub observability: ObservabilityConfig,
    pub database: DatabaseConfig,
    pub storage: StorageConfig,
    pub cache: CacheSettings,
    pub security: SecurityConfig,
    pub timeouts: TimeoutConfig,
    pub ingestion: IngestionConfig,
    pub providers: ProvidersConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Falls back to `DATABASE_URL` when empty
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// `postgres` or `in_memory`
    pub backend: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheSettings {
    /// `redis` or `in_memory`
    pub backend: String,
    pub redis_url: Option<String>,
    pub key_prefix: Option<String>,
    pub recent_key: String,
    pub ttl_secs: u64,
    pub window_hours: i64,
    pub corrupt_entry: CorruptEntryPolicy,
}

#[derive(Clone, Default, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Shared secret expected in the `Special-Key` header
    pub special_key: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeoutConfig {
    pub provider_secs: u64,
    pub store_secs: u64,
    pub cache_secs: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    pub run_on_startup: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    pub news_api: NewsApiSettings,
    pub guardian: GuardianSettings,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct NewsApiSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub country: String,
    pub categories: Vec<String>,
    pub interval_secs: u64,
}

#[derive(Clone, Deserialize)]
#[serde(default)]
pub struct GuardianSettings {
    pub enabled: bool,
    pub base_url: String,
    pub api_key: String,
    pub sections: Vec<String>,
    pub interval_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "postgres".to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            backend: "in_memory".to_string(),
            redis_url: None,
            key_prefix: None,
            recent_key: "recentNews".to_string(),
            ttl_secs: 3600,
            window_hours: 12,
            corrupt_entry: CorruptEntryPolicy::default(),
        }
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        let defaults = Timeouts::default();

        Self {
            provider_secs: defaults.provider.as_secs(),
            store_secs: defaults.store.as_secs(),
            cache_secs: defaults.cache.as_secs(),
        }
    }
}

impl Default for NewsApiSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://newsapi.org".to_string(),
            api_key: String::new(),
            country: "us".to_string(),
            categories: ["business", "entertainment", "general", "health", "science", "sports", "technology"]
                .into_iter()
                .map(String::from)
                .collect(),
            interval_secs: 6 * 3600,
        }
    }
}

impl Default for GuardianSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            base_url: "https://content.guardianapis.com".to_string(),
            api_key: String::new(),
            sections: ["world", "business", "technology", "sport", "science"]
                .into_iter()
                .map(String::from)
                .collect(),
            interval_secs: 7 * 3600,
        }
    }
}

// Secrets stay out of Debug output.

impl std::fmt::Debug for DatabaseConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabaseConfig")
            .field("url", &redacted(&self.url))
            .field("max_connections", &self.max_connections)
            .field("acquire_timeout_secs", &self.acquire_timeout_secs)
            .finish()
    }
}

impl std::fmt::Debug for SecurityConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityConfig")
            .field("special_key", &redacted(&self.special_key))
            .finish()
    }
}

impl std::fmt::Debug for NewsApiSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NewsApiSettings")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(&self.api_key))
            .field("country", &self.country)
            .field("categories", &self.categories)
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}

impl std::fmt::Debug for GuardianSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardianSettings")
            .field("enabled", &self.enabled)
            .field("base_url", &self.base_url)
            .field("api_key", &redacted(&self.api_key))
            .field("sections", &self.sections)
            .field("interval_secs", &self.interval_secs)
            .finish()
    }
}

fn redacted(value: &str) -> &'static str {
    if value.is_empty() { "" } else { "[REDACTED]" }
}

impl TimeoutConfig {
    pub fn to_timeouts(&self) -> Timeouts {
        Timeouts {
            provider: Duration::from_secs(self.provider_secs),
            store: Duration::from_secs(self.store_secs),
            cache: Duration::from_secs(self.cache_secs),
        }
    }
}

impl DatabaseConfig {
    /// The configured URL, else `fallback` (normally `DATABASE_URL`)
    pub fn resolve_url(&self, fallback: Option<String>) -> Option<String> {
        Some(self.url.clone())
            .filter(|u| !u.is_empty())
            .or_else(|| fallback.filter(|u| !u.is_empty()))
    }
}

impl AppConfig {
    /// Layers: `config/default`, `config/local`, then `APP__*` environment
    /// variables. Comma-separated values are accepted for provider lists.
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("providers.news_api.categories")
                    .with_list_parse_key("providers.guardian.sections")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reject settings that would panic a schedule task or break the cache
    /// freshness bound. Disabled providers are not checked.
    pub fn validate(&self) -> Result<(), config::ConfigError> {
        let cache = &self.cache;

        if cache.ttl_secs == 0 {
            return Err(invalid("cache.ttl_secs must be greater than 0"));
        }

        if !(1..=MAX_WINDOW_HOURS).contains(&cache.window_hours) {
            return Err(invalid(format!(
                "cache.window_hours must be between 1 and {}, got {}",
                MAX_WINDOW_HOURS, cache.window_hours
            )));
        }

        let news_api = &self.providers.news_api;
        let guardian = &self.providers.guardian;
        let schedules = [
            ("providers.news_api", news_api.enabled, news_api.interval_secs),
            ("providers.guardian", guardian.enabled, guardian.interval_secs),
        ];

        for (name, enabled, interval_secs) in schedules {
            if !enabled {
                continue;
            }

            if interval_secs == 0 {
                return Err(invalid(format!("{}.interval_secs must be greater than 0", name)));
            }

            if cache.ttl_secs >= interval_secs {
                return Err(invalid(format!(
                    "cache.ttl_secs ({}) must be shorter than {}.interval_secs ({})",
                    cache.ttl_secs, name, interval_secs
                )));
            }
        }

        Ok(())
    }
}

/// Upper bound for `cache.window_hours` (one week)
pub const MAX_WINDOW_HOURS: i64 = 24 * 7;

fn invalid(message: impl Into<String>) -> config::ConfigError {
    config::ConfigError::Message(message.into())
}
