//! News aggregator
//!
//! Pulls articles from several news providers on a schedule, drops
//! near-duplicate stories, stores the rest, and serves them over HTTP with a
//! cached view of the last few hours.

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::{AppState, SpecialKey};
use domain::NewsProvider;
use infrastructure::{
    article::{run_article_migrations, ArticleStoreFactory, PostgresConfig, StorageType},
    cache::{CacheConfig, CacheFactory, CacheType},
    provider::{GuardianConfig, GuardianProvider, HttpClient, NewsApiConfig, NewsApiProvider},
    scheduler::ScheduledProvider,
    services::{
        DedupGate, IngestionService, NewsQueryService, RecentNewsCache, RecentNewsCacheConfig,
    },
};
use tracing::{info, warn};

/// Everything the entry points need, built once from configuration
#[derive(Debug)]
pub struct AppComponents {
    pub state: AppState,
    pub ingestion: IngestionService,
    pub providers: Vec<ScheduledProvider>,
}

impl AppComponents {
    /// The enabled providers without their schedules
    pub fn provider_handles(&self) -> Vec<Arc<dyn NewsProvider>> {
        self.providers.iter().map(|p| p.provider.clone()).collect()
    }
}

/// Connect to the backing services and wire every component by constructor
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppComponents> {
    let timeouts = config.timeouts.to_timeouts();

    let storage_type: StorageType = config.storage.backend.parse()?;
    info!(backend = ?storage_type, "Article store backend");

    let postgres = postgres_config(config);
    let store = ArticleStoreFactory::create(&storage_type, postgres.as_ref()).await?;

    if let Some(pool) = &store.pool {
        let applied = run_article_migrations(pool).await?;
        info!(applied, "Schema migrations checked");
    }

    let cache_type: CacheType = config.cache.backend.parse()?;
    info!(backend = %cache_type, "Cache backend");

    let mut cache_config = CacheConfig {
        cache_type,
        redis_url: config.cache.redis_url.clone(),
        ..Default::default()
    }
    .with_max_ttl(Duration::from_secs(config.cache.ttl_secs));

    if let Some(prefix) = &config.cache.key_prefix {
        cache_config = cache_config.with_key_prefix(prefix.clone());
    }

    let cache = CacheFactory::new().create(&cache_config).await?;

    let window = chrono::Duration::try_hours(config.cache.window_hours).ok_or_else(|| {
        anyhow::anyhow!("cache.window_hours out of range: {}", config.cache.window_hours)
    })?;

    let recent_cache = RecentNewsCache::new(
        cache,
        RecentNewsCacheConfig {
            key: config.cache.recent_key.clone(),
            ttl: Duration::from_secs(config.cache.ttl_secs),
            window,
            corrupt_entry: config.cache.corrupt_entry,
            timeout: timeouts.cache,
        },
    );

    let news = NewsQueryService::new(store.repository.clone(), recent_cache, timeouts.store);

    if config.security.special_key.is_empty() {
        warn!("security.special_key is empty; filtered and recent endpoints will reject every request");
    }

    let state = AppState::new(news, SpecialKey::new(config.security.special_key.clone()));

    let ingestion = IngestionService::new(
        DedupGate::new(store.repository, timeouts.store),
        timeouts.provider,
    );

    let providers = create_providers(config, timeouts.provider)?;

    Ok(AppComponents {
        state,
        ingestion,
        providers,
    })
}

/// Database settings with the `DATABASE_URL` fallback applied
pub fn postgres_config(config: &AppConfig) -> Option<PostgresConfig> {
    config
        .database
        .resolve_url(std::env::var("DATABASE_URL").ok())
        .map(|url| {
            PostgresConfig::new(url)
                .with_max_connections(config.database.max_connections)
                .with_acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        })
}

/// Build the enabled provider adapters. A provider without an API key is skipped.
fn create_providers(
    config: &AppConfig,
    provider_timeout: Duration,
) -> anyhow::Result<Vec<ScheduledProvider>> {
    let client = HttpClient::with_timeout(provider_timeout)?;
    let mut providers = Vec::new();

    let news_api = &config.providers.news_api;
    if news_api.enabled && !news_api.api_key.is_empty() {
        let adapter = NewsApiProvider::new(
            client.clone(),
            NewsApiConfig::new(news_api.api_key.clone(), news_api.categories.clone())
                .with_base_url(news_api.base_url.clone())
                .with_country(news_api.country.clone()),
        );
        providers.push(ScheduledProvider::new(
            Arc::new(adapter),
            Duration::from_secs(news_api.interval_secs),
        ));
    } else if news_api.enabled {
        warn!("providers.news_api is enabled but has no api_key; skipping");
    }

    let guardian = &config.providers.guardian;
    if guardian.enabled && !guardian.api_key.is_empty() {
        let adapter = GuardianProvider::new(
            client,
            GuardianConfig::new(guardian.api_key.clone(), guardian.sections.clone())
                .with_base_url(guardian.base_url.clone()),
        );
        providers.push(ScheduledProvider::new(
            Arc::new(adapter),
            Duration::from_secs(guardian.interval_secs),
        ));
    } else if guardian.enabled {
        warn!("providers.guardian is enabled but has no api_key; skipping");
    }

    info!(count = providers.len(), "News providers configured");

    Ok(providers)
}
