//! Layered application configuration

mod app_config;

pub use app_config::{
    AppConfig, CacheSettings, DatabaseConfig, GuardianSettings, IngestionConfig, LogFormat,
    LoggingConfig, NewsApiSettings, ProvidersConfig, SecurityConfig, ServerConfig, StorageConfig,
    TimeoutConfig,
};
