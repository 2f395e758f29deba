//! Article store factory for runtime backend selection

use std::sync::Arc;

use sqlx::PgPool;

use crate::domain::article::ArticleRepository;
use crate::domain::DomainError;

use super::in_memory_repository::InMemoryArticleRepository;
use super::postgres_repository::{PostgresArticleRepository, PostgresConfig};

/// Supported storage backends
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum StorageType {
    /// Process-local store (development and tests)
    InMemory,
    #[default]
    Postgres,
}

impl std::str::FromStr for StorageType {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" | "inmemory" | "in-memory" | "in_memory" => Ok(Self::InMemory),
            "postgres" | "postgresql" | "pg" => Ok(Self::Postgres),
            _ => Err(DomainError::configuration(format!(
                "Unknown storage backend: {}. Valid backends: postgres, in_memory",
                s
            ))),
        }
    }
}

/// A constructed article store, plus the pool when it is database-backed
#[derive(Debug, Clone)]
pub struct ArticleStore {
    pub repository: Arc<dyn ArticleRepository>,
    pub pool: Option<PgPool>,
}

/// Builds the article repository for the configured backend
#[derive(Debug)]
pub struct ArticleStoreFactory;

impl ArticleStoreFactory {
    pub async fn create(
        storage_type: &StorageType,
        postgres: Option<&PostgresConfig>,
    ) -> Result<ArticleStore, DomainError> {
        match storage_type {
            StorageType::InMemory => Ok(ArticleStore {
                repository: Arc::new(InMemoryArticleRepository::new()),
                pool: None,
            }),
            StorageType::Postgres => {
                let config = postgres.filter(|c| !c.url.is_empty()).ok_or_else(|| {
                    DomainError::configuration("database.url is required for the postgres backend")
                })?;

                let pool = config.connect().await?;

                Ok(ArticleStore {
                    repository: Arc::new(PostgresArticleRepository::new(pool.clone())),
                    pool: Some(pool),
                })
            }
        }
    }
}
