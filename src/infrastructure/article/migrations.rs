//! Embedded, versioned schema migrations for the article store

use sqlx::postgres::PgPool;
use tracing::info;

use crate::domain::DomainError;

/// A single schema change. Each migration is exactly one SQL statement.
#[derive(Debug, Clone)]
pub struct Migration {
    pub version: i64,
    pub description: String,
    pub up: String,
}

impl Migration {
    pub fn new(version: i64, description: impl Into<String>, up: impl Into<String>) -> Self {
        Self {
            version,
            description: description.into(),
            up: up.into(),
        }
    }
}

/// Applies migrations and records them in `_migrations`
#[derive(Debug)]
pub struct PostgresMigrator {
    pool: PgPool,
}

impl PostgresMigrator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn ensure_migrations_table(&self) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS _migrations (
                version BIGINT PRIMARY KEY,
                description TEXT NOT NULL,
                installed_on TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to create migrations table: {}", e)))?;

        Ok(())
    }

    /// Runs a single migration unless it is already recorded.
    /// Returns whether it was applied.
    async fn run_migration(&self, migration: &Migration) -> Result<bool, DomainError> {
        let applied: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM _migrations WHERE version = $1)")
                .bind(migration.version)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    DomainError::storage(format!("Failed to check migration status: {}", e))
                })?;

        if applied {
            return Ok(false);
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin migration: {}", e)))?;

        sqlx::query(&migration.up)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to run migration {}: {}",
                    migration.version, e
                ))
            })?;

        sqlx::query("INSERT INTO _migrations (version, description) VALUES ($1, $2)")
            .bind(migration.version)
            .bind(&migration.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                DomainError::storage(format!(
                    "Failed to record migration {}: {}",
                    migration.version, e
                ))
            })?;

        tx.commit().await.map_err(|e| {
            DomainError::storage(format!(
                "Failed to commit migration {}: {}",
                migration.version, e
            ))
        })?;

        Ok(true)
    }

    /// Returns the latest applied migration version
    pub async fn current_version(&self) -> Result<Option<i64>, DomainError> {
        self.ensure_migrations_table().await?;

        sqlx::query_scalar("SELECT MAX(version) FROM _migrations")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to get migration version: {}", e)))
    }

    /// Applies every pending migration in order. Returns how many ran.
    pub async fn run_all(&self, migrations: &[Migration]) -> Result<usize, DomainError> {
        self.ensure_migrations_table().await?;

        let mut applied = 0;

        for migration in migrations {
            if self.run_migration(migration).await? {
                info!(
                    version = migration.version,
                    description = %migration.description,
                    "Applied migration"
                );
                applied += 1;
            }
        }

        Ok(applied)
    }
}

/// Schema of the article store
pub fn article_migrations() -> Vec<Migration> {
    vec![
        Migration::new(
            1,
            "Enable pg_trgm",
            "CREATE EXTENSION IF NOT EXISTS pg_trgm",
        ),
        Migration::new(
            2,
            "Create articles table",
            r#"
            CREATE TABLE IF NOT EXISTS articles (
                id BIGSERIAL PRIMARY KEY,
                author TEXT NOT NULL DEFAULT '',
                title TEXT NOT NULL,
                url TEXT NOT NULL,
                image_url TEXT NOT NULL DEFAULT '',
                published_at TIMESTAMPTZ NOT NULL,
                category TEXT NOT NULL,
                source_tag TEXT NOT NULL,
                created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
                updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
            )
            "#,
        ),
        Migration::new(
            3,
            "Unique article url",
            "CREATE UNIQUE INDEX IF NOT EXISTS idx_articles_url ON articles (url)",
        ),
        Migration::new(
            4,
            "Index articles by publication time",
            "CREATE INDEX IF NOT EXISTS idx_articles_published_at ON articles (published_at DESC)",
        ),
        Migration::new(
            5,
            "Index articles by update time",
            "CREATE INDEX IF NOT EXISTS idx_articles_updated_at ON articles (updated_at DESC)",
        ),
        Migration::new(
            6,
            "Index articles by category",
            "CREATE INDEX IF NOT EXISTS idx_articles_category ON articles (category)",
        ),
        Migration::new(
            7,
            "Trigram index on article titles",
            "CREATE INDEX IF NOT EXISTS idx_articles_title_trgm ON articles USING GIN (title gin_trgm_ops)",
        ),
    ]
}

/// Runs all pending article store migrations
pub async fn run_article_migrations(pool: &PgPool) -> Result<usize, DomainError> {
    PostgresMigrator::new(pool.clone())
        .run_all(&article_migrations())
        .await
}
