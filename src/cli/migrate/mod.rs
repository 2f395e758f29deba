//! Migrate command - apply the article schema and exit

use tracing::info;

use super::api::{init_observability, load_config};
use crate::infrastructure::article::run_article_migrations;
use crate::infrastructure::observability::shutdown_tracing;

pub async fn run() -> anyhow::Result<()> {
    let config = load_config()?;
    init_observability(&config);

    let postgres = crate::postgres_config(&config)
        .ok_or_else(|| anyhow::anyhow!("database.url or DATABASE_URL is required to migrate"))?;

    let pool = postgres.connect().await?;
    let applied = run_article_migrations(&pool).await?;
    info!(applied, "Migrations complete");

    pool.close().await;
    shutdown_tracing();

    Ok(())
}
