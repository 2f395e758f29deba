//! Serve command - HTTP API plus the periodic ingestion scheduler

use tracing::info;

use super::api::{init_observability, load_config, serve_http};
use crate::infrastructure::observability::shutdown_tracing;
use crate::infrastructure::scheduler::IngestionScheduler;

pub async fn run() -> anyhow::Result<()> {
    let config = load_config()?;
    init_observability(&config);

    let components = crate::create_app_state_with_config(&config).await?;

    let scheduler = IngestionScheduler::new(components.ingestion, components.providers)
        .with_run_on_startup(config.ingestion.run_on_startup)
        .start();
    info!(tasks = scheduler.task_count(), "Ingestion scheduler running");

    let served = serve_http(&config, components.state).await;

    scheduler.shutdown().await;
    shutdown_tracing();
    info!("Server shutdown complete");

    served
}
