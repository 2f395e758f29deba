//! Ingest command - one pass over the selected providers

use std::sync::Arc;

use clap::{Args, ValueEnum};
use tracing::{info, warn};

use super::api::{init_observability, load_config};
use crate::domain::{NewsProvider, SourceTag};
use crate::infrastructure::observability::shutdown_tracing;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ProviderSelection {
    NewsApi,
    Guardian,
    #[default]
    All,
}

impl ProviderSelection {
    pub fn includes(&self, source: SourceTag) -> bool {
        match self {
            ProviderSelection::All => true,
            ProviderSelection::NewsApi => source == SourceTag::NewsApi,
            ProviderSelection::Guardian => source == SourceTag::Guardian,
        }
    }
}

#[derive(Debug, Args)]
pub struct IngestArgs {
    /// Which provider to pull from
    #[arg(long, value_enum, default_value_t = ProviderSelection::All)]
    pub provider: ProviderSelection,
}

/// Exits with an error if any selected provider failed
pub async fn run(args: IngestArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    init_observability(&config);

    let components = crate::create_app_state_with_config(&config).await?;
    let providers: Vec<Arc<dyn NewsProvider>> = components
        .provider_handles()
        .into_iter()
        .filter(|p| args.provider.includes(p.source()))
        .collect();

    if providers.is_empty() {
        warn!(selection = ?args.provider, "No enabled provider matches the selection");
    }

    let results = components.ingestion.run_all(&providers).await;
    let failed: Vec<&str> = results
        .iter()
        .filter(|(_, result)| result.is_err())
        .map(|(slug, _)| *slug)
        .collect();

    shutdown_tracing();

    if failed.is_empty() {
        info!(providers = results.len(), "Ingestion pass complete");
        Ok(())
    } else {
        anyhow::bail!("ingestion failed for: {}", failed.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_includes() {
        assert!(ProviderSelection::All.includes(SourceTag::Guardian));
        assert!(ProviderSelection::NewsApi.includes(SourceTag::NewsApi));
        assert!(!ProviderSelection::NewsApi.includes(SourceTag::Guardian));
        assert!(!ProviderSelection::Guardian.includes(SourceTag::NewsApi));
    }
}
