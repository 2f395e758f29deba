//! Provider ingestion: fetch, dedup-gate, persist

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::dedup_gate::DedupGate;
use crate::domain::article::InsertOutcome;
use crate::domain::provider::NewsProvider;
use crate::domain::DomainError;
use crate::infrastructure::observability::{
    record_ingested_articles, record_ingestion_run, IngestOutcome,
};
use crate::infrastructure::timeout::with_timeout;

/// Tally of one provider run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IngestionReport {
    pub fetched: usize,
    pub inserted: usize,
    pub duplicates: usize,
    pub failed: usize,
}

#[derive(Debug, Clone)]
pub struct IngestionService {
    gate: DedupGate,
    provider_timeout: Duration,
}

impl IngestionService {
    pub fn new(gate: DedupGate, provider_timeout: Duration) -> Self {
        Self {
            gate,
            provider_timeout,
        }
    }

    /// Fetch everything `provider` currently offers and admit each article
    /// through the dedup gate.
    ///
    /// A failed fetch abandons the run and is returned as an error. Per-article
    /// store failures are counted in the report and do not stop the run.
    pub async fn run(&self, provider: &dyn NewsProvider) -> Result<IngestionReport, DomainError> {
        let slug = provider.source().slug();

        let fetched = match with_timeout(
            "provider.fetch",
            self.provider_timeout,
            provider.fetch(),
        )
        .await
        {
            Ok(articles) => articles,
            Err(e) => {
                error!(provider = slug, error = %e, "Provider fetch failed, skipping this tick");
                record_ingestion_run(slug, false);
                return Err(e);
            }
        };

        let mut report = IngestionReport {
            fetched: fetched.len(),
            ..Default::default()
        };

        for article in fetched {
            let url = article.url.clone();

            match self.gate.admit(article).await {
                Ok(InsertOutcome::Inserted(stored)) => {
                    debug!(provider = slug, id = stored.id(), "Article stored");
                    report.inserted += 1;
                }
                Ok(InsertOutcome::Duplicate) => {
                    debug!(provider = slug, url = %url, "Near-duplicate rejected");
                    report.duplicates += 1;
                }
                Err(e) => {
                    warn!(provider = slug, url = %url, error = %e, "Failed to store article");
                    report.failed += 1;
                }
            }
        }

        record_ingestion_run(slug, true);
        record_ingested_articles(slug, IngestOutcome::Inserted, report.inserted as u64);
        record_ingested_articles(slug, IngestOutcome::Duplicate, report.duplicates as u64);
        record_ingested_articles(slug, IngestOutcome::Failed, report.failed as u64);

        info!(
            provider = slug,
            fetched = report.fetched,
            inserted = report.inserted,
            duplicates = report.duplicates,
            failed = report.failed,
            "Ingestion run complete"
        );

        Ok(report)
    }

    /// Run each provider once, in order. One provider failing does not stop
    /// the others.
    pub async fn run_all(
        &self,
        providers: &[Arc<dyn NewsProvider>],
    ) -> Vec<(&'static str, Result<IngestionReport, DomainError>)> {
        let mut results = Vec::with_capacity(providers.len());

        for provider in providers {
            let result = self.run(provider.as_ref()).await;
            results.push((provider.source().slug(), result));
        }

        results
    }
}
