//! Prometheus metrics infrastructure

use std::sync::Arc;
use std::time::Duration;

use axum::{extract::State, response::IntoResponse, routing::get, Router};
use metrics::{counter, gauge, histogram};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use super::config::MetricsConfig;

/// Prometheus metrics handle for serving metrics endpoint
#[derive(Clone)]
pub struct PrometheusMetrics {
    handle: Arc<PrometheusHandle>,
    path: String,
}

impl std::fmt::Debug for PrometheusMetrics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PrometheusMetrics")
            .field("path", &self.path)
            .finish()
    }
}

impl PrometheusMetrics {
    /// Get the metrics as a string for the /metrics endpoint
    pub fn render(&self) -> String {
        self.handle.render()
    }
}

/// Install the global Prometheus recorder. Returns `None` when disabled or
/// when a recorder is already installed.
pub fn init_metrics(config: &MetricsConfig) -> Option<PrometheusMetrics> {
    if !config.enabled {
        tracing::info!("Prometheus metrics disabled");
        return None;
    }

    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            gauge!("news_aggregator_info", "version" => env!("CARGO_PKG_VERSION")).set(1.0);

            tracing::info!(path = %config.path, "Prometheus metrics initialized");

            Some(PrometheusMetrics {
                handle: Arc::new(handle),
                path: config.path.clone(),
            })
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialize Prometheus metrics");
            None
        }
    }
}

/// Create the metrics router
pub fn create_metrics_router(metrics: PrometheusMetrics) -> Router {
    let path = metrics.path.clone();

    Router::new()
        .route(&path, get(metrics_handler))
        .with_state(metrics)
}

async fn metrics_handler(State(metrics): State<PrometheusMetrics>) -> impl IntoResponse {
    metrics.render()
}

/// Record an HTTP request metric. `path` must be the matched route, not the raw URI.
pub fn record_http_request(method: &str, path: &str, status: u16, duration: Duration) {
    let labels = [
        ("method", method.to_string()),
        ("path", path.to_string()),
        ("status", status.to_string()),
    ];

    counter!("http_requests_total", &labels).increment(1);
    histogram!("http_request_duration_seconds", &labels).record(duration.as_secs_f64());
}

/// Record the outcome of one provider ingestion tick
pub fn record_ingestion_run(provider: &'static str, success: bool) {
    let status = if success { "success" } else { "error" };
    counter!("news_ingestion_runs_total", "provider" => provider, "status" => status).increment(1);
}

/// Outcome of admitting one fetched article
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IngestOutcome {
    Inserted,
    Duplicate,
    Failed,
}

impl IngestOutcome {
    fn as_str(&self) -> &'static str {
        match self {
            IngestOutcome::Inserted => "inserted",
            IngestOutcome::Duplicate => "duplicate",
            IngestOutcome::Failed => "failed",
        }
    }
}

pub fn record_ingested_articles(provider: &'static str, outcome: IngestOutcome, count: u64) {
    if count == 0 {
        return;
    }

    counter!(
        "news_ingested_articles_total",
        "provider" => provider,
        "outcome" => outcome.as_str()
    )
    .increment(count);
}

/// Record a recent-news cache lookup
pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    counter!("news_recent_cache_lookups_total", "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ingest_outcome_labels() {
        assert_eq!(IngestOutcome::Inserted.as_str(), "inserted");
        assert_eq!(IngestOutcome::Duplicate.as_str(), "duplicate");
        assert_eq!(IngestOutcome::Failed.as_str(), "failed");
    }

    #[test]
    fn test_recording_without_recorder_is_noop() {
        record_http_request("GET", "/api/v1/news-aggregator/news", 200, Duration::from_millis(3));
        record_ingestion_run("guardian", true);
        record_ingested_articles("guardian", IngestOutcome::Inserted, 2);
        record_cache_lookup(false);
    }
}
