//! Liveness and readiness probes

use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

use super::state::AppState;
use crate::domain::DomainError;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub checks: Option<Vec<HealthCheck>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Status of one backing service
#[derive(Debug, Serialize)]
pub struct HealthCheck {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
}

impl HealthCheck {
    fn from_result<T>(name: &str, started: Instant, result: Result<T, DomainError>, failed: HealthStatus) -> Self {
        let latency_ms = Some(started.elapsed().as_millis() as u64);

        match result {
            Ok(_) => Self {
                name: name.to_string(),
                status: HealthStatus::Healthy,
                message: None,
                latency_ms,
            },
            Err(e) => Self {
                name: name.to_string(),
                status: failed,
                message: Some(e.to_string()),
                latency_ms,
            },
        }
    }
}

/// Static health response, no dependency checks
pub async fn health_check() -> impl IntoResponse {
    let response = HealthResponse {
        status: HealthStatus::Healthy,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: None,
        latency_ms: None,
    };

    (StatusCode::OK, Json(response))
}

pub async fn live_check() -> impl IntoResponse {
    StatusCode::OK
}

/// Checks the store and the cache.
///
/// An unreachable store makes the service unready (503). An unreachable cache
/// only degrades it: `/news` and `/news/filtered` still work.
pub async fn ready_check(State(state): State<AppState>) -> impl IntoResponse {
    let start = Instant::now();

    let store_started = Instant::now();
    let store = HealthCheck::from_result(
        "store",
        store_started,
        state.news.check_store().await,
        HealthStatus::Unhealthy,
    );

    let cache_started = Instant::now();
    let cache = HealthCheck::from_result(
        "cache",
        cache_started,
        state.news.check_cache().await,
        HealthStatus::Degraded,
    );

    let checks = vec![store, cache];
    let status = overall_status(&checks);

    let response = HealthResponse {
        status,
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: Some(checks),
        latency_ms: Some(start.elapsed().as_millis() as u64),
    };

    let status_code = match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };

    (status_code, Json(response))
}

/// The worst status among the checks
fn overall_status(checks: &[HealthCheck]) -> HealthStatus {
    if checks.iter().any(|c| c.status == HealthStatus::Unhealthy) {
        HealthStatus::Unhealthy
    } else if checks.iter().any(|c| c.status == HealthStatus::Degraded) {
        HealthStatus::Degraded
    } else {
        HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn check(status: HealthStatus) -> HealthCheck {
        HealthCheck {
            name: "x".to_string(),
            status,
            message: None,
            latency_ms: None,
        }
    }

    #[test]
    fn test_overall_status_takes_worst() {
        assert_eq!(
            overall_status(&[check(HealthStatus::Healthy), check(HealthStatus::Healthy)]),
            HealthStatus::Healthy
        );
        assert_eq!(
            overall_status(&[check(HealthStatus::Healthy), check(HealthStatus::Degraded)]),
            HealthStatus::Degraded
        );
        assert_eq!(
            overall_status(&[check(HealthStatus::Degraded), check(HealthStatus::Unhealthy)]),
            HealthStatus::Unhealthy
        );
    }

    #[test]
    fn test_health_response_serialization() {
        let response = HealthResponse {
            status: HealthStatus::Degraded,
            version: "1.0.0".to_string(),
            checks: Some(vec![HealthCheck {
                name: "cache".to_string(),
                status: HealthStatus::Degraded,
                message: Some("Connection refused".to_string()),
                latency_ms: Some(3),
            }]),
            latency_ms: Some(4),
        };

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["status"], "degraded");
        assert_eq!(json["checks"][0]["name"], "cache");
        assert_eq!(json["checks"][0]["message"], "Connection refused");
    }
}
