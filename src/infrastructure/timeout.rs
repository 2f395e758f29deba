//! Deadlines for calls to external collaborators

use std::future::Future;
use std::time::Duration;

use crate::domain::DomainError;

/// Per-collaborator call deadlines
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub provider: Duration,
    pub store: Duration,
    pub cache: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            provider: Duration::from_secs(30),
            store: Duration::from_secs(5),
            cache: Duration::from_secs(2),
        }
    }
}

/// Await `future` for at most `limit`. Expiry yields `DomainError::Timeout`.
pub async fn with_timeout<T, F>(operation: &str, limit: Duration, future: F) -> Result<T, DomainError>
where
    F: Future<Output = Result<T, DomainError>>,
{
    match tokio::time::timeout(limit, future).await {
        Ok(result) => result,
        Err(_) => Err(DomainError::timeout(operation, limit)),
    }
}
