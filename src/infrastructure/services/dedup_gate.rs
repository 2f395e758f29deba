//! Deduplication gate in front of the article store

use std::sync::Arc;
use std::time::Duration;

use crate::domain::article::{ArticleRepository, InsertOutcome, NewArticle};
use crate::domain::DomainError;
use crate::infrastructure::timeout::with_timeout;

/// Decides whether a candidate article is a near-duplicate of a stored one
#[derive(Debug, Clone)]
pub struct DedupGate {
    repository: Arc<dyn ArticleRepository>,
    store_timeout: Duration,
}

impl DedupGate {
    pub fn new(repository: Arc<dyn ArticleRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Whether a near-duplicate of `candidate` is already stored.
    ///
    /// Advisory only: another writer may insert between this check and a
    /// later insert. Use [`DedupGate::admit`] to decide and write atomically.
    pub async fn exists(&self, candidate: &NewArticle) -> Result<bool, DomainError> {
        with_timeout(
            "store.exists_near_duplicate",
            self.store_timeout,
            self.repository.exists_near_duplicate(candidate),
        )
        .await
    }

    /// Store `candidate` unless a near-duplicate exists. The first admitted
    /// version of a story wins; nothing is merged or updated.
    pub async fn admit(&self, candidate: NewArticle) -> Result<InsertOutcome, DomainError> {
        with_timeout(
            "store.insert_unless_duplicate",
            self.store_timeout,
            self.repository.insert_unless_duplicate(candidate),
        )
        .await
    }
}
