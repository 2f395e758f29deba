//! Article repository trait

use std::fmt::Debug;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::entity::{Article, NewArticle};
use crate::domain::query::{ArticleQuery, Page, PageRequest};
use crate::domain::DomainError;

/// Result of a deduplicating insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The candidate was new and has been stored
    Inserted(Article),
    /// A near-duplicate already exists; nothing was written
    Duplicate,
}

impl InsertOutcome {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, InsertOutcome::Duplicate)
    }
}

/// Durable, create-only article store
#[async_trait]
pub trait ArticleRepository: Send + Sync + Debug {
    /// Insert an article unconditionally. Fails on constraint violations.
    async fn insert(&self, article: NewArticle) -> Result<Article, DomainError>;

    /// Whether a stored article has an equal or near-equal title (edit
    /// distance <= 4) and was published within 24 hours of the candidate
    async fn exists_near_duplicate(&self, candidate: &NewArticle) -> Result<bool, DomainError>;

    /// Check for a near-duplicate and insert as one atomic step.
    ///
    /// Concurrent callers never both insert near-duplicates of each other.
    async fn insert_unless_duplicate(
        &self,
        article: NewArticle,
    ) -> Result<InsertOutcome, DomainError>;

    /// All articles, newest `updated_at` first
    async fn list_paginated(&self, page: PageRequest) -> Result<Page<Article>, DomainError>;

    /// Articles matching `query`, newest `published_at` first
    async fn list_filtered(
        &self,
        query: &ArticleQuery,
        page: PageRequest,
    ) -> Result<Page<Article>, DomainError>;

    /// Every article with `published_at >= published_after`, newest first
    async fn list_since(
        &self,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<Article>, DomainError>;

    /// Total number of stored articles
    async fn count(&self) -> Result<i64, DomainError>;
}
