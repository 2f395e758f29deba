//! In-memory article repository implementation

use std::cmp::Reverse;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use crate::domain::article::dedup::is_near_duplicate;
use crate::domain::article::{Article, ArticleRepository, InsertOutcome, NewArticle};
use crate::domain::query::{paginate, ArticleQuery, Page, PageRequest};
use crate::domain::DomainError;

#[derive(Debug, Default)]
struct State {
    articles: Vec<Article>,
    next_id: i64,
}

impl State {
    fn has_near_duplicate(&self, candidate: &NewArticle) -> bool {
        self.articles
            .iter()
            .any(|a| is_near_duplicate(a.title(), a.published_at(), candidate))
    }

    fn insert(&mut self, article: NewArticle) -> Result<Article, DomainError> {
        if self.articles.iter().any(|a| a.url() == article.url) {
            return Err(DomainError::conflict(format!(
                "Article with url '{}' already exists",
                article.url
            )));
        }

        self.next_id += 1;
        let now = Utc::now();
        let stored = Article::restore(self.next_id, article, now, now);
        self.articles.push(stored.clone());

        Ok(stored)
    }
}

/// In-memory implementation of ArticleRepository
///
/// The write lock spans the duplicate check and the insert, which makes
/// `insert_unless_duplicate` atomic.
#[derive(Debug, Default)]
pub struct InMemoryArticleRepository {
    state: Arc<RwLock<State>>,
}

impl InMemoryArticleRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

fn page_of(items: &[Article], page: PageRequest) -> Page<Article> {
    Page::new(paginate(items, page).to_vec(), items.len() as i64)
}

#[async_trait]
impl ArticleRepository for InMemoryArticleRepository {
    async fn insert(&self, article: NewArticle) -> Result<Article, DomainError> {
        self.state.write().await.insert(article)
    }

    async fn exists_near_duplicate(&self, candidate: &NewArticle) -> Result<bool, DomainError> {
        Ok(self.state.read().await.has_near_duplicate(candidate))
    }

    async fn insert_unless_duplicate(
        &self,
        article: NewArticle,
    ) -> Result<InsertOutcome, DomainError> {
        let mut state = self.state.write().await;

        if state.has_near_duplicate(&article) {
            return Ok(InsertOutcome::Duplicate);
        }

        state.insert(article).map(InsertOutcome::Inserted)
    }

    async fn list_paginated(&self, page: PageRequest) -> Result<Page<Article>, DomainError> {
        let mut items = self.state.read().await.articles.clone();
        items.sort_by_key(|a| Reverse((a.updated_at(), a.id())));

        Ok(page_of(&items, page))
    }

    async fn list_filtered(
        &self,
        query: &ArticleQuery,
        page: PageRequest,
    ) -> Result<Page<Article>, DomainError> {
        let mut items: Vec<Article> = self
            .state
            .read()
            .await
            .articles
            .iter()
            .filter(|a| query.matches(a))
            .cloned()
            .collect();
        items.sort_by_key(|a| Reverse((a.published_at(), a.id())));

        Ok(page_of(&items, page))
    }

    async fn list_since(
        &self,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<Article>, DomainError> {
        let mut items: Vec<Article> = self
            .state
            .read()
            .await
            .articles
            .iter()
            .filter(|a| a.published_at() >= published_after)
            .cloned()
            .collect();
        items.sort_by_key(|a| Reverse((a.published_at(), a.id())));

        Ok(items)
    }

    async fn count(&self) -> Result<i64, DomainError> {
        Ok(self.state.read().await.articles.len() as i64)
    }
}
