//! Read side: store-backed listings and the cache-aside recent-news path

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, warn};

use super::recent_news_cache::RecentNewsCache;
use crate::domain::article::{Article, ArticleRepository};
use crate::domain::query::{filter_articles, ArticleFilter, ArticleQuery, Page, PageRequest};
use crate::domain::DomainError;
use crate::infrastructure::observability::record_cache_lookup;
use crate::infrastructure::timeout::with_timeout;

/// Where a recent-news result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum RecentSource {
    Cache,
    Database,
}

impl RecentSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecentSource::Cache => "Cache",
            RecentSource::Database => "Database",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecentNews {
    pub articles: Vec<Article>,
    pub source: RecentSource,
}

#[derive(Debug, Clone)]
pub struct NewsQueryService {
    repository: Arc<dyn ArticleRepository>,
    recent_cache: RecentNewsCache,
    store_timeout: Duration,
}

impl NewsQueryService {
    pub fn new(
        repository: Arc<dyn ArticleRepository>,
        recent_cache: RecentNewsCache,
        store_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            recent_cache,
            store_timeout,
        }
    }

    /// Every article, most recently updated first
    pub async fn list_all(&self, page: PageRequest) -> Result<Page<Article>, DomainError> {
        with_timeout(
            "store.list_paginated",
            self.store_timeout,
            self.repository.list_paginated(page),
        )
        .await
    }

    /// Articles matching `query`, most recently published first
    pub async fn list_filtered(
        &self,
        query: &ArticleQuery,
        page: PageRequest,
    ) -> Result<Page<Article>, DomainError> {
        with_timeout(
            "store.list_filtered",
            self.store_timeout,
            self.repository.list_filtered(query, page),
        )
        .await
    }

    /// Articles from the recent window.
    ///
    /// On a cache hit `filter` is applied to the cached list and the store is
    /// not consulted. On a miss the window is loaded from the store, written
    /// back to the cache, and returned without applying `filter`.
    pub async fn recent(&self, filter: &ArticleFilter) -> Result<RecentNews, DomainError> {
        if let Some(cached) = self.recent_cache.get().await? {
            record_cache_lookup(true);

            let articles = filter_articles(cached, filter);
            let source = if articles.is_empty() {
                RecentSource::Database
            } else {
                RecentSource::Cache
            };

            debug!(count = articles.len(), "Recent news served from cache");
            return Ok(RecentNews { articles, source });
        }

        record_cache_lookup(false);

        let since = self.recent_cache.window_start(Utc::now());
        let articles = with_timeout(
            "store.list_since",
            self.store_timeout,
            self.repository.list_since(since),
        )
        .await?;

        if let Err(e) = self.recent_cache.set(&articles).await {
            warn!(error = %e, "Failed to repopulate recent news cache");
        }

        debug!(count = articles.len(), %since, "Recent news loaded from store");

        Ok(RecentNews {
            articles,
            source: RecentSource::Database,
        })
    }

    /// Store and cache reachability, for readiness checks
    pub async fn check_store(&self) -> Result<i64, DomainError> {
        with_timeout("store.count", self.store_timeout, self.repository.count()).await
    }

    pub async fn check_cache(&self) -> Result<(), DomainError> {
        self.recent_cache.ping().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::{MockArticleRepository, NewArticle, SourceTag};
    use crate::domain::cache::MockCache;
    use crate::infrastructure::services::{CorruptEntryPolicy, RecentNewsCacheConfig};
    use chrono::{DateTime, Duration as ChronoDuration};

    fn new_article(title: &str, category: &str, published_at: DateTime<Utc>) -> NewArticle {
        NewArticle {
            author: String::new(),
            title: title.to_string(),
            url: format!("https://example.com/{}", title.replace(' ', "-")),
            image_url: String::new(),
            published_at,
            category: category.to_string(),
            source_tag: SourceTag::NewsApi,
        }
    }

    /// Three recent articles plus one outside the 12h window
    async fn seeded_repo() -> Arc<MockArticleRepository> {
        let now = Utc::now();
        Arc::new(
            MockArticleRepository::new()
                .with_articles(vec![
                    new_article("AI model tops benchmark", "tech", now - ChronoDuration::hours(1)),
                    new_article("Cup final tonight", "sports", now - ChronoDuration::hours(2)),
                    new_article("Rain through the weekend", "weather", now - ChronoDuration::hours(3)),
                    new_article("Last week's news", "world", now - ChronoDuration::days(3)),
                ])
                .await,
        )
    }

    fn service(repo: Arc<MockArticleRepository>, cache: Arc<MockCache>) -> NewsQueryService {
        service_with(repo, cache, RecentNewsCacheConfig::default())
    }

    fn service_with(
        repo: Arc<MockArticleRepository>,
        cache: Arc<MockCache>,
        config: RecentNewsCacheConfig,
    ) -> NewsQueryService {
        NewsQueryService::new(
            repo,
            RecentNewsCache::new(cache, config),
            Duration::from_secs(1),
        )
    }

    fn titles(articles: &[Article]) -> Vec<&str> {
        articles.iter().map(|a| a.title()).collect()
    }

    #[tokio::test]
    async fn test_miss_path_repopulates_then_hit_skips_store() {
        let repo = seeded_repo().await;
        let cache = Arc::new(MockCache::new());
        let service = service(repo.clone(), cache.clone());

        let first = service.recent(&ArticleFilter::default()).await.unwrap();
        assert_eq!(first.source, RecentSource::Database);
        assert_eq!(
            titles(&first.articles),
            vec!["AI model tops benchmark", "Cup final tonight", "Rain through the weekend"]
        );
        assert_eq!(repo.list_since_calls(), 1);

        let cached: Vec<Article> =
            serde_json::from_str(&cache.raw_entry("recentNews").unwrap()).unwrap();
        assert_eq!(cached, first.articles);

        let second = service.recent(&ArticleFilter::default()).await.unwrap();
        assert_eq!(second.source, RecentSource::Cache);
        assert_eq!(second.articles, first.articles);
        assert_eq!(repo.list_since_calls(), 1);
    }

    #[tokio::test]
    async fn test_miss_path_returns_unfiltered() {
        let repo = seeded_repo().await;
        let service = service(repo, Arc::new(MockCache::new()));
        let filter = ArticleFilter::new(vec!["sports".to_string()], None);

        let miss = service.recent(&filter).await.unwrap();
        assert_eq!(miss.articles.len(), 3);

        let hit = service.recent(&filter).await.unwrap();
        assert_eq!(titles(&hit.articles), vec!["Cup final tonight"]);
        assert_eq!(hit.source, RecentSource::Cache);
    }

    #[tokio::test]
    async fn test_empty_filtered_hit_reports_database_without_store_call() {
        let repo = seeded_repo().await;
        let service = service(repo.clone(), Arc::new(MockCache::new()));

        service.recent(&ArticleFilter::default()).await.unwrap();
        let hit = service
            .recent(&ArticleFilter::new(vec![], Some("volcano".to_string())))
            .await
            .unwrap();

        assert!(hit.articles.is_empty());
        assert_eq!(hit.source, RecentSource::Database);
        assert_eq!(repo.list_since_calls(), 1);
    }

    #[tokio::test]
    async fn test_cache_is_not_invalidated_by_new_articles() {
        let repo = seeded_repo().await;
        let service = service(repo.clone(), Arc::new(MockCache::new()));

        let before = service.recent(&ArticleFilter::default()).await.unwrap();

        repo.insert(new_article("Breaking: fresh story", "world", Utc::now()))
            .await
            .unwrap();

        let after = service.recent(&ArticleFilter::default()).await.unwrap();
        assert_eq!(after.articles, before.articles);
        assert!(!titles(&after.articles).contains(&"Breaking: fresh story"));
        assert_eq!(repo.count().await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_cache_write_failure_still_serves() {
        let repo = seeded_repo().await;
        let cache = Arc::new(MockCache::new().with_write_error("read-only replica"));
        let service = service(repo.clone(), cache);

        let result = service.recent(&ArticleFilter::default()).await.unwrap();
        assert_eq!(result.articles.len(), 3);

        service.recent(&ArticleFilter::default()).await.unwrap();
        assert_eq!(repo.list_since_calls(), 2);
    }

    #[tokio::test]
    async fn test_cache_read_failure_is_error() {
        let repo = seeded_repo().await;
        let service = service(repo.clone(), Arc::new(MockCache::new().with_error("connection refused")));

        let result = service.recent(&ArticleFilter::default()).await;
        assert!(matches!(result, Err(DomainError::Cache { .. })));
        assert_eq!(repo.list_since_calls(), 0);
    }

    #[tokio::test]
    async fn test_corrupt_entry_fails_unless_configured_as_miss() {
        let repo = seeded_repo().await;

        let strict = service(
            repo.clone(),
            Arc::new(MockCache::new().with_raw_entry("recentNews", "{", None)),
        );
        assert!(strict.recent(&ArticleFilter::default()).await.is_err());

        let lenient = service_with(
            repo.clone(),
            Arc::new(MockCache::new().with_raw_entry("recentNews", "{", None)),
            RecentNewsCacheConfig {
                corrupt_entry: CorruptEntryPolicy::Miss,
                ..Default::default()
            },
        );
        let result = lenient.recent(&ArticleFilter::default()).await.unwrap();
        assert_eq!(result.articles.len(), 3);
        assert_eq!(repo.list_since_calls(), 1);
    }

    #[tokio::test]
    async fn test_store_failure_on_miss_is_error() {
        let repo = seeded_repo().await;
        repo.set_should_fail(true);
        let service = service(repo, Arc::new(MockCache::new()));

        let result = service.recent(&ArticleFilter::default()).await;
        assert!(matches!(result, Err(DomainError::Storage { .. })));
    }

    #[tokio::test]
    async fn test_list_filtered_delegates_to_store() {
        let repo = seeded_repo().await;
        let service = service(repo.clone(), Arc::new(MockCache::new()));
        let query = ArticleQuery::new(ArticleFilter::new(vec!["world".to_string()], None), None);

        let page = service
            .list_filtered(&query, PageRequest::new(1, 10).unwrap())
            .await
            .unwrap();

        assert_eq!(page.total, 1);
        assert_eq!(repo.list_filtered_calls(), 1);
    }
}
