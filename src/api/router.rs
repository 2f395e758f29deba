use axum::{middleware, routing::get, Router};
use tower_http::trace::TraceLayer;

use super::health;
use super::middleware::{logging_middleware, metrics_middleware};
use super::news;
use super::state::AppState;
use crate::infrastructure::observability::{create_metrics_router, PrometheusMetrics};

/// Prefix of every news endpoint
pub const API_PREFIX: &str = "/api/v1/news-aggregator";

/// Build the full router. `/metrics` is mounted only when a recorder is given.
pub fn create_router(state: AppState, metrics: Option<PrometheusMetrics>) -> Router {
    let mut router = Router::new()
        .route("/health", get(health::health_check))
        .route("/ready", get(health::ready_check))
        .route("/live", get(health::live_check))
        .nest(API_PREFIX, news::create_news_router())
        .with_state(state)
        .layer(middleware::from_fn(logging_middleware))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http());

    if let Some(m) = metrics {
        router = router.merge(create_metrics_router(m));
    }

    router
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use chrono::{Duration as ChronoDuration, Utc};
    use http_body_util::BodyExt;
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::api::middleware::SpecialKey;
    use crate::domain::article::{MockArticleRepository, NewArticle, SourceTag};
    use crate::domain::cache::MockCache;
    use crate::infrastructure::services::{
        NewsQueryService, RecentNewsCache, RecentNewsCacheConfig,
    };

    const KEY: &str = "s3cret";

    fn article(n: i64, title: &str, category: &str) -> NewArticle {
        NewArticle {
            author: "Desk".to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", n),
            image_url: String::new(),
            published_at: Utc::now() - ChronoDuration::minutes(n * 10),
            category: category.to_string(),
            source_tag: SourceTag::NewsApi,
        }
    }

    async fn seeded_repo() -> Arc<MockArticleRepository> {
        Arc::new(
            MockArticleRepository::new()
                .with_articles(vec![
                    article(1, "AI chip shortage eases", "tech"),
                    article(2, "Derby ends in draw", "sports"),
                    article(3, "Heatwave warning issued", "weather"),
                ])
                .await,
        )
    }

    fn app(repo: Arc<MockArticleRepository>, cache: Arc<MockCache>, key: &str) -> Router {
        let news = NewsQueryService::new(
            repo,
            RecentNewsCache::new(cache, RecentNewsCacheConfig::default()),
            Duration::from_secs(1),
        );
        create_router(AppState::new(news, SpecialKey::new(key)), None)
    }

    async fn get(app: Router, uri: &str, key: Option<&str>) -> (StatusCode, Value) {
        let mut builder = Request::builder().uri(uri);
        if let Some(key) = key {
            builder = builder.header("Special-Key", key);
        }

        let response = app.oneshot(builder.body(Body::empty()).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, body)
    }

    #[tokio::test]
    async fn test_probes() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        let (status, body) = get(app.clone(), "/health", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");

        let (status, _) = get(app.clone(), "/live", None).await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get(app, "/ready", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["checks"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_ready_reports_unreachable_store() {
        let repo = seeded_repo().await;
        repo.set_should_fail(true);

        let (status, body) = get(app(repo, Arc::new(MockCache::new()), KEY), "/ready", None).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["status"], "unhealthy");
    }

    #[tokio::test]
    async fn test_news_requires_pagination() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        for uri in [
            "/api/v1/news-aggregator/news",
            "/api/v1/news-aggregator/news?page=1",
            "/api/v1/news-aggregator/news?page=0&pageSize=10",
            "/api/v1/news-aggregator/news?page=1&pageSize=ten",
        ] {
            let (status, body) = get(app.clone(), uri, None).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"]["message"], "Invalid page or pageSize");
        }
    }

    #[tokio::test]
    async fn test_news_page_shape() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        let (status, body) = get(app, "/api/v1/news-aggregator/news?page=2&pageSize=2", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 2);
        assert_eq!(body["pageSize"], 2);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["isFirstPage"], false);
        assert_eq!(body["isLastPage"], true);
        assert_eq!(body["content"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_filtered_rejects_bad_key() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        for key in [None, Some("wrong"), Some("")] {
            let (status, body) = get(app.clone(), "/api/v1/news-aggregator/news/filtered", key).await;
            assert_eq!(status, StatusCode::UNAUTHORIZED);
            assert_eq!(body["error"]["message"], "Invalid Special Key");
        }
    }

    #[tokio::test]
    async fn test_empty_configured_key_rejects_everything() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), "");

        let (status, _) = get(app, "/api/v1/news-aggregator/news/recent", Some("")).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_filtered_applies_filters_and_defaults() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        let (status, body) = get(
            app,
            "/api/v1/news-aggregator/news/filtered?categories=tech,sports&keyword=DERBY",
            Some(KEY),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["pageSize"], 10);
        assert_eq!(body["total"], 1);
        assert_eq!(body["specialKeyUsed"], true);
        assert_eq!(body["newsContent"][0]["title"], "Derby ends in draw");
    }

    #[tokio::test]
    async fn test_filtered_rejects_bad_published_after() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        let (status, _) = get(
            app,
            "/api/v1/news-aggregator/news/filtered?publishedAfter=yesterday",
            Some(KEY),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_recent_miss_then_hit() {
        let repo = seeded_repo().await;
        let app = app(repo.clone(), Arc::new(MockCache::new()), KEY);
        let uri = "/api/v1/news-aggregator/news/recent?categories=weather";

        let (status, miss) = get(app.clone(), uri, Some(KEY)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(miss["source"], "Database");
        assert_eq!(miss["newsContent"].as_array().unwrap().len(), 3);
        assert!(miss.get("page").is_none());

        let (_, hit) = get(app, uri, Some(KEY)).await;
        assert_eq!(hit["source"], "Cache");
        assert_eq!(hit["newsContent"].as_array().unwrap().len(), 1);
        assert_eq!(repo.list_since_calls(), 1);
    }

    #[tokio::test]
    async fn test_recent_paginated_shape() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        let (status, body) = get(
            app,
            "/api/v1/news-aggregator/news/recent?page=1&pageSize=2",
            Some(KEY),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["page"], 1);
        assert_eq!(body["totalPages"], 2);
        assert_eq!(body["isFirstPage"], true);
        assert_eq!(body["isLastPage"], false);
        assert_eq!(body["newsContent"].as_array().unwrap().len(), 2);
        assert_eq!(body["specialKeyUsed"], true);
    }

    #[tokio::test]
    async fn test_recent_rejects_invalid_page() {
        let app = app(seeded_repo().await, Arc::new(MockCache::new()), KEY);

        let (status, body) = get(
            app,
            "/api/v1/news-aggregator/news/recent?page=0&pageSize=2",
            Some(KEY),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["message"], "Invalid page or pageSize");
    }

    #[tokio::test]
    async fn test_store_failure_is_generic_500() {
        let repo = seeded_repo().await;
        repo.set_should_fail(true);
        let app = app(repo, Arc::new(MockCache::new()), KEY);

        let (status, body) = get(app, "/api/v1/news-aggregator/news/recent", Some(KEY)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal Server Error");
    }

    #[tokio::test]
    async fn test_corrupt_cache_entry_is_generic_500() {
        let cache = Arc::new(MockCache::new().with_raw_entry("recentNews", "not json", None));
        let app = app(seeded_repo().await, cache, KEY);

        let (status, body) = get(app, "/api/v1/news-aggregator/news/recent", Some(KEY)).await;

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"]["message"], "Internal Server Error");
    }
}
