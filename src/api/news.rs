//! News read endpoints

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::api::middleware::RequireSpecialKey;
use crate::api::state::AppState;
use crate::api::types::{ApiError, Query};
use crate::domain::query::{paginate, ArticleFilter, ArticleQuery, PageInfo, PageRequest};
use crate::domain::Article;
use crate::infrastructure::services::RecentSource;

const INVALID_PAGINATION: &str = "Invalid page or pageSize";
const DEFAULT_PAGE: i64 = 1;
const DEFAULT_PAGE_SIZE: i64 = 10;

pub fn create_news_router() -> Router<AppState> {
    Router::new()
        .route("/news", get(list_news))
        .route("/news/filtered", get(filtered_news))
        .route("/news/recent", get(recent_news))
}

/// Raw query values. Numbers stay strings so bad input gets the endpoint's own message.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsParams {
    pub page: Option<String>,
    pub page_size: Option<String>,
    pub categories: Option<String>,
    pub keyword: Option<String>,
    pub published_after: Option<String>,
}

impl NewsParams {
    fn filter(&self) -> ArticleFilter {
        ArticleFilter::from_params(self.categories.as_deref(), self.keyword.as_deref())
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsPageResponse {
    #[serde(flatten)]
    pub page_info: PageInfo,
    pub content: Vec<Article>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilteredNewsResponse {
    pub page: u32,
    pub page_size: u32,
    pub total: i64,
    pub total_pages: i64,
    pub is_first_page: bool,
    pub is_last_page: bool,
    pub news_content: Vec<Article>,
    pub special_key_used: bool,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum RecentNewsResponse {
    Paginated {
        #[serde(flatten)]
        page_info: PageInfo,
        #[serde(rename = "newsContent")]
        news_content: Vec<Article>,
        source: &'static str,
        #[serde(rename = "specialKeyUsed")]
        special_key_used: bool,
    },
    Full {
        #[serde(rename = "newsContent")]
        news_content: Vec<Article>,
        source: &'static str,
        #[serde(rename = "specialKeyUsed")]
        special_key_used: bool,
    },
}

/// Parse an optional page parameter. Present values must be integers >= 1.
fn parse_page_param(raw: Option<&str>) -> Result<Option<i64>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => value
            .trim()
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 1)
            .map(Some)
            .ok_or_else(|| ApiError::bad_request(INVALID_PAGINATION)),
    }
}

fn page_request(page: i64, page_size: i64) -> Result<PageRequest, ApiError> {
    PageRequest::new(page, page_size).map_err(|_| ApiError::bad_request(INVALID_PAGINATION))
}

fn parse_published_after(raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    match raw.filter(|v| !v.is_empty()) {
        None => Ok(None),
        Some(value) => DateTime::parse_from_rfc3339(value)
            .map(|dt| Some(dt.with_timezone(&Utc)))
            .map_err(|_| ApiError::bad_request("Invalid publishedAfter, expected RFC 3339")),
    }
}

/// `GET /news`: every article, paginated. Both parameters are required.
pub async fn list_news(
    State(state): State<AppState>,
    Query(params): Query<NewsParams>,
) -> Result<Json<NewsPageResponse>, ApiError> {
    let page = parse_page_param(params.page.as_deref())?;
    let page_size = parse_page_param(params.page_size.as_deref())?;

    let (Some(page), Some(page_size)) = (page, page_size) else {
        return Err(ApiError::bad_request(INVALID_PAGINATION));
    };
    let request = page_request(page, page_size)?;

    let result = state.news.list_all(request).await?;

    Ok(Json(NewsPageResponse {
        page_info: PageInfo::new(request, result.total),
        content: result.items,
    }))
}

/// `GET /news/filtered`: store-backed filter with pagination defaults of 1/10
pub async fn filtered_news(
    State(state): State<AppState>,
    _key: RequireSpecialKey,
    Query(params): Query<NewsParams>,
) -> Result<Json<FilteredNewsResponse>, ApiError> {
    let page = parse_page_param(params.page.as_deref())?.unwrap_or(DEFAULT_PAGE);
    let page_size = parse_page_param(params.page_size.as_deref())?.unwrap_or(DEFAULT_PAGE_SIZE);
    let request = page_request(page, page_size)?;

    let query = ArticleQuery::new(
        params.filter(),
        parse_published_after(params.published_after.as_deref())?,
    );

    let result = state.news.list_filtered(&query, request).await?;
    let info = PageInfo::new(request, result.total);

    Ok(Json(FilteredNewsResponse {
        page: info.page,
        page_size: info.page_size,
        total: result.total,
        total_pages: info.total_pages,
        is_first_page: info.is_first_page,
        is_last_page: info.is_last_page,
        news_content: result.items,
        special_key_used: true,
    }))
}

/// `GET /news/recent`: the cache-aside recent window.
///
/// Paginated only when both `page` and `pageSize` are given.
pub async fn recent_news(
    State(state): State<AppState>,
    _key: RequireSpecialKey,
    Query(params): Query<NewsParams>,
) -> Result<Json<RecentNewsResponse>, ApiError> {
    let page = parse_page_param(params.page.as_deref())?;
    let page_size = parse_page_param(params.page_size.as_deref())?;

    let recent = state.news.recent(&params.filter()).await?;
    let source = recent.source.as_str();

    debug!(count = recent.articles.len(), source, "Serving recent news");

    let response = match (page, page_size) {
        (Some(page), Some(page_size)) => {
            let request = page_request(page, page_size)?;
            let total = recent.articles.len() as i64;
            let news_content = paginate(&recent.articles, request).to_vec();
            let source = if news_content.is_empty() {
                RecentSource::Database.as_str()
            } else {
                source
            };

            RecentNewsResponse::Paginated {
                page_info: PageInfo::new(request, total),
                news_content,
                source,
                special_key_used: true,
            }
        }
        _ => RecentNewsResponse::Full {
            news_content: recent.articles,
            source,
            special_key_used: true,
        },
    };

    Ok(Json(response))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_parse_page_param() {
        assert_eq!(parse_page_param(None).unwrap(), None);
        assert_eq!(parse_page_param(Some("3")).unwrap(), Some(3));

        for bad in ["0", "-1", "abc", "", "1.5"] {
            let err = parse_page_param(Some(bad)).unwrap_err();
            assert_eq!(err.status, StatusCode::BAD_REQUEST);
            assert_eq!(err.message(), "Invalid page or pageSize");
        }
    }

    #[test]
    fn test_parse_published_after() {
        let parsed = parse_published_after(Some("2024-05-01T10:00:00+02:00"))
            .unwrap()
            .unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-05-01T08:00:00+00:00");

        assert_eq!(parse_published_after(None).unwrap(), None);
        assert_eq!(parse_published_after(Some("")).unwrap(), None);
        assert!(parse_published_after(Some("2024-05-01")).is_err());
    }

    #[test]
    fn test_recent_full_shape() {
        let body = serde_json::to_value(RecentNewsResponse::Full {
            news_content: vec![],
            source: "Database",
            special_key_used: true,
        })
        .unwrap();

        let keys: Vec<&str> = body.as_object().unwrap().keys().map(|k| k.as_str()).collect();
        assert_eq!(keys.len(), 3);
        assert_eq!(body["source"], "Database");
        assert_eq!(body["specialKeyUsed"], true);
        assert!(body["newsContent"].is_array());
    }
}
