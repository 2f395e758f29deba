//! NewsAPI adapter: top headlines per configured category

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::debug;

use super::http_client::{relabel, HttpClientTrait};
use crate::domain::article::{NewArticle, SourceTag};
use crate::domain::provider::NewsProvider;
use crate::domain::DomainError;

const DEFAULT_NEWS_API_BASE_URL: &str = "https://newsapi.org";

#[derive(Debug, Clone)]
pub struct NewsApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub country: String,
    pub categories: Vec<String>,
}

impl NewsApiConfig {
    pub fn new(api_key: impl Into<String>, categories: Vec<String>) -> Self {
        Self {
            base_url: DEFAULT_NEWS_API_BASE_URL.to_string(),
            api_key: api_key.into(),
            country: "us".to_string(),
            categories,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = country.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct TopHeadlinesResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    author: Option<String>,
    title: Option<String>,
    url: String,
    url_to_image: Option<String>,
    published_at: DateTime<Utc>,
}

/// NewsAPI provider
#[derive(Debug)]
pub struct NewsApiProvider<C: HttpClientTrait> {
    client: C,
    config: NewsApiConfig,
    top_headlines_url: String,
}

impl<C: HttpClientTrait> NewsApiProvider<C> {
    pub fn new(client: C, config: NewsApiConfig) -> Self {
        let top_headlines_url = format!(
            "{}/v2/top-headlines",
            config.base_url.trim_end_matches('/')
        );

        Self {
            client,
            config,
            top_headlines_url,
        }
    }

    fn error(&self, message: impl Into<String>) -> DomainError {
        DomainError::provider(SourceTag::NewsApi.slug(), message)
    }

    async fn fetch_category(&self, category: &str) -> Result<Vec<NewArticle>, DomainError> {
        let json = self
            .client
            .get_json(
                &self.top_headlines_url,
                &[
                    ("country", self.config.country.as_str()),
                    ("category", category),
                    ("apiKey", self.config.api_key.as_str()),
                ],
            )
            .await
            .map_err(|e| relabel(e, SourceTag::NewsApi.slug()))?;

        let response: TopHeadlinesResponse = serde_json::from_value(json)
            .map_err(|e| self.error(format!("Malformed top-headlines payload: {}", e)))?;

        if response.status != "ok" {
            return Err(self.error(format!(
                "Payload status '{}' for category '{}': {}",
                response.status,
                category,
                response.message.unwrap_or_default()
            )));
        }

        debug!(category, count = response.articles.len(), "Fetched NewsAPI headlines");

        Ok(response
            .articles
            .into_iter()
            .map(|article| NewArticle {
                author: article.author.unwrap_or_default(),
                title: article.title.unwrap_or_default(),
                url: article.url,
                image_url: article.url_to_image.unwrap_or_default(),
                published_at: article.published_at,
                category: category.to_string(),
                source_tag: SourceTag::NewsApi,
            })
            .collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> NewsProvider for NewsApiProvider<C> {
    fn source(&self) -> SourceTag {
        SourceTag::NewsApi
    }

    /// Fetch every configured category in turn.
    ///
    /// One failing category fails the whole fetch and nothing from this run is
    /// admitted; the next tick retries all of them. Skipping only the failing
    /// category and keeping the rest would be the more lenient alternative.
    async fn fetch(&self) -> Result<Vec<NewArticle>, DomainError> {
        let mut articles = Vec::new();

        for category in &self.config.categories {
            articles.extend(self.fetch_category(category).await?);
        }

        Ok(articles)
    }
}
