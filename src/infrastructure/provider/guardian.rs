//! Guardian content API adapter: today's items per configured section

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, warn};

use super::http_client::{relabel, HttpClientTrait};
use crate::domain::article::{NewArticle, SourceTag};
use crate::domain::provider::NewsProvider;
use crate::domain::DomainError;

const DEFAULT_GUARDIAN_BASE_URL: &str = "https://content.guardianapis.com";

#[derive(Debug, Clone)]
pub struct GuardianConfig {
    pub base_url: String,
    pub api_key: String,
    pub sections: Vec<String>,
}

impl GuardianConfig {
    pub fn new(api_key: impl Into<String>, sections: Vec<String>) -> Self {
        Self {
            base_url: DEFAULT_GUARDIAN_BASE_URL.to_string(),
            api_key: api_key.into(),
            sections,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    response: SearchResponse,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    results: Vec<GuardianResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianResult {
    web_title: String,
    web_url: String,
    web_publication_date: String,
    #[serde(default)]
    fields: GuardianFields,
}

#[derive(Debug, Default, Deserialize)]
struct GuardianFields {
    thumbnail: Option<String>,
    byline: Option<String>,
}

/// Guardian publication dates are RFC 3339. Anything else is stamped with
/// the current time so the item is still ingested.
fn parse_publication_date(raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(parsed) => parsed.with_timezone(&Utc),
        Err(e) => {
            warn!(date = raw, error = %e, "Unparseable Guardian publication date, using now");
            Utc::now()
        }
    }
}

impl GuardianResult {
    fn into_article(self, section: &str) -> NewArticle {
        let author = self
            .fields
            .byline
            .filter(|b| !b.trim().is_empty())
            .unwrap_or_else(|| self.web_title.clone());

        NewArticle {
            author,
            published_at: parse_publication_date(&self.web_publication_date),
            title: self.web_title,
            url: self.web_url,
            image_url: self.fields.thumbnail.unwrap_or_default(),
            category: section.to_string(),
            source_tag: SourceTag::Guardian,
        }
    }
}

/// Guardian provider
#[derive(Debug)]
pub struct GuardianProvider<C: HttpClientTrait> {
    client: C,
    config: GuardianConfig,
    search_url: String,
}

impl<C: HttpClientTrait> GuardianProvider<C> {
    pub fn new(client: C, config: GuardianConfig) -> Self {
        let search_url = format!("{}/search", config.base_url.trim_end_matches('/'));

        Self {
            client,
            config,
            search_url,
        }
    }

    async fn fetch_section(&self, section: &str, day: &str) -> Result<Vec<NewArticle>, DomainError> {
        let json = self
            .client
            .get_json(
                &self.search_url,
                &[
                    ("section", section),
                    ("from-date", day),
                    ("to-date", day),
                    ("show-fields", "thumbnail,byline"),
                    ("api-key", self.config.api_key.as_str()),
                ],
            )
            .await
            .map_err(|e| relabel(e, SourceTag::Guardian.slug()))?;

        let envelope: SearchEnvelope = serde_json::from_value(json).map_err(|e| {
            DomainError::provider(
                SourceTag::Guardian.slug(),
                format!("Malformed search payload: {}", e),
            )
        })?;

        let response = envelope.response;

        if response.status != "ok" {
            return Err(DomainError::provider(
                SourceTag::Guardian.slug(),
                format!(
                    "Payload status '{}' for section '{}': {}",
                    response.status,
                    section,
                    response.message.unwrap_or_default()
                ),
            ));
        }

        debug!(section, count = response.results.len(), "Fetched Guardian results");

        Ok(response
            .results
            .into_iter()
            .map(|result| result.into_article(section))
            .collect())
    }
}

#[async_trait]
impl<C: HttpClientTrait> NewsProvider for GuardianProvider<C> {
    fn source(&self) -> SourceTag {
        SourceTag::Guardian
    }

    /// Fetch every configured section in turn.
    ///
    /// One failing section fails the whole fetch and nothing from this run is
    /// admitted; the next tick retries all of them. Skipping only the failing
    /// section and keeping the rest would be the more lenient alternative.
    async fn fetch(&self) -> Result<Vec<NewArticle>, DomainError> {
        let today = Utc::now().format("%Y-%m-%d").to_string();
        let mut articles = Vec::new();

        for section in &self.config.sections {
            articles.extend(self.fetch_section(section, &today).await?);
        }

        Ok(articles)
    }
}
