//! Article entity - the canonical record produced by every provider adapter

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::DomainError;

/// Store-assigned article identifier
pub type ArticleId = i64;

/// Which provider produced an article
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceTag {
    #[serde(rename = "NEWS API")]
    NewsApi,
    #[serde(rename = "GUARDIAN API")]
    Guardian,
}

impl SourceTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceTag::NewsApi => "NEWS API",
            SourceTag::Guardian => "GUARDIAN API",
        }
    }

    /// Short machine-friendly name used in metrics labels and CLI flags
    pub fn slug(&self) -> &'static str {
        match self {
            SourceTag::NewsApi => "news-api",
            SourceTag::Guardian => "guardian",
        }
    }
}

impl fmt::Display for SourceTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceTag {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEWS API" | "news-api" => Ok(SourceTag::NewsApi),
            "GUARDIAN API" | "guardian" => Ok(SourceTag::Guardian),
            other => Err(DomainError::validation(format!(
                "Unknown source tag: {}",
                other
            ))),
        }
    }
}

/// A normalized article that has not been persisted yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewArticle {
    pub author: String,
    pub title: String,
    pub url: String,
    pub image_url: String,
    pub published_at: DateTime<Utc>,
    pub category: String,
    pub source_tag: SourceTag,
}

/// A persisted article.
///
/// Articles are create-only: once the store assigns an id, none of the
/// fields change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    id: ArticleId,
    author: String,
    title: String,
    url: String,
    image_url: String,
    published_at: DateTime<Utc>,
    category: String,
    source_tag: SourceTag,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Article {
    /// Rebuild an article from its persisted parts
    pub fn restore(
        id: ArticleId,
        article: NewArticle,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            author: article.author,
            title: article.title,
            url: article.url,
            image_url: article.image_url,
            published_at: article.published_at,
            category: article.category,
            source_tag: article.source_tag,
            created_at,
            updated_at,
        }
    }

    pub fn id(&self) -> ArticleId {
        self.id
    }

    pub fn author(&self) -> &str {
        &self.author
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn image_url(&self) -> &str {
        &self.image_url
    }

    pub fn published_at(&self) -> DateTime<Utc> {
        self.published_at
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn source_tag(&self) -> SourceTag {
        self.source_tag
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Article {
        let published = Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 15).unwrap()
            + chrono::Duration::microseconds(123_456);

        Article::restore(
            7,
            NewArticle {
                author: "Jane Roe".to_string(),
                title: "Storm hits coast".to_string(),
                url: "https://example.com/storm".to_string(),
                image_url: "https://example.com/storm.jpg".to_string(),
                published_at: published,
                category: "world".to_string(),
                source_tag: SourceTag::Guardian,
            },
            published,
            published,
        )
    }

    #[test]
    fn test_source_tag_round_trip() {
        assert_eq!("NEWS API".parse::<SourceTag>().unwrap(), SourceTag::NewsApi);
        assert_eq!("guardian".parse::<SourceTag>().unwrap(), SourceTag::Guardian);
        assert!("reuters".parse::<SourceTag>().is_err());
        assert_eq!(SourceTag::Guardian.to_string(), "GUARDIAN API");
    }

    #[test]
    fn test_article_serializes_camel_case() {
        let json = serde_json::to_value(sample()).unwrap();

        assert_eq!(json["imageUrl"], "https://example.com/storm.jpg");
        assert_eq!(json["sourceTag"], "GUARDIAN API");
        assert!(json.get("publishedAt").is_some());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("image_url").is_none());
    }

    #[test]
    fn test_article_json_keeps_sub_second_precision() {
        let article = sample();
        let json = serde_json::to_string(&article).unwrap();
        let decoded: Article = serde_json::from_str(&json).unwrap();

        assert_eq!(decoded, article);
        assert_eq!(decoded.published_at().timestamp_subsec_micros(), 123_456);
    }
}
