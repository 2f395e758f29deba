//! Category/keyword filtering over article lists

use chrono::{DateTime, Utc};

use crate::domain::article::Article;

/// Request-level filter applied to the recent-news list in memory
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleFilter {
    /// Accepted categories (OR semantics). Empty accepts every category.
    pub categories: Vec<String>,
    /// Case-insensitive title substring. `None` accepts every title.
    pub keyword: Option<String>,
}

impl ArticleFilter {
    pub fn new(categories: Vec<String>, keyword: Option<String>) -> Self {
        Self {
            categories,
            keyword: keyword.filter(|k| !k.is_empty()),
        }
    }

    /// Build a filter from the raw `categories` CSV and `keyword` query values
    pub fn from_params(categories: Option<&str>, keyword: Option<&str>) -> Self {
        Self::new(
            parse_categories(categories),
            keyword.map(|k| k.to_string()),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty() && self.keyword.is_none()
    }

    pub fn matches(&self, article: &Article) -> bool {
        let keyword = self.keyword.as_ref().map(|k| k.to_lowercase());
        self.matches_lowered(article, keyword.as_deref())
    }

    fn matches_lowered(&self, article: &Article, keyword: Option<&str>) -> bool {
        let category_ok =
            self.categories.is_empty() || self.categories.iter().any(|c| c == article.category());

        let keyword_ok = match keyword {
            Some(k) => article.title().to_lowercase().contains(k),
            None => true,
        };

        category_ok && keyword_ok
    }
}

/// Store-level query: the in-memory filter plus a publication lower bound
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticleQuery {
    pub filter: ArticleFilter,
    /// Inclusive lower bound on `published_at`
    pub published_after: Option<DateTime<Utc>>,
}

impl ArticleQuery {
    pub fn new(filter: ArticleFilter, published_after: Option<DateTime<Utc>>) -> Self {
        Self {
            filter,
            published_after,
        }
    }

    pub fn matches(&self, article: &Article) -> bool {
        let after_ok = self
            .published_after
            .is_none_or(|after| article.published_at() >= after);

        after_ok && self.filter.matches(article)
    }
}

/// Keep the articles accepted by `filter`, preserving their relative order
pub fn filter_articles(items: Vec<Article>, filter: &ArticleFilter) -> Vec<Article> {
    if filter.is_empty() {
        return items;
    }

    let keyword = filter.keyword.as_ref().map(|k| k.to_lowercase());

    items
        .into_iter()
        .filter(|article| filter.matches_lowered(article, keyword.as_deref()))
        .collect()
}

/// Split a comma-separated category list, dropping blank entries
pub fn parse_categories(raw: Option<&str>) -> Vec<String> {
    raw.map(|csv| {
        csv.split(',')
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::article::{NewArticle, SourceTag};
    use chrono::{Duration, TimeZone};

    fn article(id: i64, title: &str, category: &str) -> Article {
        let published = Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap() + Duration::minutes(id);

        Article::restore(
            id,
            NewArticle {
                author: String::new(),
                title: title.to_string(),
                url: format!("https://example.com/{}", id),
                image_url: String::new(),
                published_at: published,
                category: category.to_string(),
                source_tag: SourceTag::NewsApi,
            },
            published,
            published,
        )
    }

    fn cached_five() -> Vec<Article> {
        vec![
            article(1, "AI beats champion at Go", "tech"),
            article(2, "Local team wins derby", "sports"),
            article(3, "Rain expected through the weekend", "weather"),
            article(4, "Referees trial AI offside calls", "sports"),
            article(5, "New AI lab opens downtown", "business"),
        ]
    }

    #[test]
    fn test_filter_by_categories_and_keyword() {
        let filter = ArticleFilter::new(
            vec!["tech".to_string(), "sports".to_string()],
            Some("ai".to_string()),
        );

        let ids: Vec<i64> = filter_articles(cached_five(), &filter)
            .iter()
            .map(|a| a.id())
            .collect();

        assert_eq!(ids, vec![1, 4]);
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let items = cached_five();
        assert_eq!(filter_articles(items.clone(), &ArticleFilter::default()), items);
    }

    #[test]
    fn test_keyword_only() {
        let filter = ArticleFilter::new(vec![], Some("DERBY".to_string()));
        let result = filter_articles(cached_five(), &filter);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].id(), 2);
    }

    #[test]
    fn test_categories_only() {
        let filter = ArticleFilter::new(vec!["weather".to_string()], None);
        let result = filter_articles(cached_five(), &filter);

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].category(), "weather");
    }

    #[test]
    fn test_category_match_is_exact() {
        let filter = ArticleFilter::new(vec!["Tech".to_string()], None);
        assert!(filter_articles(cached_five(), &filter).is_empty());
    }

    #[test]
    fn test_empty_keyword_is_ignored() {
        let filter = ArticleFilter::new(vec![], Some(String::new()));
        assert!(filter.is_empty());
    }

    #[test]
    fn test_parse_categories() {
        assert_eq!(
            parse_categories(Some("tech,sports")),
            vec!["tech".to_string(), "sports".to_string()]
        );
        assert_eq!(
            parse_categories(Some(" tech , ,sports,")),
            vec!["tech".to_string(), "sports".to_string()]
        );
        assert!(parse_categories(Some("")).is_empty());
        assert!(parse_categories(None).is_empty());
    }

    #[test]
    fn test_query_published_after_is_inclusive() {
        let items = cached_five();
        let bound = items[2].published_at();
        let query = ArticleQuery::new(ArticleFilter::default(), Some(bound));

        let ids: Vec<i64> = items.iter().filter(|a| query.matches(a)).map(|a| a.id()).collect();
        assert_eq!(ids, vec![3, 4, 5]);
    }
}
