//! PostgreSQL article repository implementation

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgPool, PgPoolOptions, PgRow};
use sqlx::{PgExecutor, Row};

use crate::domain::article::dedup::{duplicate_window, titles_match};
use crate::domain::article::{Article, ArticleRepository, InsertOutcome, NewArticle};
use crate::domain::query::{ArticleQuery, Page, PageRequest};
use crate::domain::DomainError;

const ARTICLE_COLUMNS: &str =
    "id, author, title, url, image_url, published_at, category, source_tag, created_at, updated_at";

/// Advisory lock key serializing every deduplicating insert, across processes
const ADMIT_LOCK_KEY: i64 = 0x6e65_7773_6167_67;

/// Connection pool settings
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
}

impl PostgresConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            max_connections: 10,
            acquire_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_max_connections(mut self, max: u32) -> Self {
        self.max_connections = max;
        self
    }

    pub fn with_acquire_timeout(mut self, timeout: Duration) -> Self {
        self.acquire_timeout = timeout;
        self
    }

    /// Opens the connection pool
    pub async fn connect(&self) -> Result<PgPool, DomainError> {
        PgPoolOptions::new()
            .max_connections(self.max_connections)
            .acquire_timeout(self.acquire_timeout)
            .connect(&self.url)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to connect to PostgreSQL: {}", e)))
    }
}

/// PostgreSQL implementation of ArticleRepository
#[derive(Debug, Clone)]
pub struct PostgresArticleRepository {
    pool: PgPool,
}

impl PostgresArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Turns a keyword into a literal, case-insensitive ILIKE pattern
pub(crate) fn like_pattern(keyword: &str) -> String {
    let mut escaped = String::with_capacity(keyword.len() + 2);
    escaped.push('%');

    for c in keyword.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }

    escaped.push('%');
    escaped
}

fn map_insert_error(e: sqlx::Error, article: &NewArticle) -> DomainError {
    let msg = e.to_string();

    if msg.contains("duplicate key") || msg.contains("unique constraint") {
        DomainError::conflict(format!(
            "Article with url '{}' already exists",
            article.url
        ))
    } else {
        DomainError::storage(format!("Failed to insert article: {}", e))
    }
}

async fn insert_row<'e, E>(executor: E, article: &NewArticle) -> Result<Article, DomainError>
where
    E: PgExecutor<'e>,
{
    let sql = format!(
        r#"
        INSERT INTO articles (author, title, url, image_url, published_at, category, source_tag)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING {}
        "#,
        ARTICLE_COLUMNS
    );

    let row = sqlx::query(&sql)
        .bind(&article.author)
        .bind(&article.title)
        .bind(&article.url)
        .bind(&article.image_url)
        .bind(article.published_at)
        .bind(&article.category)
        .bind(article.source_tag.as_str())
        .fetch_one(executor)
        .await
        .map_err(|e| map_insert_error(e, article))?;

    row_to_article(&row)
}

/// Titles of articles published within the duplicate window of `candidate`
async fn titles_near<'e, E>(executor: E, candidate: &NewArticle) -> Result<Vec<String>, DomainError>
where
    E: PgExecutor<'e>,
{
    let (from, to) = duplicate_window(candidate.published_at);

    sqlx::query_scalar("SELECT title FROM articles WHERE published_at BETWEEN $1 AND $2")
        .bind(from)
        .bind(to)
        .fetch_all(executor)
        .await
        .map_err(|e| DomainError::storage(format!("Failed to look up near duplicates: {}", e)))
}

#[async_trait]
impl ArticleRepository for PostgresArticleRepository {
    async fn insert(&self, article: NewArticle) -> Result<Article, DomainError> {
        insert_row(&self.pool, &article).await
    }

    async fn exists_near_duplicate(&self, candidate: &NewArticle) -> Result<bool, DomainError> {
        let titles = titles_near(&self.pool, candidate).await?;
        Ok(titles.iter().any(|t| titles_match(t, &candidate.title)))
    }

    async fn insert_unless_duplicate(
        &self,
        article: NewArticle,
    ) -> Result<InsertOutcome, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to begin transaction: {}", e)))?;

        sqlx::query("SELECT pg_advisory_xact_lock($1)")
            .bind(ADMIT_LOCK_KEY)
            .execute(&mut *tx)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to take admit lock: {}", e)))?;

        let titles = titles_near(&mut *tx, &article).await?;

        if titles.iter().any(|t| titles_match(t, &article.title)) {
            tx.rollback()
                .await
                .map_err(|e| DomainError::storage(format!("Failed to roll back: {}", e)))?;
            return Ok(InsertOutcome::Duplicate);
        }

        let stored = insert_row(&mut *tx, &article).await?;

        tx.commit()
            .await
            .map_err(|e| DomainError::storage(format!("Failed to commit article: {}", e)))?;

        Ok(InsertOutcome::Inserted(stored))
    }

    async fn list_paginated(&self, page: PageRequest) -> Result<Page<Article>, DomainError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count articles: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM articles ORDER BY updated_at DESC, id DESC LIMIT $1 OFFSET $2",
            ARTICLE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list articles: {}", e)))?;

        let items = rows.iter().map(row_to_article).collect::<Result<_, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn list_filtered(
        &self,
        query: &ArticleQuery,
        page: PageRequest,
    ) -> Result<Page<Article>, DomainError> {
        const WHERE: &str = r#"
            WHERE ($1::text[] IS NULL OR category = ANY($1))
              AND ($2::text IS NULL OR title ILIKE $2 ESCAPE '\')
              AND ($3::timestamptz IS NULL OR published_at >= $3)
        "#;

        let categories = Some(query.filter.categories.clone()).filter(|c| !c.is_empty());
        let pattern = query.filter.keyword.as_deref().map(like_pattern);

        let total: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM articles {}", WHERE))
            .bind(&categories)
            .bind(&pattern)
            .bind(query.published_after)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count articles: {}", e)))?;

        let sql = format!(
            "SELECT {} FROM articles {} ORDER BY published_at DESC, id DESC LIMIT $4 OFFSET $5",
            ARTICLE_COLUMNS, WHERE
        );

        let rows = sqlx::query(&sql)
            .bind(&categories)
            .bind(&pattern)
            .bind(query.published_after)
            .bind(page.limit() as i64)
            .bind(page.offset() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to filter articles: {}", e)))?;

        let items = rows.iter().map(row_to_article).collect::<Result<_, _>>()?;
        Ok(Page::new(items, total))
    }

    async fn list_since(
        &self,
        published_after: DateTime<Utc>,
    ) -> Result<Vec<Article>, DomainError> {
        let sql = format!(
            "SELECT {} FROM articles WHERE published_at >= $1 ORDER BY published_at DESC, id DESC",
            ARTICLE_COLUMNS
        );

        let rows = sqlx::query(&sql)
            .bind(published_after)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to list recent articles: {}", e)))?;

        rows.iter().map(row_to_article).collect()
    }

    async fn count(&self) -> Result<i64, DomainError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| DomainError::storage(format!("Failed to count articles: {}", e)))
    }
}

fn row_to_article(row: &PgRow) -> Result<Article, DomainError> {
    let get_err = |e: sqlx::Error| DomainError::storage(format!("Invalid article row: {}", e));

    let source_tag: String = row.try_get("source_tag").map_err(get_err)?;
    let source_tag = source_tag
        .parse()
        .map_err(|e| DomainError::storage(format!("Invalid source tag in database: {}", e)))?;

    let article = NewArticle {
        author: row.try_get("author").map_err(get_err)?,
        title: row.try_get("title").map_err(get_err)?,
        url: row.try_get("url").map_err(get_err)?,
        image_url: row.try_get("image_url").map_err(get_err)?,
        published_at: row.try_get("published_at").map_err(get_err)?,
        category: row.try_get("category").map_err(get_err)?,
        source_tag,
    };

    Ok(Article::restore(
        row.try_get("id").map_err(get_err)?,
        article,
        row.try_get("created_at").map_err(get_err)?,
        row.try_get("updated_at").map_err(get_err)?,
    ))
}
