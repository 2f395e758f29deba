//! Provider domain - upstream news sources normalized into [`NewArticle`]s

use std::fmt::Debug;

use async_trait::async_trait;

use crate::domain::article::{NewArticle, SourceTag};
use crate::domain::DomainError;

/// An upstream news source
///
/// Implementations fetch the provider's current listing and map every item
/// to the canonical article shape. A failure anywhere in a fetch fails the
/// whole fetch: callers never see a partial batch.
#[async_trait]
pub trait NewsProvider: Send + Sync + Debug {
    /// Tag stamped on every article this provider produces
    fn source(&self) -> SourceTag;

    /// Fetch and normalize the provider's current articles
    async fn fetch(&self) -> Result<Vec<NewArticle>, DomainError>;
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Provider returning a fixed batch, or a fixed error
    #[derive(Debug)]
    pub struct StaticProvider {
        source: SourceTag,
        articles: Mutex<Vec<NewArticle>>,
        error: Option<String>,
        fetches: AtomicUsize,
    }

    impl StaticProvider {
        pub fn new(source: SourceTag, articles: Vec<NewArticle>) -> Self {
            Self {
                source,
                articles: Mutex::new(articles),
                error: None,
                fetches: AtomicUsize::new(0),
            }
        }

        pub fn failing(source: SourceTag, error: impl Into<String>) -> Self {
            Self {
                error: Some(error.into()),
                ..Self::new(source, Vec::new())
            }
        }

        pub fn set_articles(&self, articles: Vec<NewArticle>) {
            *self.articles.lock().unwrap() = articles;
        }

        pub fn fetch_count(&self) -> usize {
            self.fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl NewsProvider for StaticProvider {
        fn source(&self) -> SourceTag {
            self.source
        }

        async fn fetch(&self) -> Result<Vec<NewArticle>, DomainError> {
            self.fetches.fetch_add(1, Ordering::SeqCst);

            if let Some(error) = &self.error {
                return Err(DomainError::provider(self.source.slug(), error.clone()));
            }

            Ok(self.articles.lock().unwrap().clone())
        }
    }
}

#[cfg(test)]
pub use mock::StaticProvider;
