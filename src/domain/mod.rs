//! Domain layer - Core business logic and entities

pub mod article;
pub mod cache;
pub mod error;
pub mod provider;
pub mod query;

pub use article::{Article, ArticleId, ArticleRepository, InsertOutcome, NewArticle, SourceTag};
pub use cache::{Cache, CacheExt};
pub use error::DomainError;
pub use provider::NewsProvider;
pub use query::{ArticleFilter, ArticleQuery, Page, PageInfo, PageRequest};
