//! Article domain - canonical article record, store contract and dedup rules

pub mod dedup;
mod entity;
mod repository;

pub use entity::{Article, ArticleId, NewArticle, SourceTag};
pub use repository::{ArticleRepository, InsertOutcome};

#[cfg(test)]
pub use repository::mock::MockArticleRepository;
