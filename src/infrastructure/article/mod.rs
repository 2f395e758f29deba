//! Article store implementations and schema

mod factory;
mod in_memory_repository;
mod migrations;
mod postgres_repository;

pub use factory::{ArticleStore, ArticleStoreFactory, StorageType};
pub use in_memory_repository::InMemoryArticleRepository;
pub use migrations::{article_migrations, run_article_migrations, Migration, PostgresMigrator};
pub use postgres_repository::{PostgresArticleRepository, PostgresConfig};
