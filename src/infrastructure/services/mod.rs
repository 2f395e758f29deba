//! Application services wired over the domain traits

mod dedup_gate;
mod ingestion_service;
mod news_query_service;
mod recent_news_cache;

pub use dedup_gate::DedupGate;
pub use ingestion_service::{IngestionReport, IngestionService};
pub use news_query_service::{NewsQueryService, RecentNews, RecentSource};
pub use recent_news_cache::{CorruptEntryPolicy, RecentNewsCache, RecentNewsCacheConfig};
