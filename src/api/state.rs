//! Application state for shared services

use crate::api::middleware::SpecialKey;
use crate::infrastructure::services::NewsQueryService;

/// Handles every request needs. Built once at startup.
#[derive(Debug, Clone)]
pub struct AppState {
    pub news: NewsQueryService,
    pub special_key: SpecialKey,
}

impl AppState {
    pub fn new(news: NewsQueryService, special_key: SpecialKey) -> Self {
        Self { news, special_key }
    }
}
