//! Shared-secret authentication for the filtered and recent endpoints

use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::debug;

use crate::api::state::AppState;
use crate::api::types::ApiError;

/// Header carrying the shared secret
pub const SPECIAL_KEY_HEADER: &str = "special-key";

/// The configured shared secret. An empty secret accepts nothing.
#[derive(Clone)]
pub struct SpecialKey(String);

impl SpecialKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn is_configured(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn matches(&self, presented: &str) -> bool {
        self.is_configured() && self.0 == presented
    }
}

impl std::fmt::Debug for SpecialKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("SpecialKey").field(&"[REDACTED]").finish()
    }
}

/// Extractor that requires the `Special-Key` header to equal the configured secret
#[derive(Debug, Clone, Copy)]
pub struct RequireSpecialKey;

impl FromRequestParts<AppState> for RequireSpecialKey {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let presented = parts
            .headers
            .get(SPECIAL_KEY_HEADER)
            .and_then(|v| v.to_str().ok());

        match presented {
            Some(value) if state.special_key.matches(value) => Ok(RequireSpecialKey),
            _ => {
                debug!(present = presented.is_some(), "Rejected Special-Key");
                Err(ApiError::unauthorized("Invalid Special Key"))
            }
        }
    }
}
