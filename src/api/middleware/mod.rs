//! API middleware components

pub mod logging;
pub mod metrics;
pub mod special_key;

pub use logging::logging_middleware;
pub use metrics::metrics_middleware;
pub use special_key::{RequireSpecialKey, SpecialKey, SPECIAL_KEY_HEADER};
