//! Infrastructure layer - External service implementations

pub mod article;
pub mod cache;
pub mod observability;
pub mod provider;
pub mod scheduler;
pub mod services;
pub mod timeout;
