//! Request and response types shared by the handlers

pub mod error;
pub mod query;

pub use error::{ApiError, ApiErrorResponse, INTERNAL_SERVER_ERROR};
pub use query::Query;
