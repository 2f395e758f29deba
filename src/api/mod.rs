//! API layer - HTTP endpoints and middleware

pub mod health;
pub mod middleware;
pub mod news;
pub mod router;
pub mod state;
pub mod types;

pub use middleware::{RequireSpecialKey, SpecialKey};
pub use router::{create_router, API_PREFIX};
pub use state::AppState;
