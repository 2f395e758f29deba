//! Provider adapters over a mockable HTTP client

mod guardian;
pub mod http_client;
mod news_api;

pub use guardian::{GuardianConfig, GuardianProvider};
pub use http_client::{HttpClient, HttpClientTrait};
pub use news_api::{NewsApiConfig, NewsApiProvider};
