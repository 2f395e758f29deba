//! Query domain - in-memory filtering and pagination

mod filter;
mod pagination;

pub use filter::{filter_articles, parse_categories, ArticleFilter, ArticleQuery};
pub use pagination::{paginate, total_pages, Page, PageInfo, PageRequest};
