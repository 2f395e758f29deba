//! Cache domain - Key/value cache abstraction backing the recent-news window

mod repository;

pub use repository::{Cache, CacheExt};

#[cfg(test)]
pub use repository::mock::MockCache;
