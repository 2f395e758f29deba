//! Page arithmetic shared by the store-backed and cache-backed read paths

use serde::Serialize;

use crate::domain::DomainError;

/// A validated (page, page size) pair. Pages are 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    page: u32,
    page_size: u32,
}

impl PageRequest {
    pub fn new(page: i64, page_size: i64) -> Result<Self, DomainError> {
        let page = u32::try_from(page)
            .ok()
            .filter(|p| *p >= 1)
            .ok_or_else(|| DomainError::validation("invalid page parameter"))?;
        let page_size = u32::try_from(page_size)
            .ok()
            .filter(|s| *s >= 1)
            .ok_or_else(|| DomainError::validation("invalid pageSize parameter"))?;

        Ok(Self { page, page_size })
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// Number of rows to skip: `(page - 1) * page_size`
    pub fn offset(&self) -> u64 {
        u64::from(self.page - 1) * u64::from(self.page_size)
    }

    pub fn limit(&self) -> u64 {
        u64::from(self.page_size)
    }
}

/// One page of results plus the size of the full result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: i64,
}

impl<T> Page<T> {
    pub fn new(items: Vec<T>, total: i64) -> Self {
        Self { items, total }
    }
}

/// Slice `items` down to the requested page. Out-of-range pages are empty.
pub fn paginate<T>(items: &[T], request: PageRequest) -> &[T] {
    let start = usize::try_from(request.offset()).unwrap_or(usize::MAX);

    if start >= items.len() {
        return &[];
    }

    let end = start.saturating_add(request.page_size() as usize).min(items.len());
    &items[start..end]
}

/// `ceil(total / page_size)`, or 0 when either input is not positive
pub fn total_pages(total: i64, page_size: i64) -> i64 {
    if total <= 0 || page_size <= 0 {
        return 0;
    }

    (total + page_size - 1) / page_size
}

/// Navigation metadata returned alongside a page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u32,
    pub page_size: u32,
    pub total_pages: i64,
    pub is_first_page: bool,
    pub is_last_page: bool,
}

impl PageInfo {
    pub fn new(request: PageRequest, total: i64) -> Self {
        let total_pages = total_pages(total, i64::from(request.page_size()));

        Self {
            page: request.page(),
            page_size: request.page_size(),
            total_pages,
            is_first_page: request.page() == 1,
            is_last_page: i64::from(request.page()) == total_pages,
        }
    }
}
