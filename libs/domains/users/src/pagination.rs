use serde::Serialize;
use utoipa::ToSchema;

pub const MAX_PAGE_SIZE: u64 = 10;

const MAX_OFFSET: u64 = i64::MAX as u64;

/// Normalized page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u64,
    pub size: u64,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page: 0,
            size: MAX_PAGE_SIZE,
        }
    }
}

impl PageRequest {
    /// Non-numeric or negative pages become 0. Sizes outside 1..=10 become 10.
    pub fn from_params(page: Option<&str>, size: Option<&str>) -> Self {
        let parse = |value: Option<&str>| value.and_then(|v| v.trim().parse::<i64>().ok());

        let page = parse(page).filter(|p| *p >= 0).map_or(0, |p| p as u64);
        let size = parse(size)
            .filter(|s| (1..=MAX_PAGE_SIZE as i64).contains(s))
            .map_or(MAX_PAGE_SIZE, |s| s as u64);

        Self { page, size }
    }

    /// Row offset of the page, capped at `i64::MAX` so it always binds as a SQL `BIGINT`.
    pub fn offset(&self) -> u64 {
        self.page.saturating_mul(self.size).min(MAX_OFFSET)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub content: Vec<T>,
    pub page: u64,
    pub size: u64,
    pub total_pages: u64,
}

impl<T> Page<T> {
    pub fn new(content: Vec<T>, request: PageRequest, total_items: u64) -> Self {
        Self {
            content,
            page: request.page,
            size: request.size,
            total_pages: total_items.div_ceil(request.size),
        }
    }
}
