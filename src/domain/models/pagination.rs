use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 10;
pub const MAX_LIMIT: usize = 100;

/// A requested page, 1-based. Out-of-range values are clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: usize,
    pub limit: usize,
}

impl Default for Page {
    fn default() -> Self {
        Self {
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl Page {
    pub fn new(page: Option<usize>, limit: Option<usize>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            limit: limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT),
        }
    }

    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Cuts this page out of the full, already ordered result set.
    pub fn slice<T>(&self, items: Vec<T>) -> Paginated<T> {
        let pagination = Pagination::new(self, items.len());
        let items = items
            .into_iter()
            .skip(self.offset())
            .take(self.limit)
            .collect();
        Paginated { items, pagination }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub current_page: usize,
    pub total_pages: usize,
    pub total_records: usize,
    pub has_next: bool,
    pub has_prev: bool,
}

impl Pagination {
    pub fn new(page: &Page, total_records: usize) -> Self {
        let total_pages = total_records.div_ceil(page.limit);
        Self {
            current_page: page.page,
            total_pages,
            total_records,
            has_next: page.page < total_pages,
            has_prev: page.page > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Paginated<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
