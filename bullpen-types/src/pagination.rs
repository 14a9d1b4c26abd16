use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    pub page: u32,
    pub per_page: u32,
    pub total: u64,
    pub has_next: bool,
    pub has_prev: bool,
}

/// Envelope returned by every list endpoint: `{ data, pagination }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Paginated<T> {
    /// `has_next` is `page * per_page < total`, `has_prev` is `page > 1`.
    pub fn new(data: Vec<T>, page: u32, per_page: u32, total: u64) -> Self {
        let has_next = u64::from(page) * u64::from(per_page) < total;
        Self {
            data,
            pagination: Pagination {
                page,
                per_page,
                total,
                has_next,
                has_prev: page > 1,
            },
        }
    }

    pub fn with_has_next(mut self, has_next: bool) -> Self {
        self.pagination.has_next = has_next;
        self
    }

    pub fn with_has_prev(mut self, has_prev: bool) -> Self {
        self.pagination.has_prev = has_prev;
        self
    }

    pub fn map<U, F: FnMut(T) -> U>(self, f: F) -> Paginated<U> {
        Paginated {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}
