use serde::Serialize;

const MAX_LIMIT: i64 = 1000;

pub(crate) const fn default_limit() -> i64 {
    100
}

/// Offset paging used by the admin user list.
#[derive(Debug, Serialize)]
pub(crate) struct PaginatedResponse<T> {
    pub(crate) items: Vec<T>,
    pub(crate) total_count: i64,
    pub(crate) skip: i64,
    pub(crate) limit: i64,
}

/// Clamps raw `skip`/`limit` query values.
pub(crate) fn offset_window(skip: i64, limit: i64) -> (i64, i64) {
    (skip.max(0), limit.clamp(1, MAX_LIMIT))
}

/// Page-numbered paging used by the question bank, one per question table.
#[derive(Debug, Serialize, PartialEq, Eq)]
pub(crate) struct PageInfo {
    pub(crate) page: i64,
    pub(crate) per_page: i64,
    pub(crate) total: i64,
    pub(crate) pages: i64,
}

impl PageInfo {
    pub(crate) fn new(page: i64, per_page: i64, total: i64) -> Self {
        let pages = if total == 0 { 0 } else { (total + per_page - 1) / per_page };
        Self { page, per_page, total, pages }
    }
}
