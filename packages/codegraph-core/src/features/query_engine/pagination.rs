//! §4.6 "Pagination contract" — mandatory on every list-returning query
//! operation. Grounded in the teacher's `node_query.rs` fluent builder's
//! `limit`/`offset` handling, pulled out here since every C6 operation
//! shares the exact same clamp-and-slice behavior.

use serde::Serialize;

pub const DEFAULT_LIMIT: usize = 50;
pub const MAX_LIMIT: usize = 500;

#[derive(Debug, Clone, Copy)]
pub struct PageRequest {
    pub limit: usize,
    pub offset: usize,
}

impl PageRequest {
    /// Clamps `limit` to `1..=500`, defaulting to 50; `offset` defaults to 0.
    pub fn new(limit: Option<usize>, offset: Option<usize>) -> Self {
        let limit = limit.unwrap_or(DEFAULT_LIMIT).clamp(1, MAX_LIMIT);
        Self { limit, offset: offset.unwrap_or(0) }
    }
}

impl Default for PageRequest {
    fn default() -> Self {
        Self::new(None, None)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: usize,
    pub offset: usize,
    pub has_more: bool,
}

/// Slices `items` into one page per `request`. `total` is the full count of
/// `items` before slicing — callers that can cheaply know the total without
/// materializing every row should prefer constructing `Page` directly.
pub fn paginate<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let total = items.len();
    let start = request.offset.min(total);
    let page: Vec<T> = items.into_iter().skip(start).take(request.limit).collect();
    let has_more = start + page.len() < total;
    Page { items: page, total, offset: request.offset, has_more }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn limit_clamps_to_bounds() {
        assert_eq!(PageRequest::new(Some(0), None).limit, 1);
        assert_eq!(PageRequest::new(Some(10_000), None).limit, MAX_LIMIT);
        assert_eq!(PageRequest::new(None, None).limit, DEFAULT_LIMIT);
    }

    #[test]
    fn paginate_reports_has_more() {
        let items: Vec<u32> = (0..120).collect();
        let page = paginate(items, PageRequest::new(Some(50), Some(0)));
        assert_eq!(page.items.len(), 50);
        assert_eq!(page.total, 120);
        assert!(page.has_more);
    }

    #[test]
    fn paginate_past_end_is_empty_not_an_error() {
        let items: Vec<u32> = (0..10).collect();
        let page = paginate(items, PageRequest::new(Some(50), Some(100)));
        assert!(page.items.is_empty());
        assert!(!page.has_more);
    }
}
