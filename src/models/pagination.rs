//! Pagination envelope and in-memory paginate helper

use serde::{Deserialize, Serialize};
use std::future::Future;
use utoipa::ToSchema;

use crate::error::AppResult;

/// Page size used when a caller does not ask for one.
pub const DEFAULT_PAGE_SIZE: usize = 50;

/// Page size used while walking a complete filtered set (exports, stats).
pub const BULK_PAGE_SIZE: usize = 500;

/// Metadata for paginated list results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaginationMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
}

/// `{data, pagination}` list envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> PaginatedResponse<U> {
        PaginatedResponse {
            data: self.data.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

/// Slice `items` into the requested 1-indexed page.
///
/// A missing or zero page is read as page 1, a missing or zero page size as
/// [`DEFAULT_PAGE_SIZE`]. Pages past the end yield an empty slice.
pub fn paginate<T>(items: Vec<T>, page: Option<usize>, page_size: Option<usize>) -> PaginatedResponse<T> {
    let page = page.filter(|p| *p > 0).unwrap_or(1);
    let page_size = page_size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size);

    let start = (page - 1).saturating_mul(page_size);
    let data = items.into_iter().skip(start).take(page_size).collect();

    PaginatedResponse {
        data,
        pagination: PaginationMeta {
            page,
            page_size,
            total_items,
            total_pages,
        },
    }
}

/// Every row of a paginated listing, requested page by page until the source
/// reports its last page.
pub async fn fetch_all<T, F, Fut>(mut fetch_page: F) -> AppResult<Vec<T>>
where
    F: FnMut(usize) -> Fut,
    Fut: Future<Output = AppResult<PaginatedResponse<T>>>,
{
    let mut rows = Vec::new();
    let mut page = 1;
    loop {
        let batch = fetch_page(page).await?;
        let last_page = batch.pagination.total_pages;
        let exhausted = batch.data.is_empty();
        rows.extend(batch.data);
        if exhausted || page >= last_page {
            return Ok(rows);
        }
        page += 1;
    }
}
