use serde::Serialize;

use crate::data_models::SearchHit;
use crate::pagination::Pagination;
use crate::resolver::Resolution;

/// The uniform search response. Callers branch on `exact` only.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub exact: bool,
    pub hits: Vec<SearchHit>,
    pub suggestion: Option<String>,
    pub total: u64,
    pub page: u32,
    pub total_pages: u64,
}

impl SearchResult {
    pub fn from_resolution(resolution: Resolution, pagination: Pagination) -> Self {
        let (exact, hits, total, suggestion) = match resolution {
            Resolution::Exact { hits, total } => (true, hits, total, None),
            Resolution::Fuzzy {
                hits,
                total,
                suggestion,
            } => (false, hits, total, suggestion),
        };

        Self {
            exact,
            hits,
            suggestion,
            total,
            page: pagination.page(),
            total_pages: pagination.total_pages(total),
        }
    }
}
