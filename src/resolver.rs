//! Turns a user query into a ranked page of products.
//!
//! Resolution is a two-step pipeline: an exact `match` query first, and a
//! `fuzzy` query only when the exact phase found nothing at all. The two
//! phases are never merged; whichever one produced the hits also produces
//! the total used for paging.

use std::sync::Arc;

use crate::data_models::SearchHit;
use crate::error::{IndexError, ValidationError};
use crate::index::{DocumentIndex, Fuzziness, IndexQuery, NAME_FIELD, QueryClause};
use crate::pagination::Pagination;
use crate::response::SearchResult;

/// One search request: the raw text plus validated paging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    pagination: Pagination,
}

impl SearchQuery {
    /// Blank or missing text is a caller error.
    pub fn new(text: Option<&str>, pagination: Pagination) -> Result<Self, ValidationError> {
        match text {
            Some(text) if !text.trim().is_empty() => Ok(Self {
                text: text.to_string(),
                pagination,
            }),
            _ => Err(ValidationError::new("Missing required query parameter: q")),
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }
}

/// Which phase answered a query, and what it found.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Exact {
        hits: Vec<SearchHit>,
        total: u64,
    },
    Fuzzy {
        hits: Vec<SearchHit>,
        total: u64,
        suggestion: Option<String>,
    },
}

pub struct QueryResolver {
    index: Arc<dyn DocumentIndex>,
}

impl QueryResolver {
    pub fn new(index: Arc<dyn DocumentIndex>) -> Self {
        Self { index }
    }

    pub fn index(&self) -> &Arc<dyn DocumentIndex> {
        &self.index
    }

    pub async fn resolve(&self, query: &SearchQuery) -> Result<Resolution, IndexError> {
        let pagination = query.pagination();

        let exact = self
            .index
            .search(&IndexQuery {
                clause: QueryClause::Match {
                    field: NAME_FIELD.to_string(),
                    text: query.text().to_string(),
                },
                from: pagination.offset(),
                size: pagination.size(),
            })
            .await?;

        if exact.total > 0 {
            log::debug!("{:?}: {} exact matches", query.text(), exact.total);
            return Ok(Resolution::Exact {
                hits: exact.hits,
                total: exact.total,
            });
        }

        let fuzzy = self
            .index
            .search(&IndexQuery {
                clause: QueryClause::Fuzzy {
                    field: NAME_FIELD.to_string(),
                    value: query.text().to_string(),
                    fuzziness: Fuzziness::Auto,
                },
                from: pagination.offset(),
                size: pagination.size(),
            })
            .await?;

        log::debug!(
            "{:?}: no exact matches, {} fuzzy matches",
            query.text(),
            fuzzy.total
        );

        let suggestion = fuzzy
            .hits
            .first()
            .and_then(|hit| hit.source.name())
            .map(str::to_string);

        Ok(Resolution::Fuzzy {
            hits: fuzzy.hits,
            total: fuzzy.total,
            suggestion,
        })
    }

    /// Resolve and shape into the response contract.
    pub async fn search(&self, query: &SearchQuery) -> Result<SearchResult, IndexError> {
        let resolution = self.resolve(query).await?;
        Ok(SearchResult::from_resolution(resolution, query.pagination()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_query_requires_text() {
        assert!(SearchQuery::new(None, Pagination::default()).is_err());
        assert!(SearchQuery::new(Some(""), Pagination::default()).is_err());

        let err = SearchQuery::new(Some("   "), Pagination::default()).unwrap_err();
        assert!(err.to_string().contains('q'));
    }

    #[test]
    fn test_search_query_keeps_text_verbatim() {
        let q = SearchQuery::new(Some(" iPhone 13 "), Pagination::default()).unwrap();
        assert_eq!(q.text(), " iPhone 13 ");
    }
}
