//! The document index capability and its backends.
//!
//! Search code only ever sees [`DocumentIndex`]; which engine sits behind it
//! is decided once at startup.

use async_trait::async_trait;
use serde_json::Value;

use crate::data_models::{Product, SearchHits};
use crate::error::IndexError;

pub mod elastic;
pub mod memory;

pub use elastic::ElasticsearchIndex;
pub use memory::InMemoryIndex;

/// The only product field the search path queries.
pub const NAME_FIELD: &str = "name";

/// Edit-distance tolerance for fuzzy queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fuzziness {
    /// The engine's standard policy: the budget grows with term length.
    Auto,
}

impl Fuzziness {
    /// Maximum edits allowed for a term of `term_len` characters.
    pub fn max_edits(&self, term_len: usize) -> usize {
        match self {
            Fuzziness::Auto => match term_len {
                0..=2 => 0,
                3..=5 => 1,
                _ => 2,
            },
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Fuzziness::Auto => "AUTO",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum QueryClause {
    /// Analyzed full-text match of `text` against `field`.
    Match { field: String, text: String },
    /// Analyzed match of `value` against `field`, tolerating `fuzziness` edits per term.
    Fuzzy {
        field: String,
        value: String,
        fuzziness: Fuzziness,
    },
}

impl QueryClause {
    pub fn is_fuzzy(&self) -> bool {
        matches!(self, QueryClause::Fuzzy { .. })
    }
}

/// One bounded search request against the index.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexQuery {
    pub clause: QueryClause,
    pub from: u64,
    pub size: u32,
}

/// Read/write capability over a searchable product store.
#[async_trait]
pub trait DocumentIndex: Send + Sync {
    /// Ensure the index exists. Returns `true` if it had to be created.
    async fn create(&self) -> Result<bool, IndexError>;

    async fn search(&self, query: &IndexQuery) -> Result<SearchHits, IndexError>;

    async fn get(&self, id: &str) -> Result<Option<Product>, IndexError>;

    /// Store a new document and return the id the index assigned to it.
    async fn index(&self, product: &Product) -> Result<String, IndexError>;

    /// Make every prior write visible to search.
    async fn refresh(&self) -> Result<(), IndexError>;

    async fn health(&self) -> Result<Value, IndexError>;
}
