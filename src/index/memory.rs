use async_trait::async_trait;
use dashmap::DashMap;
use nanoid::nanoid;
use serde_json::{Value, json};
use std::cmp::Ordering;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering};

use crate::analyzer::TextAnalyzer;
use crate::data_models::{Product, SearchHit, SearchHits};
use crate::error::IndexError;

use super::{DocumentIndex, Fuzziness, IndexQuery, QueryClause};

struct StoredDocument {
    // insertion order, used to break score ties deterministically
    seq: u64,
    source: Product,
}

/// Process-local document index. Writes are visible immediately, so
/// `refresh` has nothing to do.
pub struct InMemoryIndex {
    documents: DashMap<String, StoredDocument>,
    next_seq: AtomicU64,
    created: AtomicBool,
    analyzer: TextAnalyzer,
}

impl Default for InMemoryIndex {
    fn default() -> Self {
        Self::new(TextAnalyzer::default())
    }
}

impl InMemoryIndex {
    pub fn new(analyzer: TextAnalyzer) -> Self {
        Self {
            documents: DashMap::new(),
            next_seq: AtomicU64::new(0),
            created: AtomicBool::new(false),
            analyzer,
        }
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Analyzed full-text match with OR semantics: any shared term matches.
    /// More shared terms and shorter fields score higher.
    fn match_score(&self, text: &str, field_value: &str) -> Option<f64> {
        let mut query_terms = self.analyzer.terms(text);
        query_terms.sort();
        query_terms.dedup();

        let field_terms = self.analyzer.terms(field_value);
        let matched = query_terms
            .iter()
            .filter(|term| field_terms.contains(term))
            .count();
        if matched == 0 {
            return None;
        }
        Some(matched as f64 / (field_terms.len() as f64).sqrt())
    }

    /// Each query term matches a field term within its edit budget;
    /// closer matches score higher.
    fn fuzzy_score(&self, value: &str, fuzziness: Fuzziness, field_value: &str) -> Option<f64> {
        let field_terms = self.analyzer.terms(field_value);
        let mut score = 0.0;
        let mut matched = false;

        for term in self.analyzer.terms(value) {
            let term_len = term.chars().count();
            let budget = fuzziness.max_edits(term_len);
            let best = field_terms
                .iter()
                .map(|candidate| strsim::osa_distance(&term, candidate))
                .filter(|distance| *distance <= budget)
                .min();
            if let Some(distance) = best {
                matched = true;
                score += 1.0 - distance as f64 / term_len.max(1) as f64;
            }
        }

        matched.then_some(score)
    }

    fn score(&self, clause: &QueryClause, source: &Product) -> Option<f64> {
        match clause {
            QueryClause::Match { field, text } => {
                let field_value = source.get(field)?.as_str()?;
                self.match_score(text, field_value)
            }
            QueryClause::Fuzzy {
                field,
                value,
                fuzziness,
            } => {
                let field_value = source.get(field)?.as_str()?;
                self.fuzzy_score(value, *fuzziness, field_value)
            }
        }
    }
}

#[async_trait]
impl DocumentIndex for InMemoryIndex {
    async fn create(&self) -> Result<bool, IndexError> {
        Ok(!self.created.swap(true, AtomicOrdering::SeqCst))
    }

    async fn search(&self, query: &IndexQuery) -> Result<SearchHits, IndexError> {
        let mut scored: Vec<(f64, u64, SearchHit)> = self
            .documents
            .iter()
            .filter_map(|entry| {
                let score = self.score(&query.clause, &entry.source)?;
                Some((
                    score,
                    entry.seq,
                    SearchHit {
                        id: entry.key().clone(),
                        score: Some(score),
                        source: entry.source.clone(),
                    },
                ))
            })
            .collect();

        scored.sort_by(|a, b| {
            b.0.partial_cmp(&a.0)
                .unwrap_or(Ordering::Equal)
                .then(a.1.cmp(&b.1))
        });

        let total = scored.len() as u64;
        let from = usize::try_from(query.from).unwrap_or(usize::MAX);
        let hits = scored
            .into_iter()
            .skip(from)
            .take(query.size as usize)
            .map(|(_, _, hit)| hit)
            .collect();

        Ok(SearchHits { total, hits })
    }

    async fn get(&self, id: &str) -> Result<Option<Product>, IndexError> {
        Ok(self.documents.get(id).map(|doc| doc.source.clone()))
    }

    async fn index(&self, product: &Product) -> Result<String, IndexError> {
        let id = nanoid!(20);
        let seq = self.next_seq.fetch_add(1, AtomicOrdering::SeqCst);
        self.documents.insert(
            id.clone(),
            StoredDocument {
                seq,
                source: product.clone(),
            },
        );
        log::debug!("Indexed document {} in memory", id);
        Ok(id)
    }

    async fn refresh(&self) -> Result<(), IndexError> {
        Ok(())
    }

    async fn health(&self) -> Result<Value, IndexError> {
        Ok(json!({
            "status": "green",
            "backend": "memory",
            "documents": self.documents.len(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::NAME_FIELD;

    fn product(name: &str) -> Product {
        serde_json::from_value(json!({ "name": name, "price": 1 })).unwrap()
    }

    async fn seeded(names: &[&str]) -> InMemoryIndex {
        let index = InMemoryIndex::default();
        for name in names {
            index.index(&product(name)).await.unwrap();
        }
        index
    }

    fn match_query(text: &str, from: u64, size: u32) -> IndexQuery {
        IndexQuery {
            clause: QueryClause::Match {
                field: NAME_FIELD.into(),
                text: text.into(),
            },
            from,
            size,
        }
    }

    fn fuzzy_query(value: &str, from: u64, size: u32) -> IndexQuery {
        IndexQuery {
            clause: QueryClause::Fuzzy {
                field: NAME_FIELD.into(),
                value: value.into(),
                fuzziness: Fuzziness::Auto,
            },
            from,
            size,
        }
    }

    fn names(hits: &SearchHits) -> Vec<&str> {
        hits.hits.iter().filter_map(|h| h.source.name()).collect()
    }

    #[tokio::test]
    async fn test_match_is_case_insensitive_or() {
        let index = seeded(&["iPhone 13", "iPhone 14 Pro Max", "Dell XPS 13"]).await;

        let result = index.search(&match_query("IPHONE", 0, 10)).await.unwrap();
        assert_eq!(result.total, 2);

        // "iphone" OR "13": all three share a term, the full match ranks first
        let result = index.search(&match_query("iPhone 13", 0, 10)).await.unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(names(&result)[0], "iPhone 13");
    }

    #[tokio::test]
    async fn test_match_has_no_edit_tolerance() {
        let index = seeded(&["iPhone 13"]).await;
        let result = index.search(&match_query("iPhon", 0, 10)).await.unwrap();
        assert_eq!(result.total, 0);
        assert!(result.hits.is_empty());
    }

    #[tokio::test]
    async fn test_fuzzy_respects_auto_budget() {
        let index = seeded(&["iPhone 13", "Sony Alpha 7 IV"]).await;

        // 5 chars, one edit away
        let result = index.search(&fuzzy_query("iPhon", 0, 10)).await.unwrap();
        assert_eq!(names(&result), vec!["iPhone 13"]);

        // 4 chars, two edits away: over budget
        let result = index.search(&fuzzy_query("sonn", 0, 10)).await.unwrap();
        assert_eq!(result.total, 1);
        let result = index.search(&fuzzy_query("snyy", 0, 10)).await.unwrap();
        assert_eq!(result.total, 0);

        // 2 chars must match exactly
        let result = index.search(&fuzzy_query("iw", 0, 10)).await.unwrap();
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_fuzzy_counts_transposition_as_one_edit() {
        let index = seeded(&["Samsung Galaxy Watch 5"]).await;
        let result = index.search(&fuzzy_query("wacth", 0, 10)).await.unwrap();
        assert_eq!(result.total, 1);
    }

    #[tokio::test]
    async fn test_pagination_window_and_total() {
        let index = seeded(&[
            "Apple Watch Series 8",
            "Apple Watch SE",
            "Apple Watch Ultra",
            "Apple Watch Series 7",
        ])
        .await;

        let first = index.search(&match_query("watch", 0, 3)).await.unwrap();
        let second = index.search(&match_query("watch", 3, 3)).await.unwrap();
        assert_eq!(first.total, 4);
        assert_eq!(second.total, 4);
        assert_eq!(first.hits.len(), 3);
        assert_eq!(second.hits.len(), 1);

        let past_end = index.search(&match_query("watch", 40, 3)).await.unwrap();
        assert_eq!(past_end.total, 4);
        assert!(past_end.hits.is_empty());
    }

    #[tokio::test]
    async fn test_ties_keep_insertion_order() {
        let index = seeded(&["Sony WF-1000XM4", "Sony WH-1000XM5"]).await;
        let result = index.search(&match_query("sony", 0, 10)).await.unwrap();
        assert_eq!(names(&result), vec!["Sony WF-1000XM4", "Sony WH-1000XM5"]);
    }

    #[tokio::test]
    async fn test_documents_without_name_never_match() {
        let index = InMemoryIndex::default();
        let nameless: Product = serde_json::from_value(json!({ "title": "iPhone" })).unwrap();
        index.index(&nameless).await.unwrap();
        let result = index.search(&match_query("iphone", 0, 10)).await.unwrap();
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_index_get_round_trip() {
        let index = InMemoryIndex::default();
        let p = product("Logitech MX Master 3");
        let id = index.index(&p).await.unwrap();
        assert_eq!(id.len(), 20);
        assert_eq!(index.get(&id).await.unwrap(), Some(p));
        assert_eq!(index.get("missing").await.unwrap(), None);
        assert_eq!(index.len(), 1);
    }

    #[tokio::test]
    async fn test_create_reports_first_call_only() {
        let index = InMemoryIndex::default();
        assert!(index.create().await.unwrap());
        assert!(!index.create().await.unwrap());
    }
}
