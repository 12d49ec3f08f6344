use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;

use crate::data_models::{Product, SearchHit, SearchHits};
use crate::error::IndexError;

use super::{DocumentIndex, IndexQuery, QueryClause};

/// Document index backed by an Elasticsearch cluster, spoken to over its REST API.
#[derive(Debug, Clone)]
pub struct ElasticsearchIndex {
    client: Client,
    base_url: Url,
    index_name: String,
}

#[derive(Deserialize)]
struct SearchResponse {
    hits: HitsEnvelope,
}

#[derive(Deserialize)]
struct HitsEnvelope {
    total: TotalHits,
    hits: Vec<SearchHit>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TotalHits {
    Tracked { value: u64 },
    // pre-7.0 clusters report a bare number
    Count(u64),
}

impl TotalHits {
    fn value(&self) -> u64 {
        match self {
            TotalHits::Tracked { value } | TotalHits::Count(value) => *value,
        }
    }
}

#[derive(Deserialize)]
struct GetResponse {
    found: Option<bool>,
    #[serde(rename = "_source")]
    source: Option<Product>,
}

#[derive(Deserialize)]
struct IndexResponse {
    #[serde(rename = "_id")]
    id: String,
}

impl ElasticsearchIndex {
    pub fn new(base_url: &str, index_name: &str, timeout: Duration) -> Result<Self, IndexError> {
        let base_url = Url::parse(base_url).map_err(|e| IndexError::Url(format!("{base_url}: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(IndexError::Url(base_url.to_string()));
        }
        let client = Client::builder().timeout(timeout).build()?;

        log::info!(
            "Using Elasticsearch index {:?} at {}",
            index_name,
            base_url
        );

        Ok(Self {
            client,
            base_url,
            index_name: index_name.to_string(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, IndexError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| IndexError::Url(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// Render a query in the engine's search DSL.
    pub fn search_body(query: &IndexQuery) -> Value {
        let clause = match &query.clause {
            QueryClause::Match { field, text } => json!({ "match": { field: text } }),
            QueryClause::Fuzzy {
                field,
                value,
                fuzziness,
            } => json!({
                // analyzed like the indexed field, so case and word breaks line up
                "match": { field: { "query": value, "fuzziness": fuzziness.as_str() } }
            }),
        };
        json!({
            "query": clause,
            "from": query.from,
            "size": query.size,
            // without this the engine caps totals at 10k
            "track_total_hits": true,
        })
    }
}

async fn error_for_status(response: Response) -> Result<Response, IndexError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(IndexError::Status { status, body })
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T, IndexError> {
    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl DocumentIndex for ElasticsearchIndex {
    async fn create(&self) -> Result<bool, IndexError> {
        let url = self.endpoint(&[self.index_name.as_str()])?;

        let exists = self.client.head(url.clone()).send().await?;
        let status = exists.status();
        if status.is_success() {
            log::debug!("Index {} already exists", self.index_name);
            return Ok(false);
        }
        if status != StatusCode::NOT_FOUND {
            let body = exists.text().await.unwrap_or_default();
            return Err(IndexError::Status { status, body });
        }

        let response = self.client.put(url).send().await?;
        match error_for_status(response).await {
            Ok(_) => {
                log::info!("Created index {}", self.index_name);
                Ok(true)
            }
            // lost a race with another instance creating the same index
            Err(IndexError::Status { status, body })
                if status == StatusCode::BAD_REQUEST
                    && body.contains("resource_already_exists_exception") =>
            {
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn search(&self, query: &IndexQuery) -> Result<SearchHits, IndexError> {
        let url = self.endpoint(&[self.index_name.as_str(), "_search"])?;
        let response = self
            .client
            .post(url)
            .json(&Self::search_body(query))
            .send()
            .await?;
        let parsed: SearchResponse = decode(error_for_status(response).await?).await?;

        Ok(SearchHits {
            total: parsed.hits.total.value(),
            hits: parsed.hits.hits,
        })
    }

    async fn get(&self, id: &str) -> Result<Option<Product>, IndexError> {
        let url = self.endpoint(&[self.index_name.as_str(), "_doc", id])?;
        let response = self.client.get(url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            let body = response.text().await.unwrap_or_default();
            // a missing document answers {"found": false}; anything else
            // (e.g. a missing index) is a backend failure
            return match serde_json::from_str::<GetResponse>(&body) {
                Ok(GetResponse {
                    found: Some(false),
                    ..
                }) => Ok(None),
                _ => Err(IndexError::Status {
                    status: StatusCode::NOT_FOUND,
                    body,
                }),
            };
        }

        let doc: GetResponse = decode(error_for_status(response).await?).await?;
        Ok(match doc.found {
            Some(false) => None,
            _ => doc.source,
        })
    }

    async fn index(&self, product: &Product) -> Result<String, IndexError> {
        let url = self.endpoint(&[self.index_name.as_str(), "_doc"])?;
        let response = self.client.post(url).json(product).send().await?;
        let indexed: IndexResponse = decode(error_for_status(response).await?).await?;
        log::debug!("Indexed document {}", indexed.id);
        Ok(indexed.id)
    }

    async fn refresh(&self) -> Result<(), IndexError> {
        let url = self.endpoint(&[self.index_name.as_str(), "_refresh"])?;
        let response = self.client.post(url).send().await?;
        error_for_status(response).await?;
        Ok(())
    }

    async fn health(&self) -> Result<Value, IndexError> {
        let url = self.endpoint(&["_cluster", "health"])?;
        let response = self.client.get(url).send().await?;
        decode(error_for_status(response).await?).await
    }
}
