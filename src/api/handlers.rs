use axum::{
    Json,
    extract::{
        Path, Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    http::StatusCode,
};
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::Instant;

use crate::data_models::Product;
use crate::error::{ApiError, ApiResult, ValidationError};
use crate::pagination::Pagination;
use crate::resolver::SearchQuery;
use crate::response::SearchResult;

use super::AppState;
use super::models::{CreateProductResponse, HealthResponse, SearchParams};

pub async fn search_handler(
    State(state): State<Arc<AppState>>,
    params: Result<Query<SearchParams>, QueryRejection>,
) -> ApiResult<Json<SearchResult>> {
    let start = Instant::now();
    let Query(params) = params.map_err(|e| ValidationError::new(e.body_text()))?;

    let pagination = Pagination::from_params(
        params.page.as_deref(),
        params.limit.as_deref(),
        state.max_page_size,
    )?;
    let query = SearchQuery::new(params.q.as_deref(), pagination)?;

    let result = state.resolver.search(&query).await?;

    log::info!(
        "search q={:?} page={} exact={} total={} in {}ms",
        query.text(),
        result.page,
        result.exact,
        result.total,
        start.elapsed().as_millis()
    );
    Ok(Json(result))
}

pub async fn get_product_handler(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let product = state
        .index()
        .get(&id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let mut body = Map::new();
    body.insert("id".to_string(), Value::String(id));
    body.extend(product.into_fields());
    Ok(Json(Value::Object(body)))
}

pub async fn create_product_handler(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<CreateProductResponse>)> {
    let body = match body {
        Ok(Json(body)) => body,
        // no JSON payload at all reads as an empty product
        Err(JsonRejection::MissingJsonContentType(_)) => Value::Object(Map::new()),
        Err(e) => return Err(ValidationError::new(e.body_text()).into()),
    };
    let Value::Object(fields) = body else {
        return Err(ValidationError::new("Product must be a JSON object").into());
    };
    let product = Product::new(fields);

    let missing = product.missing_fields();
    if !missing.is_empty() {
        return Err(ValidationError::new(format!(
            "Missing required fields: {}",
            missing.join(", ")
        ))
        .into());
    }

    let id = state.index().index(&product).await?;
    // make the new product searchable right away
    state.index().refresh().await?;

    log::info!("Added product {} ({:?})", id, product.name());

    Ok((
        StatusCode::CREATED,
        Json(CreateProductResponse {
            message: "Product added successfully".to_string(),
            id,
            product,
        }),
    ))
}

pub async fn health_handler(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    match state.index().health().await {
        Ok(health) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "healthy",
                index: Some(health),
                message: None,
                error: None,
            }),
        ),
        Err(e) => {
            log::error!("Health check failed: {:#}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(HealthResponse {
                    status: "unhealthy",
                    index: None,
                    message: Some("Failed to connect to document index".to_string()),
                    error: Some(e.to_string()),
                }),
            )
        }
    }
}
