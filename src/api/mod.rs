use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::index::DocumentIndex;
use crate::resolver::QueryResolver;

pub mod handlers;
pub mod models;

/// Shared, read-only state handed to every handler.
pub struct AppState {
    pub resolver: QueryResolver,
    pub max_page_size: u32,
}

impl AppState {
    pub fn new(index: Arc<dyn DocumentIndex>, max_page_size: u32) -> Self {
        Self {
            resolver: QueryResolver::new(index),
            max_page_size,
        }
    }

    pub fn index(&self) -> &Arc<dyn DocumentIndex> {
        self.resolver.index()
    }
}

pub fn create_router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/search", get(handlers::search_handler))
        .route("/api/products", post(handlers::create_product_handler))
        .route("/api/products/:id", get(handlers::get_product_handler))
        .route("/health", get(handlers::health_handler))
        .with_state(state)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
}
