use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::sync::Arc;
use std::time::Duration;

use catalog_search::api::{AppState, create_router};
use catalog_search::config::CONFIG;
use catalog_search::index::{DocumentIndex, ElasticsearchIndex, InMemoryIndex};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Backend {
    Elasticsearch,
    Memory,
}

/// Catalog search API server
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Port to listen on (defaults to $PORT or 3001)
    #[arg(long)]
    port: Option<u16>,

    /// Document index backend
    #[arg(long, value_enum, default_value_t = Backend::Elasticsearch)]
    backend: Backend,

    /// Elasticsearch base URL (defaults to $ELASTICSEARCH_URL)
    #[arg(long)]
    elasticsearch_url: Option<String>,

    /// Index name (defaults to $INDEX_NAME or "products")
    #[arg(long)]
    index: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber (handles both tracing and log crate)
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .with_target(true)
        .init();

    let args = Args::parse();

    let index: Arc<dyn DocumentIndex> = match args.backend {
        Backend::Elasticsearch => {
            let url = args
                .elasticsearch_url
                .as_deref()
                .unwrap_or(&CONFIG.elasticsearch_url);
            let name = args.index.as_deref().unwrap_or(&CONFIG.index_name);
            Arc::new(ElasticsearchIndex::new(
                url,
                name,
                Duration::from_secs(CONFIG.elasticsearch_timeout_secs),
            )?)
        }
        Backend::Memory => Arc::new(InMemoryIndex::default()),
    };

    // a missing index should not keep the API from starting; searches will
    // report the failure until it is reachable
    match index.create().await {
        Ok(true) => log::info!("Created document index"),
        Ok(false) => log::info!("Document index ready"),
        Err(e) => log::warn!("Could not prepare document index: {:#}", e),
    }

    let state = Arc::new(AppState::new(index, CONFIG.max_page_size));
    let app = create_router(state);

    let port = args.port.unwrap_or(CONFIG.port);
    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port))
        .await
        .with_context(|| format!("Failed to bind port {port}"))?;
    log::info!("Server running on port {}", port);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
