use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod state;

use docsearch_gateway::config;
use docsearch_gateway::extract::MemoryExtractor;
use docsearch_gateway::index::memory::{AbstractParams, MemoryIndex};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "docsearch_gateway=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration / 加载配置
    let app_config = config::load_config().expect("Failed to load configuration");
    tracing::info!(
        "Server will listen on {}:{}",
        app_config.server.host,
        app_config.server.port
    );

    let abstract_params = AbstractParams {
        max_chars: app_config.index.abstract_max_chars,
        context_words: app_config.index.abstract_context_words,
    };

    // Load the document set; an absent data file means an empty index,
    // the content routes still serve local files.
    // 加载文档集；数据文件缺失时索引为空，内容路由仍可服务本地文件。
    let data_file = app_config.get_index_data_file();
    let index = if data_file.exists() {
        let index = MemoryIndex::load(&data_file, abstract_params)?;
        tracing::info!("Loaded {} documents from {:?}", index.doc_count(), data_file);
        index
    } else {
        tracing::warn!("Index data file {:?} not found, starting empty", data_file);
        MemoryIndex::new(Vec::new(), abstract_params)
    };

    let state = Arc::new(AppState {
        index: Arc::new(index),
        extractor: Arc::new(MemoryExtractor),
    });

    let app = Router::new()
        .route("/api/health", get(api::server::health_check))
        .route("/search", post(api::search::search))
        .route("/contents/:id", get(api::contents::contents))
        .route("/contents/:id/:part", get(api::contents::contents_part))
        .route("/text/:id", get(api::contents::text))
        .route("/text/:id/:part", get(api::contents::text_part))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let bind_addr = app_config.get_bind_address();
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;

    tracing::info!("Server running at http://{}", bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
