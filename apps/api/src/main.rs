mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::classification::{
    Classifier, EmbeddingClassifier, LlmClassifier, JOB_CATEGORIES,
};
use crate::analysis::embedding::{
    CachedEmbeddingProvider, EmbeddingProvider, HashingEmbeddingProvider, HttpEmbeddingProvider,
};
use crate::config::{ClassifierBackend, Config, EmbeddingBackend};
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails fast on malformed or missing env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume analyzer v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the embedding provider once; every scorer shares it
    let embedder = build_embedder(&config)?;
    info!(
        "Embedding provider initialized (model: {}, dimension: {})",
        embedder.model_name(),
        embedder.dimension()
    );

    // Initialize classifier (EmbeddingClassifier by default — swap via CLASSIFIER_BACKEND)
    let classifier = build_classifier(&config, embedder.clone()).await?;
    info!("Classifier initialized (backend: {})", classifier.backend());

    let state = AppState::new(embedder, classifier);

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the upload UI has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_embedder(config: &Config) -> Result<Arc<dyn EmbeddingProvider>> {
    let base: Arc<dyn EmbeddingProvider> = match config.embedding_backend {
        EmbeddingBackend::Hash => {
            Arc::new(HashingEmbeddingProvider::new(config.embedding_dimension))
        }
        EmbeddingBackend::Http => Arc::new(HttpEmbeddingProvider::new(
            config.embedding_api_url.clone(),
            config.embedding_api_key.clone().unwrap_or_default(),
            config.embedding_model.clone(),
            config.embedding_dimension,
        )?),
    };

    if config.embedding_cache_size == 0 {
        return Ok(base);
    }
    info!("Embedding cache enabled ({} entries)", config.embedding_cache_size);
    Ok(Arc::new(CachedEmbeddingProvider::new(
        base,
        config.embedding_cache_size,
    )))
}

async fn build_classifier(
    config: &Config,
    embedder: Arc<dyn EmbeddingProvider>,
) -> Result<Arc<dyn Classifier>> {
    match config.classifier_backend {
        ClassifierBackend::Embedding => {
            let classifier = EmbeddingClassifier::new(embedder, JOB_CATEGORIES).await?;
            Ok(Arc::new(classifier))
        }
        ClassifierBackend::Llm => {
            let llm = LlmClient::new(config.anthropic_api_key.clone().unwrap_or_default())?;
            info!("LLM client initialized (model: {})", llm_client::MODEL);
            Ok(Arc::new(LlmClassifier(llm)))
        }
    }
}
