use std::sync::Arc;

use crate::analysis::classification::Classifier;
use crate::analysis::embedding::EmbeddingProvider;
use crate::analysis::ranking::RankingEngine;
use crate::analysis::similarity::SimilarityScorer;

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every collaborator is constructed once in `main` and shared by handle.
#[derive(Clone)]
pub struct AppState {
    pub embedder: Arc<dyn EmbeddingProvider>,
    pub scorer: SimilarityScorer,
    pub ranker: RankingEngine,
    /// Pluggable classifier. Default: EmbeddingClassifier. Swap via CLASSIFIER_BACKEND.
    pub classifier: Arc<dyn Classifier>,
}

impl AppState {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>, classifier: Arc<dyn Classifier>) -> Self {
        Self {
            scorer: SimilarityScorer::new(embedder.clone()),
            ranker: RankingEngine::new(embedder.clone()),
            embedder,
            classifier,
        }
    }
}
