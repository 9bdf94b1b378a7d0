//! Embedding Provider — the injectable "text in, vector out" capability.
//!
//! Providers are constructed once at startup and shared as
//! `Arc<dyn EmbeddingProvider>`. Backends:
//! - `HttpEmbeddingProvider`: OpenAI-compatible `/v1/embeddings` endpoint.
//! - `HashingEmbeddingProvider`: deterministic feature hashing, no network.
//!   Buckets come from 64-bit FNV-1a over UTF-8 bytes, so vectors stay
//!   identical across toolchain upgrades.
//! - `CachedEmbeddingProvider`: bounded in-memory cache around any provider.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;

/// Ordered, fixed-length embedding. Only vectors from the same provider are comparable.
pub type EmbeddingVector = Vec<f32>;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Embedding provider returned no vector")]
    EmptyResponse,

    #[error("Expected a {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Cannot embed empty text")]
    EmptyInput,
}

/// Trait for text embedding services.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds `text`. Deterministic for a fixed underlying model.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError>;

    /// Model identifier, for logs and responses.
    fn model_name(&self) -> &str;

    /// Length of every vector this provider returns.
    fn dimension(&self) -> usize;
}

/// Rejects vectors whose length differs from the provider's declared dimension.
pub fn check_dimension(
    vector: EmbeddingVector,
    expected: usize,
) -> Result<EmbeddingVector, EmbeddingError> {
    if vector.len() == expected {
        Ok(vector)
    } else {
        Err(EmbeddingError::DimensionMismatch {
            expected,
            actual: vector.len(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HttpEmbeddingProvider
// ────────────────────────────────────────────────────────────────────────────

pub struct HttpEmbeddingProvider {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
    dimension: usize,
}

impl HttpEmbeddingProvider {
    pub fn new(
        api_url: String,
        api_key: String,
        model: String,
        dimension: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()?;
        Ok(Self {
            client,
            api_url,
            api_key,
            model,
            dimension,
        })
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorEnvelope {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

#[async_trait]
impl EmbeddingProvider for HttpEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        if text.trim().is_empty() {
            return Err(EmbeddingError::EmptyInput);
        }

        let response = self
            .client
            .post(&self.api_url)
            .bearer_auth(&self.api_key)
            .json(&serde_json::json!({
                "model": self.model,
                "input": text,
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorEnvelope>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: EmbeddingResponse = response.json().await?;
        let vector = parsed
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)?;

        debug!(model = %self.model, chars = text.len(), "embedding computed");
        check_dimension(vector, self.dimension)
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ────────────────────────────────────────────────────────────────────────────
// HashingEmbeddingProvider
// ────────────────────────────────────────────────────────────────────────────

/// Offline embedder: hashes character trigrams and whole words into a fixed
/// number of buckets, then L2-normalises. Blank text maps to the zero vector.
pub struct HashingEmbeddingProvider {
    dimension: usize,
}

impl HashingEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
        }
    }

    fn bucket(&self, feature: &[u8]) -> usize {
        (fnv1a_64(feature) % self.dimension as u64) as usize
    }

    fn vectorize(&self, text: &str) -> EmbeddingVector {
        let mut vector = vec![0.0_f32; self.dimension];
        let normalized = text.to_lowercase();

        for word in normalized.split_whitespace() {
            let bounds: Vec<usize> = word
                .char_indices()
                .map(|(i, _)| i)
                .chain(std::iter::once(word.len()))
                .collect();
            for window in bounds.windows(4) {
                vector[self.bucket(&word.as_bytes()[window[0]..window[3]])] += 1.0;
            }
            // Words carry more signal than their fragments.
            vector[self.bucket(word.as_bytes())] += 2.0;
        }

        let magnitude = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if magnitude > 0.0 {
            for v in &mut vector {
                *v /= magnitude;
            }
        }
        vector
    }
}

const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

fn fnv1a_64(bytes: &[u8]) -> u64 {
    bytes.iter().fold(FNV_OFFSET_BASIS, |hash, &byte| {
        (hash ^ u64::from(byte)).wrapping_mul(FNV_PRIME)
    })
}

#[async_trait]
impl EmbeddingProvider for HashingEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        Ok(self.vectorize(text))
    }

    fn model_name(&self) -> &str {
        "feature-hashing"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

// ────────────────────────────────────────────────────────────────────────────
// CachedEmbeddingProvider
// ────────────────────────────────────────────────────────────────────────────

/// Caches embeddings by exact text. Once `max_entries` is reached new texts are
/// still embedded but no longer stored.
pub struct CachedEmbeddingProvider {
    inner: Arc<dyn EmbeddingProvider>,
    cache: RwLock<HashMap<String, EmbeddingVector>>,
    max_entries: usize,
}

impl CachedEmbeddingProvider {
    pub fn new(inner: Arc<dyn EmbeddingProvider>, max_entries: usize) -> Self {
        Self {
            inner,
            cache: RwLock::new(HashMap::new()),
            max_entries,
        }
    }
}

#[async_trait]
impl EmbeddingProvider for CachedEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EmbeddingError> {
        {
            let cache = self.cache.read().await;
            if let Some(vector) = cache.get(text) {
                return Ok(vector.clone());
            }
        }

        let vector = self.inner.embed(text).await?;

        let mut cache = self.cache.write().await;
        if cache.len() < self.max_entries {
            cache.insert(text.to_string(), vector.clone());
        }
        Ok(vector)
    }

    fn model_name(&self) -> &str {
        self.inner.model_name()
    }

    fn dimension(&self) -> usize {
        self.inner.dimension()
    }
}
