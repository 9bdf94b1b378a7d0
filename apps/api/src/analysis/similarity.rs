//! Similarity Scorer — semantic similarity between one résumé and one job description.

use std::sync::Arc;

use crate::analysis::embedding::{EmbeddingError, EmbeddingProvider};

/// Decimal places kept on raw cosine similarity.
pub const RAW_SCORE_DECIMALS: i32 = 4;

/// Cosine similarity clamped to [-1, 1].
///
/// A zero-magnitude vector has no direction and scores 0.0. Vectors of
/// different lengths come from different providers and are rejected.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f64, EmbeddingError> {
    if a.len() != b.len() {
        return Err(EmbeddingError::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);
    for (&x, &y) in a.iter().zip(b) {
        let (x, y) = (f64::from(x), f64::from(y));
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }

    let denominator = norm_a.sqrt() * norm_b.sqrt();
    if denominator == 0.0 || !denominator.is_finite() {
        return Ok(0.0);
    }
    Ok((dot / denominator).clamp(-1.0, 1.0))
}

/// Rounds half away from zero to `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10_f64.powi(decimals);
    (value * factor).round() / factor
}

/// Pairwise scorer. Holds no cache: every call embeds both texts.
#[derive(Clone)]
pub struct SimilarityScorer {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SimilarityScorer {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Raw similarity in [-1, 1], rounded to 4 decimals.
    /// Returns 0.0 without touching the provider when either text is blank.
    pub async fn score(
        &self,
        resume_text: &str,
        job_description: &str,
    ) -> Result<f64, EmbeddingError> {
        if resume_text.trim().is_empty() || job_description.trim().is_empty() {
            return Ok(0.0);
        }

        let resume_vector = self.embedder.embed(resume_text).await?;
        let job_vector = self.embedder.embed(job_description).await?;
        let similarity = cosine_similarity(&resume_vector, &job_vector)?;

        Ok(round_to(similarity, RAW_SCORE_DECIMALS).clamp(-1.0, 1.0))
    }
}
