//! Ranking Engine — scores a batch of résumés against one job description.
//!
//! The job description is embedded once and reused for every résumé. A
//! provider failure on one résumé is recorded and the rest of the batch is
//! still scored; only a failure to embed the job description aborts the call.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::analysis::embedding::{EmbeddingError, EmbeddingProvider};
use crate::analysis::similarity::{cosine_similarity, round_to, RAW_SCORE_DECIMALS};

/// Decimal places kept on the user-facing score.
pub const DISPLAY_SCORE_DECIMALS: i32 = 2;

// ────────────────────────────────────────────────────────────────────────────
// Data models
// ────────────────────────────────────────────────────────────────────────────

/// One uploaded résumé, already decoded to text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeInput {
    pub filename: String,
    pub text: String,
}

/// Qualitative band for a display score. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Tier {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl Tier {
    /// `>= 0.76` Excellent, `>= 0.51` Good, `>= 0.26` Fair, otherwise Poor.
    pub fn from_display_score(score: f64) -> Self {
        if score >= 0.76 {
            Tier::Excellent
        } else if score >= 0.51 {
            Tier::Good
        } else if score >= 0.26 {
            Tier::Fair
        } else {
            Tier::Poor
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::Good => "Good",
            Tier::Fair => "Fair",
            Tier::Poor => "Poor",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Maps a raw similarity in [-1, 1] onto [0, 1], rounded to 2 decimals.
///
/// Rounding is half-away-from-zero on the binary `f64` value, so an apparent
/// half such as 0.565 may round down when its nearest double sits below it.
pub fn display_score(raw_score: f64) -> f64 {
    let scaled = (raw_score.clamp(-1.0, 1.0) + 1.0) / 2.0;
    round_to(scaled, DISPLAY_SCORE_DECIMALS).clamp(0.0, 1.0)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredResume {
    pub filename: String,
    /// Cosine similarity, 4 decimals, in [-1, 1].
    pub raw_score: f64,
    /// `(raw_score + 1) / 2`, 2 decimals, in [0, 1].
    pub display_score: f64,
}

impl ScoredResume {
    pub fn new(filename: impl Into<String>, raw_score: f64) -> Self {
        let raw_score = raw_score.clamp(-1.0, 1.0);
        Self {
            filename: filename.into(),
            raw_score,
            display_score: display_score(raw_score),
        }
    }

    pub fn tier(&self) -> Tier {
        Tier::from_display_score(self.display_score)
    }
}

/// A résumé that could not be scored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RankFailure {
    pub filename: String,
    pub error: String,
}

/// Ranked results plus any per-résumé failures, both in a defined order.
#[derive(Debug, Clone, Default)]
pub struct RankOutcome {
    /// Descending by display score; ties keep input order.
    pub ranked: Vec<ScoredResume>,
    /// Input order.
    pub failures: Vec<RankFailure>,
}

/// Stable descending sort by display score. Equal scores keep their relative order.
pub fn sort_ranked(scored: &mut [ScoredResume]) {
    scored.sort_by(|a, b| b.display_score.total_cmp(&a.display_score));
}

// ────────────────────────────────────────────────────────────────────────────
// Engine
// ────────────────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct RankingEngine {
    embedder: Arc<dyn EmbeddingProvider>,
}

impl RankingEngine {
    pub fn new(embedder: Arc<dyn EmbeddingProvider>) -> Self {
        Self { embedder }
    }

    /// Scores every résumé against `job_description` and orders the results.
    ///
    /// A blank job description means no scoring was requested and yields an
    /// empty outcome. Blank résumé text scores 0.0 without an embedding call.
    pub async fn rank(
        &self,
        resumes: &[ResumeInput],
        job_description: &str,
    ) -> Result<RankOutcome, EmbeddingError> {
        if job_description.trim().is_empty() {
            return Ok(RankOutcome::default());
        }

        let job_vector = self.embedder.embed(job_description).await?;

        let mut outcome = RankOutcome::default();
        for resume in resumes {
            match self.raw_score(&resume.text, &job_vector).await {
                Ok(raw) => outcome.ranked.push(ScoredResume::new(&resume.filename, raw)),
                Err(e) => {
                    warn!("Scoring failed for {}: {e}", resume.filename);
                    outcome.failures.push(RankFailure {
                        filename: resume.filename.clone(),
                        error: e.to_string(),
                    });
                }
            }
        }

        sort_ranked(&mut outcome.ranked);
        debug!(
            "Ranked {} resumes ({} failed) with {}",
            outcome.ranked.len(),
            outcome.failures.len(),
            self.embedder.model_name()
        );
        Ok(outcome)
    }

    async fn raw_score(&self, text: &str, job_vector: &[f32]) -> Result<f64, EmbeddingError> {
        if text.trim().is_empty() {
            return Ok(0.0);
        }
        let resume_vector = self.embedder.embed(text).await?;
        let similarity = cosine_similarity(&resume_vector, job_vector)?;
        Ok(round_to(similarity, RAW_SCORE_DECIMALS))
    }
}
