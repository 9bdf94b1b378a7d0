//! Axum route handlers for the Analysis API.

use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::analysis::extractor::{extract, ExtractionResult};
use crate::analysis::ranking::{display_score, RankFailure, RankOutcome, ResumeInput, Tier};
use crate::errors::AppError;
use crate::state::AppState;

/// Shown instead of a ranking when no job description was supplied.
pub const MISSING_JD_NOTICE: &str = "Enter a job description to get resume scores.";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct TextRequest {
    pub text: String,
}

#[derive(Debug, Serialize)]
pub struct ClassifyResponse {
    pub category: String,
    pub backend: String,
}

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    pub resume_text: String,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct ScoreResponse {
    pub raw_score: f64,
    pub display_score: f64,
    pub tier: Tier,
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub resumes: Vec<ResumeInput>,
    #[serde(default)]
    pub job_description: String,
}

#[derive(Debug, Serialize)]
pub struct RankedEntry {
    /// 1-based position in the ranking.
    pub rank: usize,
    pub filename: String,
    pub raw_score: f64,
    pub display_score: f64,
    pub tier: Tier,
}

#[derive(Debug, Serialize)]
pub struct RankResponse {
    pub ranking_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub model: String,
    pub job_description_provided: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub ranking: Vec<RankedEntry>,
    pub failures: Vec<RankFailure>,
}

#[derive(Debug, Serialize)]
pub struct ResumeAnalysis {
    pub filename: String,
    pub extraction: ExtractionResult,
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub classification_error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub resumes: Vec<ResumeAnalysis>,
    pub ranking: RankResponse,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/extract
///
/// Structured fields for one résumé. Never fails on content.
pub async fn handle_extract(Json(request): Json<TextRequest>) -> Json<ExtractionResult> {
    Json(extract(&request.text))
}

/// POST /api/v1/classify
pub async fn handle_classify(
    State(state): State<AppState>,
    Json(request): Json<TextRequest>,
) -> Result<Json<ClassifyResponse>, AppError> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("text cannot be empty".to_string()));
    }

    let category = state.classifier.classify(&request.text).await?;

    Ok(Json(ClassifyResponse {
        category,
        backend: state.classifier.backend().to_string(),
    }))
}

/// POST /api/v1/score
///
/// Pairwise similarity. Blank input scores 0.0 rather than failing.
pub async fn handle_score(
    State(state): State<AppState>,
    Json(request): Json<ScoreRequest>,
) -> Result<Json<ScoreResponse>, AppError> {
    let raw_score = state
        .scorer
        .score(&request.resume_text, &request.job_description)
        .await?;
    let display_score = display_score(raw_score);

    Ok(Json(ScoreResponse {
        raw_score,
        display_score,
        tier: Tier::from_display_score(display_score),
    }))
}

/// POST /api/v1/rank
///
/// Ranks a batch against one job description. A blank job description
/// returns an empty ranking with a notice, not an error.
pub async fn handle_rank(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<RankResponse>, AppError> {
    Ok(Json(rank_batch(&state, &request).await?))
}

/// POST /api/v1/analyze
///
/// Full batch flow: extract + classify every résumé, then rank them against
/// the job description when one is supplied.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<BatchRequest>,
) -> Result<Json<AnalyzeResponse>, AppError> {
    let mut resumes = Vec::with_capacity(request.resumes.len());

    for resume in &request.resumes {
        let extraction = extract(&resume.text);

        let (category, classification_error) = if resume.text.trim().is_empty() {
            (None, None)
        } else {
            match state.classifier.classify(&resume.text).await {
                Ok(category) => (Some(category), None),
                Err(e) => {
                    warn!("Classification failed for {}: {e}", resume.filename);
                    (None, Some(e.to_string()))
                }
            }
        };

        resumes.push(ResumeAnalysis {
            filename: resume.filename.clone(),
            extraction,
            category,
            classification_error,
        });
    }

    let ranking = rank_batch(&state, &request).await?;

    Ok(Json(AnalyzeResponse { resumes, ranking }))
}

async fn rank_batch(state: &AppState, request: &BatchRequest) -> Result<RankResponse, AppError> {
    let outcome = state
        .ranker
        .rank(&request.resumes, &request.job_description)
        .await?;

    let job_description_provided = !request.job_description.trim().is_empty();
    if job_description_provided {
        info!(
            "Ranked {} of {} resumes",
            outcome.ranked.len(),
            request.resumes.len()
        );
    }

    Ok(build_rank_response(
        outcome,
        job_description_provided,
        state.embedder.model_name(),
    ))
}

fn build_rank_response(
    outcome: RankOutcome,
    job_description_provided: bool,
    model: &str,
) -> RankResponse {
    let ranking = outcome
        .ranked
        .into_iter()
        .enumerate()
        .map(|(i, scored)| RankedEntry {
            rank: i + 1,
            tier: scored.tier(),
            filename: scored.filename,
            raw_score: scored.raw_score,
            display_score: scored.display_score,
        })
        .collect();

    RankResponse {
        ranking_id: Uuid::new_v4(),
        generated_at: Utc::now(),
        model: model.to_string(),
        job_description_provided,
        notice: (!job_description_provided).then(|| MISSING_JD_NOTICE.to_string()),
        ranking,
        failures: outcome.failures,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ranking::ScoredResume;

    #[test]
    fn test_rank_response_numbers_ranks_from_one() {
        let outcome = RankOutcome {
            ranked: vec![ScoredResume::new("b.pdf", 0.6), ScoredResume::new("a.pdf", 0.0)],
            failures: vec![],
        };

        let response = build_rank_response(outcome, true, "feature-hashing");

        assert_eq!(response.ranking[0].rank, 1);
        assert_eq!(response.ranking[0].filename, "b.pdf");
        assert_eq!(response.ranking[0].tier, Tier::Excellent);
        assert_eq!(response.ranking[1].rank, 2);
        assert_eq!(response.ranking[1].tier, Tier::Fair);
        assert!(response.notice.is_none());
    }

    #[test]
    fn test_rank_response_without_jd_carries_notice() {
        let response = build_rank_response(RankOutcome::default(), false, "feature-hashing");
        assert!(response.ranking.is_empty());
        assert_eq!(response.notice.as_deref(), Some(MISSING_JD_NOTICE));

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["job_description_provided"], false);
        assert_eq!(json["ranking"], serde_json::json!([]));
    }

    #[test]
    fn test_batch_request_defaults_missing_jd_to_blank() {
        let request: BatchRequest =
            serde_json::from_str(r#"{"resumes": [{"filename": "a.txt", "text": "hi"}]}"#).unwrap();
        assert_eq!(request.resumes.len(), 1);
        assert!(request.job_description.is_empty());
    }
}
