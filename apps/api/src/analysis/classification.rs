//! Résumé classification — "given text, return a job-category label".
//!
//! Pluggable, trait-based like the other collaborators:
//! - `EmbeddingClassifier` (default): nearest category label by cosine similarity.
//! - `LlmClassifier`: asks the model to pick one label from the same closed list.
//!
//! `AppState` holds an `Arc<dyn Classifier>`, chosen at startup via config.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::analysis::embedding::{EmbeddingProvider, EmbeddingVector};
use crate::analysis::prompts::CLASSIFY_PROMPT_TEMPLATE;
use crate::analysis::similarity::cosine_similarity;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LlmClient;

/// Closed set of labels every backend chooses from.
pub const JOB_CATEGORIES: &[&str] = &[
    "Data Science",
    "HR",
    "Advocate",
    "Arts",
    "Web Designing",
    "Mechanical Engineer",
    "Sales",
    "Health and Fitness",
    "Civil Engineer",
    "Java Developer",
    "Business Analyst",
    "SAP Developer",
    "Automation Testing",
    "Electrical Engineering",
    "Operations Manager",
    "Python Developer",
    "DevOps Engineer",
    "Network Security Engineer",
    "PMO",
    "Database",
    "Hadoop",
    "ETL Developer",
    "DotNet Developer",
    "Blockchain",
    "Testing",
];

/// Longest résumé excerpt sent to the LLM.
const MAX_PROMPT_CHARS: usize = 12_000;

#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, text: &str) -> Result<String, AppError>;

    /// "embedding" | "llm" — reported alongside predictions.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// EmbeddingClassifier
// ────────────────────────────────────────────────────────────────────────────

/// Embeds each category label once, then labels a résumé with the category
/// whose embedding lies closest. Ties go to the earlier category.
pub struct EmbeddingClassifier {
    embedder: Arc<dyn EmbeddingProvider>,
    labels: Vec<(String, EmbeddingVector)>,
}

impl EmbeddingClassifier {
    pub async fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        categories: &[&str],
    ) -> Result<Self, AppError> {
        let mut labels = Vec::with_capacity(categories.len());
        for category in categories {
            let vector = embedder.embed(category).await?;
            labels.push((category.to_string(), vector));
        }
        info!(
            "Embedding classifier ready: {} categories via {}",
            labels.len(),
            embedder.model_name()
        );
        Ok(Self { embedder, labels })
    }
}

#[async_trait]
impl Classifier for EmbeddingClassifier {
    async fn classify(&self, text: &str) -> Result<String, AppError> {
        let vector = self.embedder.embed(text).await?;

        let mut best: Option<(&str, f64)> = None;
        for (label, label_vector) in &self.labels {
            let similarity = cosine_similarity(&vector, label_vector)?;
            if best.map_or(true, |(_, top)| similarity > top) {
                best = Some((label.as_str(), similarity));
            }
        }

        best.map(|(label, _)| label.to_string())
            .ok_or_else(|| AppError::Classification("No categories configured".to_string()))
    }

    fn backend(&self) -> &'static str {
        "embedding"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// LlmClassifier
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryPrediction {
    pub category: String,
}

pub struct LlmClassifier(pub LlmClient);

#[async_trait]
impl Classifier for LlmClassifier {
    async fn classify(&self, text: &str) -> Result<String, AppError> {
        let prompt = build_classify_prompt(text);
        let prediction: CategoryPrediction = self
            .0
            .call_json(&prompt, JSON_ONLY_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Resume classification failed: {e}")))?;

        canonical_category(&prediction.category).ok_or_else(|| {
            AppError::Classification(format!(
                "Model returned unknown category '{}'",
                prediction.category
            ))
        })
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

fn build_classify_prompt(text: &str) -> String {
    let categories = JOB_CATEGORIES
        .iter()
        .map(|c| format!("- {c}"))
        .collect::<Vec<_>>()
        .join("\n");
    CLASSIFY_PROMPT_TEMPLATE
        .replace("{categories}", &categories)
        .replace("{resume_text}", truncate_chars(text, MAX_PROMPT_CHARS))
}

/// Maps a model answer onto the exact label from `JOB_CATEGORIES`.
fn canonical_category(answer: &str) -> Option<String> {
    let answer = answer.trim();
    JOB_CATEGORIES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(answer))
        .map(|c| c.to_string())
}

fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
