pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/extract", post(handlers::handle_extract))
        .route("/api/v1/classify", post(handlers::handle_classify))
        .route("/api/v1/score", post(handlers::handle_score))
        .route("/api/v1/rank", post(handlers::handle_rank))
        .route("/api/v1/analyze", post(handlers::handle_analyze))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::analysis::classification::{Classifier, EmbeddingClassifier, JOB_CATEGORIES};
    use crate::analysis::embedding::{EmbeddingProvider, HashingEmbeddingProvider};
    use crate::errors::AppError;

    /// Labels everything "Testing" except text mentioning "garbled".
    struct FlakyClassifier;

    #[async_trait]
    impl Classifier for FlakyClassifier {
        async fn classify(&self, text: &str) -> Result<String, AppError> {
            if text.contains("garbled") {
                Err(AppError::Classification("model returned no label".to_string()))
            } else {
                Ok("Testing".to_string())
            }
        }

        fn backend(&self) -> &'static str {
            "flaky"
        }
    }

    async fn test_router() -> Router {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbeddingProvider::new(256));
        let classifier = EmbeddingClassifier::new(embedder.clone(), JOB_CATEGORIES)
            .await
            .unwrap();
        build_router(AppState::new(embedder, Arc::new(classifier)))
    }

    async fn post_json(router: Router, uri: &str, body: Value) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = router.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = test_router()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_extract_endpoint() {
        let (status, body) = post_json(
            test_router().await,
            "/api/v1/extract",
            json!({"text": "jane@example.org, Kubernetes and Docker, Data Engineer"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email"], "jane@example.org");
        assert_eq!(body["skills"], json!(["docker", "kubernetes"]));
        assert_eq!(body["experience"]["job_titles"], json!(["Data Engineer"]));
    }

    #[tokio::test]
    async fn test_classify_rejects_blank_text() {
        let (status, body) =
            post_json(test_router().await, "/api/v1/classify", json!({"text": "  "})).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_classify_returns_known_category() {
        let (status, body) = post_json(
            test_router().await,
            "/api/v1/classify",
            json!({"text": "Java Developer"}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["category"], "Java Developer");
        assert_eq!(body["backend"], "embedding");
    }

    #[tokio::test]
    async fn test_score_with_blank_jd_is_zero() {
        let (status, body) = post_json(
            test_router().await,
            "/api/v1/score",
            json!({"resume_text": "Python developer", "job_description": ""}),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["raw_score"], 0.0);
        assert_eq!(body["display_score"], 0.5);
        assert_eq!(body["tier"], "Fair");
    }

    #[tokio::test]
    async fn test_score_identical_texts_is_excellent() {
        let (_, body) = post_json(
            test_router().await,
            "/api/v1/score",
            json!({"resume_text": "Rust engineer", "job_description": "rust engineer"}),
        )
        .await;

        assert_eq!(body["raw_score"], 1.0);
        assert_eq!(body["tier"], "Excellent");
    }

    #[tokio::test]
    async fn test_rank_with_blank_jd_returns_notice() {
        let (status, body) = post_json(
            test_router().await,
            "/api/v1/rank",
            json!({
                "resumes": [
                    {"filename": "A", "text": "text one"},
                    {"filename": "B", "text": "text two"}
                ],
                "job_description": ""
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ranking"], json!([]));
        assert_eq!(body["notice"], handlers::MISSING_JD_NOTICE);
    }

    #[tokio::test]
    async fn test_rank_puts_closest_resume_first() {
        let (status, body) = post_json(
            test_router().await,
            "/api/v1/rank",
            json!({
                "resumes": [
                    {"filename": "chef.txt", "text": "pastry chef bakery kitchen"},
                    {"filename": "dev.txt", "text": "python developer django flask"}
                ],
                "job_description": "python developer django flask"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ranking"][0]["filename"], "dev.txt");
        assert_eq!(body["ranking"][0]["rank"], 1);
        assert_eq!(body["ranking"][0]["display_score"], 1.0);
        assert_eq!(body["ranking"][1]["filename"], "chef.txt");
        assert_eq!(body["job_description_provided"], true);
    }

    #[tokio::test]
    async fn test_analyze_extracts_classifies_and_ranks() {
        let (status, body) = post_json(
            test_router().await,
            "/api/v1/analyze",
            json!({
                "resumes": [
                    {"filename": "a.txt", "text": "Python Developer, 5+ years"},
                    {"filename": "empty.txt", "text": ""}
                ],
                "job_description": "Python Developer"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["resumes"][0]["category"], "Python Developer");
        assert_eq!(body["resumes"][0]["extraction"]["skills"], json!(["python"]));
        assert!(body["resumes"][1]["category"].is_null());
        assert_eq!(body["ranking"]["ranking"][0]["filename"], "a.txt");
        assert_eq!(body["ranking"]["ranking"][1]["filename"], "empty.txt");
    }

    #[tokio::test]
    async fn test_analyze_reports_classifier_failure_per_resume() {
        let embedder: Arc<dyn EmbeddingProvider> = Arc::new(HashingEmbeddingProvider::new(256));
        let router = build_router(AppState::new(embedder, Arc::new(FlakyClassifier)));

        let (status, body) = post_json(
            router,
            "/api/v1/analyze",
            json!({
                "resumes": [
                    {"filename": "ok.txt", "text": "selenium test engineer"},
                    {"filename": "bad.txt", "text": "garbled scan of a resume"},
                    {"filename": "also_ok.txt", "text": "manual qa tester"}
                ],
                "job_description": "selenium test engineer"
            }),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        let resumes = body["resumes"].as_array().unwrap();
        assert_eq!(resumes.len(), 3);

        assert!(resumes[1]["category"].is_null());
        assert_eq!(
            resumes[1]["classification_error"],
            "Classification error: model returned no label"
        );

        for index in [0, 2] {
            assert_eq!(resumes[index]["category"], "Testing");
            assert!(resumes[index].get("classification_error").is_none());
        }

        let ranking = body["ranking"]["ranking"].as_array().unwrap();
        assert_eq!(ranking.len(), 3);
        assert_eq!(ranking[0]["filename"], "ok.txt");
        assert_eq!(body["ranking"]["failures"], json!([]));
    }
}
