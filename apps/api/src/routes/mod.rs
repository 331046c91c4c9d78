pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::evaluation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/evaluate-fit", post(handlers::handle_evaluate_fit))
        .route("/api/v1/health", get(handlers::handle_health))
        .route("/api/v1/version", get(handlers::handle_version))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::evaluation::dictionary::{SkillDictionary, SkillsSource};
    use crate::evaluation::engine::{EvaluationSettings, FitEngine};
    use crate::evaluation::learning_path::LearningPathCatalog;
    use crate::evaluation::scoring::TfidfSimilarity;

    fn ready_state() -> AppState {
        let source: SkillsSource = serde_json::from_str(
            r#"{"categories": {"languages": ["Python", "SQL", "Rust"]},
                "aliases": {"sql": "SQL"}}"#,
        )
        .unwrap();
        let engine = FitEngine::new(
            SkillDictionary::from_source(&source).unwrap(),
            LearningPathCatalog::default(),
            Arc::new(TfidfSimilarity),
            EvaluationSettings::default(),
        )
        .unwrap();
        AppState::with_engine(Config::default(), engine)
    }

    fn evaluate_request(body: Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/api/v1/evaluate-fit")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(resp: axum::response::Response) -> Value {
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_evaluate_fit_returns_result() {
        let app = build_router(ready_state());
        let resp = app
            .oneshot(evaluate_request(json!({
                "resume_text": "I have 5 years of Python and SQL experience",
                "job_description": "Looking for a Python, SQL and Rust developer"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::OK);
        let body = body_json(resp).await;
        assert_eq!(body["status"], "success");
        assert_eq!(body["verdict"], "moderate_fit");
        assert_eq!(body["fit_score"], 0.54);
        assert_eq!(body["matched_skills"], json!(["Python", "SQL"]));
        assert_eq!(body["missing_skills"], json!(["Rust"]));
        assert_eq!(body["recommended_learning_track"][0]["skill"], "Rust");
        assert_eq!(
            body["recommended_learning_track"][0]["steps"]
                .as_array()
                .unwrap()
                .len(),
            4
        );
    }

    #[tokio::test]
    async fn test_short_text_is_unprocessable() {
        let app = build_router(ready_state());
        let resp = app
            .oneshot(evaluate_request(json!({
                "resume_text": "short",
                "job_description": "Looking for a Python developer"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_whitespace_text_is_unprocessable() {
        let app = build_router(ready_state());
        let resp = app
            .oneshot(evaluate_request(json!({
                "resume_text": "I write Python every day",
                "job_description": "                "
            })))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_evaluate_before_engine_ready_is_unavailable() {
        let app = build_router(AppState::new(Config::default()));
        let resp = app
            .oneshot(evaluate_request(json!({
                "resume_text": "I have 5 years of Python",
                "job_description": "Looking for a Python developer"
            })))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(resp).await;
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }

    #[tokio::test]
    async fn test_api_health_and_version() {
        let app = build_router(AppState::new(Config::default()));

        let resp = app
            .clone()
            .oneshot(Request::get("/api/v1/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        assert_eq!(body_json(resp).await, json!({"status": "ok"}));

        let resp = app
            .oneshot(Request::get("/api/v1/version").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(resp).await, json!({"model_version": "1.0.0"}));
    }

    #[tokio::test]
    async fn test_root_health_reports_service() {
        let app = build_router(AppState::new(Config::default()));
        let resp = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(resp).await;
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "fit-evaluator");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }
}
