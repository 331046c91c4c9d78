use anyhow::anyhow;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::errors::AppError;
use crate::evaluation::engine::EvaluationResult;
use crate::state::AppState;

const MIN_TEXT_LEN: usize = 10;
const MODEL_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, Deserialize)]
pub struct EvaluationRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationResponse {
    #[serde(flatten)]
    pub result: EvaluationResult,
    pub status: &'static str,
}

impl EvaluationRequest {
    /// Checks both fields and returns them trimmed.
    pub fn validate(&self) -> Result<(String, String), AppError> {
        Ok((
            validate_text("resume_text", &self.resume_text)?,
            validate_text("job_description", &self.job_description)?,
        ))
    }
}

fn validate_text(field: &str, text: &str) -> Result<String, AppError> {
    if text.chars().count() < MIN_TEXT_LEN {
        return Err(AppError::UnprocessableEntity(format!(
            "{field} must be at least {MIN_TEXT_LEN} characters"
        )));
    }
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(AppError::UnprocessableEntity(format!(
            "{field} cannot be empty or whitespace only"
        )));
    }
    Ok(trimmed.to_string())
}

/// POST /api/v1/evaluate-fit
pub async fn handle_evaluate_fit(
    State(state): State<AppState>,
    Json(req): Json<EvaluationRequest>,
) -> Result<Json<EvaluationResponse>, AppError> {
    let (resume_text, job_description) = req.validate()?;
    let engine = state.engine()?;

    let result = tokio::task::spawn_blocking(move || engine.evaluate(&resume_text, &job_description))
        .await
        .map_err(|e| AppError::Internal(anyhow!("evaluation task failed: {e}")))?;

    info!(
        "Evaluation completed with score: {} ({} similarity)",
        result.fit_score, state.config.similarity_model
    );
    Ok(Json(EvaluationResponse {
        result,
        status: "success",
    }))
}

/// GET /api/v1/health
pub async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

/// GET /api/v1/version
pub async fn handle_version() -> Json<Value> {
    Json(json!({ "model_version": MODEL_VERSION }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(resume: &str, job: &str) -> EvaluationRequest {
        EvaluationRequest {
            resume_text: resume.to_string(),
            job_description: job.to_string(),
        }
    }

    #[test]
    fn test_valid_request_is_trimmed() {
        let (resume, job) = request("  Python developer  ", "\tNeed a Rust dev\n")
            .validate()
            .unwrap();
        assert_eq!(resume, "Python developer");
        assert_eq!(job, "Need a Rust dev");
    }

    #[test]
    fn test_short_text_is_rejected() {
        let err = request("too short", "A long enough job description").validate();
        match err {
            Err(AppError::UnprocessableEntity(msg)) => assert!(msg.contains("resume_text")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_blank_text_is_rejected() {
        let err = request("A long enough resume", "            ").validate();
        match err {
            Err(AppError::UnprocessableEntity(msg)) => assert!(msg.contains("job_description")),
            other => panic!("expected validation error, got {other:?}"),
        }
    }
}
