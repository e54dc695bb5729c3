//! Analysis endpoint — a thin validation wrapper over the workflow entry
//! point. PDF extraction and job catalogs live with other services; this API
//! takes already-extracted text.

use axum::extract::State;
use axum::Json;
use serde::Deserialize;

use crate::analysis::state::ComparisonResult;
use crate::errors::AppError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub cv_text: String,
    pub job_text: String,
    pub job_name: String,
    pub cv_filename: String,
}

/// POST /api/v1/analysis
///
/// Once validation passes this always answers 200 with a well-shaped
/// `ComparisonResult`: workflow failures degrade the result, they never
/// surface as HTTP errors.
pub async fn handle_analyze(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> Result<Json<ComparisonResult>, AppError> {
    if request.cv_text.trim().is_empty() {
        return Err(AppError::Validation("cv_text must not be empty".to_string()));
    }
    if request.job_text.trim().is_empty() {
        return Err(AppError::Validation(
            "job_text must not be empty".to_string(),
        ));
    }

    let result = state
        .workflow
        .analyze(
            request.cv_text,
            request.job_text,
            request.job_name,
            request.cv_filename,
        )
        .await;

    Ok(Json(result))
}
