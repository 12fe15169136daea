use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use validator::Validate;

use crate::{
    models::{CreateAssessmentRequest, SubmitResponseRequest},
    services::{assessment_service::ServiceError, AppState},
};

fn error_response(e: ServiceError) -> (StatusCode, String) {
    let status = match &e {
        ServiceError::SessionNotFound | ServiceError::UnknownSkill(_) => StatusCode::NOT_FOUND,
        ServiceError::InvalidSettings(_) => StatusCode::BAD_REQUEST,
        ServiceError::SessionFinished(_)
        | ServiceError::QuestionMismatch { .. }
        | ServiceError::ResultNotReady => StatusCode::CONFLICT,
        ServiceError::InvalidSubmission(_) => StatusCode::UNPROCESSABLE_ENTITY,
    };
    (status, e.to_string())
}

/// GET /api/v1/skills
pub async fn list_skills(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.assessment_service().list_skills())
}

/// POST /api/v1/assessments
pub async fn create_assessment(
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateAssessmentRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(
        "Creating assessment for skill={}, candidate={:?}",
        req.skill,
        req.candidate_id
    );

    let response = state
        .assessment_service()
        .create_assessment(req)
        .await
        .map_err(|e| {
            tracing::warn!("Failed to create assessment: {}", e);
            error_response(e)
        })?;

    Ok((StatusCode::CREATED, Json(response)))
}

/// GET /api/v1/assessments/{id}
pub async fn get_assessment(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let summary = state
        .assessment_service()
        .get_assessment(&session_id)
        .await
        .map_err(error_response)?;

    Ok(Json(summary))
}

/// POST /api/v1/assessments/{id}/responses
pub async fn submit_response(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(req): Json<SubmitResponseRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    req.validate()
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    tracing::info!(
        "Submitting response for session={}, question={}",
        session_id,
        req.question_id
    );

    let response = state
        .assessment_service()
        .submit_response(&session_id, req)
        .await
        .map_err(|e| {
            tracing::warn!("Rejected response for session {}: {}", session_id, e);
            error_response(e)
        })?;

    Ok(Json(response))
}

/// POST /api/v1/assessments/{id}/complete
pub async fn complete_assessment(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    tracing::info!("Completing assessment: {}", session_id);

    let result = state
        .assessment_service()
        .complete_assessment(&session_id)
        .await
        .map_err(error_response)?;

    Ok(Json(result))
}

/// GET /api/v1/assessments/{id}/result
pub async fn get_result(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let result = state
        .assessment_service()
        .get_result(&session_id)
        .await
        .map_err(error_response)?;

    Ok(Json(result))
}
