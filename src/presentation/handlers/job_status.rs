use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;
use uuid::Uuid;

use crate::application::services::StatusError;
use crate::domain::JobId;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct JobStatusResponse {
    pub job_id: String,
    pub file_id: i64,
    pub status: String,
    pub progress: u8,
    pub download_url: Option<String>,
    pub size_bytes: Option<u64>,
    pub processing_time_ms: Option<u64>,
    pub message: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state))]
pub async fn job_status_handler(
    State(state): State<AppState>,
    Path(job_id): Path<String>,
) -> impl IntoResponse {
    let uuid = match Uuid::parse_str(&job_id) {
        Ok(u) => u,
        Err(_) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Invalid job ID: {}", job_id),
                }),
            )
                .into_response();
        }
    };

    match state.status_service.status(JobId::from_uuid(uuid)).await {
        Ok(job) => (
            StatusCode::OK,
            Json(JobStatusResponse {
                job_id: job.id.as_uuid().to_string(),
                file_id: job.file_id.as_i64(),
                status: job.status.as_str().to_string(),
                progress: job.progress,
                download_url: job.download_url,
                size_bytes: job.size_bytes,
                processing_time_ms: job.processing_time_ms,
                message: job.message,
                created_at: job.created_at.to_rfc3339(),
                updated_at: job.updated_at.to_rfc3339(),
            }),
        )
            .into_response(),
        Err(StatusError::NotFound(_)) => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: format!("Job not found: {}", job_id),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch job status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Failed to fetch job status".to_string(),
                }),
            )
                .into_response()
        }
    }
}
