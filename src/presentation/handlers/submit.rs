use axum::Json;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::presentation::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
    pub file_ids: Vec<i64>,
}

#[derive(Serialize)]
pub struct SubmitResponse {
    pub job_id: String,
    pub status: String,
    pub total_count: usize,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[tracing::instrument(skip(state, request))]
pub async fn submit_handler(
    State(state): State<AppState>,
    Json(request): Json<SubmitRequest>,
) -> impl IntoResponse {
    match state.submission_service.submit(&request.file_ids).await {
        Ok(receipt) => (
            StatusCode::ACCEPTED,
            Json(SubmitResponse {
                job_id: receipt.job_id.as_uuid().to_string(),
                status: receipt.status.as_str().to_string(),
                total_count: receipt.total_count,
            }),
        )
            .into_response(),
        Err(e) if e.is_validation() => {
            tracing::warn!(error = %e, "Rejected download submission");
            (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to schedule download");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Download service is temporarily unavailable".to_string(),
                }),
            )
                .into_response()
        }
    }
}
