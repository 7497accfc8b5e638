use axum::{extract::State, Extension, Json};
use chrono::{DateTime, Utc};
use mtlresto_core::{ContactForm, SubmissionOutcome, SEND_FAILURE_MESSAGE};
use serde::Serialize;

use crate::middleware::RequestId;

use super::{ApiError, ApiResponse, AppState};

#[derive(Debug, Serialize)]
pub(super) struct ContactReceipt {
    outcome: SubmissionOutcome,
    message_id: i64,
    received_at: DateTime<Utc>,
}

/// Validates locally, then appends one message. An invalid form writes
/// nothing; a failed write is reported once and not retried.
pub(super) async fn send_message(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(form): Json<ContactForm>,
) -> Result<Json<ApiResponse<ContactReceipt>>, ApiError> {
    form.validate(state.contact_mode)
        .map_err(|e| ApiError::new(req_id.0.clone(), "validation_error", e.to_string()))?;

    let stored = mtlresto_db::insert_contact_message(&state.pool, &form)
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "failed to store contact message");
            ApiError::new(req_id.0.clone(), "internal_error", SEND_FAILURE_MESSAGE)
        })?;

    tracing::info!(message_id = stored.id, "contact message received");
    Ok(Json(ApiResponse::new(
        ContactReceipt {
            outcome: SubmissionOutcome::Sent,
            message_id: stored.id,
            received_at: stored.received_at,
        },
        req_id.0,
    )))
}
