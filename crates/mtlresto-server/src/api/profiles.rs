use axum::{
    extract::{Path, State},
    Extension, Json,
};
use mtlresto_core::{ProfileEditor, ProfileUpdate, UserProfile};

use crate::middleware::RequestId;

use super::{map_db_error, ApiError, ApiResponse, AppState};

pub(super) async fn get_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let profile = mtlresto_db::get_profile(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    Ok(Json(ApiResponse::new(profile, req_id.0)))
}

/// Stages `update` on the stored profile and overwrites the stored document
/// with the result. Email is never changed.
pub(super) async fn update_profile(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(user_id): Path<String>,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<ApiResponse<UserProfile>>, ApiError> {
    let stored = mtlresto_db::get_profile(&state.pool, &user_id)
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;

    let mut editor = ProfileEditor::new(stored);
    editor.start_editing();
    editor.apply(update);
    let changed = editor.has_changes();

    let saved = mtlresto_db::save_profile(&state.pool, &editor.staged())
        .await
        .map_err(|e| map_db_error(req_id.0.clone(), &e))?;
    editor.mark_saved(saved);

    tracing::info!(user_id = %user_id, changed, "profile saved");
    Ok(Json(ApiResponse::new(editor.stored().clone(), req_id.0)))
}
