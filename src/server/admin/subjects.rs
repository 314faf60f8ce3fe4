use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::access;
use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::SaveSubjectsRequest;
use crate::server::response::{ApiError, ApiResponse};

pub async fn save_subjects(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path((id, platform_id)): Path<(i64, i64)>,
    Json(req): Json<SaveSubjectsRequest>,
) -> impl IntoResponse {
    let count = access::save_platform_assignment(
        state.store.as_ref(),
        id,
        platform_id,
        &req.keywords,
    )?;

    if let Err(e) = state.store.record_event(
        Some(admin.actor.id),
        "subjects.save",
        Some(&format!("user {id} platform {platform_id}: {count} keywords")),
    ) {
        tracing::warn!("Failed to record audit event: {e}");
    }

    Ok::<_, ApiError>(Json(ApiResponse::success_with_message(
        count,
        format!("saved {count} subject keywords"),
    )))
}

pub async fn list_subjects(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path((id, platform_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    let keywords = access::list_platform_subjects(state.store.as_ref(), id, platform_id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(keywords)))
}
