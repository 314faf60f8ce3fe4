use std::sync::Arc;

use axum::{Json, extract::State, response::IntoResponse};

use crate::auth::RequireSuperadmin;
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};

const EVENT_PAGE_SIZE: i64 = 100;

pub async fn list_events(
    _superadmin: RequireSuperadmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = state
        .store
        .list_events(EVENT_PAGE_SIZE)
        .api_err("Failed to list audit events")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(events)))
}
