use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;

use crate::auth::{RequireAdmin, RequireSuperadmin};
use crate::server::AppState;
use crate::server::response::{ApiError, ApiResponse};

pub async fn list_platforms(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let platforms = state.store.list_platforms()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(platforms)))
}

#[derive(Debug, Deserialize)]
pub struct CreatePlatformRequest {
    pub name: String,
}

pub async fn create_platform(
    _superadmin: RequireSuperadmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreatePlatformRequest>,
) -> impl IntoResponse {
    let name = req.name.trim();
    if name.is_empty() {
        return Err(ApiError::bad_request("Platform name cannot be empty"));
    }

    let platform = state.store.create_platform(name)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(platform))))
}
