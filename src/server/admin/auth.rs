use std::sync::Arc;

use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode, header::SET_COOKIE},
    response::IntoResponse,
};
use chrono::{Duration, Utc};

use crate::auth::{
    PasswordHasher, RequireAdmin, SESSION_TTL_HOURS, build_cookie, clear_cookie,
    generate_session_id, session_from_cookie_header,
};
use crate::server::AppState;
use crate::server::dto::{LoginRequest, MeResponse};
use crate::server::response::{ApiError, ApiResponse, StoreResultExt};
use crate::types::Session;

pub async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user_by_username(&req.username)
        .api_err("Failed to look up user")?
        .ok_or_else(|| ApiError::unauthorized("Invalid username or password"))?;

    let hasher = PasswordHasher::new();
    let valid = hasher
        .verify(&req.password, &user.password_hash)
        .map_err(|_| ApiError::internal("Failed to verify password"))?;
    if !valid {
        return Err(ApiError::unauthorized("Invalid username or password"));
    }

    if !user.role.is_panel_role() {
        return Err(ApiError::forbidden("Admin access required"));
    }

    if let Err(e) = state.store.purge_expired_sessions() {
        tracing::warn!("Failed to purge expired sessions: {e}");
    }

    let now = Utc::now();
    let session = Session {
        id: generate_session_id(),
        user_id: user.id,
        created_at: now,
        expires_at: now + Duration::hours(SESSION_TTL_HOURS),
    };

    state
        .store
        .create_session(&session)
        .map_err(|_| ApiError::internal("Failed to create session"))?;

    let response = MeResponse {
        id: user.id,
        username: user.username,
        role: user.role,
    };

    Ok::<_, ApiError>((
        StatusCode::OK,
        [(SET_COOKIE, build_cookie(&session.id))],
        Json(ApiResponse::success(response)),
    ))
}

pub async fn logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> impl IntoResponse {
    if let Some(session_id) = headers
        .get(axum::http::header::COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(session_from_cookie_header)
    {
        if let Err(e) = state.store.delete_session(&session_id) {
            tracing::warn!("Failed to delete session: {e}");
        }
    }

    (
        StatusCode::OK,
        [(SET_COOKIE, clear_cookie())],
        Json(ApiResponse::success(())),
    )
}

pub async fn me(admin: RequireAdmin) -> impl IntoResponse {
    Json(ApiResponse::success(MeResponse {
        id: admin.user.id,
        username: admin.user.username,
        role: admin.user.role,
    }))
}
