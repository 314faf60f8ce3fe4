use std::sync::Arc;

use axum::{
    Json,
    extract::FromRequestParts,
    http::{StatusCode, header::COOKIE, request::Parts},
    response::{IntoResponse, Response},
};
use chrono::Utc;
use serde_json::json;

use super::session::session_from_cookie_header;
use crate::server::AppState;
use crate::types::{Actor, Role, User};

/// Extractor that requires a logged-in panel principal (admin or superadmin).
pub struct RequireAdmin {
    pub actor: Actor,
    pub user: User,
}

/// Extractor that requires a superadmin session.
pub struct RequireSuperadmin {
    pub actor: Actor,
    pub user: User,
}

#[derive(Debug)]
pub enum AuthError {
    MissingSession,
    InvalidSession,
    SessionExpired,
    NotAdmin,
    NotSuperadmin,
    InternalError,
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            AuthError::MissingSession => (StatusCode::UNAUTHORIZED, "Authentication required"),
            AuthError::InvalidSession => (StatusCode::UNAUTHORIZED, "Invalid session"),
            AuthError::SessionExpired => (StatusCode::UNAUTHORIZED, "Session expired"),
            AuthError::NotAdmin => (StatusCode::FORBIDDEN, "Admin access required"),
            AuthError::NotSuperadmin => (StatusCode::FORBIDDEN, "Superadmin access required"),
            AuthError::InternalError => {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
            }
        };

        let body = json!({ "success": false, "error": message });
        (status, Json(body)).into_response()
    }
}

impl FromRequestParts<Arc<AppState>> for RequireAdmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_session_user(parts, state)?;

        if !user.role.is_panel_role() {
            return Err(AuthError::NotAdmin);
        }

        let actor = Actor::new(user.id, user.role);
        Ok(RequireAdmin { actor, user })
    }
}

impl FromRequestParts<Arc<AppState>> for RequireSuperadmin {
    type Rejection = AuthError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve_session_user(parts, state)?;

        if user.role != Role::Superadmin {
            return Err(AuthError::NotSuperadmin);
        }

        let actor = Actor::new(user.id, user.role);
        Ok(RequireSuperadmin { actor, user })
    }
}

fn resolve_session_user(parts: &Parts, state: &Arc<AppState>) -> Result<User, AuthError> {
    let session_id = parts
        .headers
        .get(COOKIE)
        .and_then(|h| h.to_str().ok())
        .and_then(session_from_cookie_header)
        .ok_or(AuthError::MissingSession)?;

    let session = state
        .store
        .get_session(&session_id)
        .map_err(|_| AuthError::InternalError)?
        .ok_or(AuthError::InvalidSession)?;

    if session.expires_at < Utc::now() {
        if let Err(e) = state.store.delete_session(&session.id) {
            tracing::warn!("Failed to delete expired session: {e}");
        }
        return Err(AuthError::SessionExpired);
    }

    state
        .store
        .get_user(session.user_id)
        .map_err(|_| AuthError::InternalError)?
        .ok_or(AuthError::InvalidSession)
}
