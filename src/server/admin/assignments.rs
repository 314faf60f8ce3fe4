use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::access;
use crate::auth::{RequireAdmin, RequireSuperadmin};
use crate::server::AppState;
use crate::server::dto::{
    AllowedEmailsRequest, AssignEmailsRequest, AssignEmailsResponse, SearchParams,
};
use crate::server::response::{
    ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse,
};
use crate::types::Role;

pub async fn assign_emails(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AssignEmailsRequest>,
) -> impl IntoResponse {
    let outcome =
        access::assign_emails(state.store.as_ref(), &admin.actor, id, &req.email_ids)?;

    let mut message = format!("assigned {} emails", outcome.inserted);
    if outcome.cascade_removed > 0 {
        message.push_str(&format!(
            ", removed {} dependent assignments",
            outcome.cascade_removed
        ));
    }

    if let Err(e) = state.store.record_event(
        Some(admin.actor.id),
        "emails.assign",
        Some(&format!("user {id}: {message}")),
    ) {
        tracing::warn!("Failed to record audit event: {e}");
    }

    Ok::<_, ApiError>(Json(ApiResponse::success_with_message(
        AssignEmailsResponse {
            inserted: outcome.inserted,
            cascade_removed: outcome.cascade_removed,
        },
        message,
    )))
}

pub async fn list_assignments(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    ensure_visible(&admin, &state, id)?;

    let assignments = access::get_user_assignments(state.store.as_ref(), id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(assignments)))
}

pub async fn remove_assignment(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path((id, email_id)): Path<(i64, i64)>,
) -> impl IntoResponse {
    access::remove_assignment(state.store.as_ref(), &admin.actor, id, email_id)?;
    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn available_emails(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    ensure_visible(&admin, &state, id)?;

    let query = params.query.unwrap_or_default();
    let offset = params.offset.unwrap_or(0);

    let (page, has_more) = access::search_available_emails(
        state.store.as_ref(),
        &admin.actor,
        id,
        &query,
        offset,
        DEFAULT_PAGE_SIZE,
    )?;

    Ok::<_, ApiError>(Json(PaginatedResponse::new(page, has_more)))
}

pub async fn set_allowed_emails(
    superadmin: RequireSuperadmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<AllowedEmailsRequest>,
) -> impl IntoResponse {
    let target = state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if target.role != Role::Admin {
        return Err(ApiError::bad_request(
            "Delegated email scopes apply to admins only",
        ));
    }

    let count = state
        .store
        .replace_admin_allowed_emails(target.id, &req.email_ids)?;

    if let Err(e) = state.store.record_event(
        Some(superadmin.actor.id),
        "delegation.replace",
        Some(&format!("admin {}: {count} delegated emails", target.id)),
    ) {
        tracing::warn!("Failed to record audit event: {e}");
    }

    Ok::<_, ApiError>(Json(ApiResponse::success_with_message(
        count,
        format!("delegated {count} emails"),
    )))
}

pub async fn list_allowed_emails(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    // Admins may read their own delegation; superadmins anyone's.
    if admin.actor.role == Role::Admin && admin.actor.id != id {
        return Err(ApiError::forbidden("Not allowed to view this delegation"));
    }

    state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let ids = state.store.list_admin_allowed_emails(id)?;
    Ok::<_, ApiError>(Json(ApiResponse::success(ids)))
}

/// Read-path visibility: superadmins see everyone, admins only the users they
/// created. Looser than `can_manage`: a superadmin may inspect an owned
/// user's assignments even though it cannot edit them.
fn ensure_visible(
    admin: &RequireAdmin,
    state: &Arc<AppState>,
    target_user_id: i64,
) -> Result<(), ApiError> {
    let target = state
        .store
        .get_user(target_user_id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if admin.actor.role == Role::Admin && target.created_by_admin_id != Some(admin.actor.id) {
        return Err(ApiError::forbidden("Not allowed to view this user"));
    }
    Ok(())
}
