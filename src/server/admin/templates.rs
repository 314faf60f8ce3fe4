use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::access;
use crate::auth::RequireAdmin;
use crate::server::AppState;
use crate::server::dto::{ApplyTemplateRequest, ApplyTemplateResponse, CreateTemplateRequest};
use crate::server::response::{ApiError, ApiResponse, StoreOptionExt};
use crate::store::NewTemplate;
use crate::types::Role;

pub async fn create_template(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateTemplateRequest>,
) -> impl IntoResponse {
    if req.name.trim().is_empty() {
        return Err(ApiError::bad_request("Template name cannot be empty"));
    }

    let template = state.store.create_template(&NewTemplate {
        name: req.name.trim().to_string(),
        description: req.description,
        email_ids: req.email_ids,
        created_by: admin.actor.id,
    })?;

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(template))))
}

pub async fn list_templates(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let templates = state.store.list_templates()?;
    Ok::<_, ApiError>(Json(ApiResponse::success(templates)))
}

pub async fn get_template(
    _admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let template = state
        .store
        .get_template(id)?
        .or_not_found("Template not found")?;

    Ok::<_, ApiError>(Json(ApiResponse::success(template)))
}

pub async fn delete_template(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let template = state
        .store
        .get_template(id)?
        .or_not_found("Template not found")?;

    if admin.actor.role != Role::Superadmin && template.created_by != admin.actor.id {
        return Err(ApiError::forbidden("Not allowed to delete this template"));
    }

    state.store.delete_template(template.id)?;

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}

pub async fn apply_template(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<ApplyTemplateRequest>,
) -> impl IntoResponse {
    let outcome =
        access::apply_template(state.store.as_ref(), &admin.actor, id, &req.user_ids)?;

    let message = if outcome.fully_applied() {
        format!("template applied to {} users", outcome.total)
    } else {
        format!("template applied to {} of {} users", outcome.applied, outcome.total)
    };

    if let Err(e) = state.store.record_event(
        Some(admin.actor.id),
        "template.apply",
        Some(&format!("template {id}: {message}")),
    ) {
        tracing::warn!("Failed to record audit event: {e}");
    }

    Ok::<_, ApiError>(Json(ApiResponse::success_with_message(
        ApplyTemplateResponse {
            applied: outcome.applied,
            total: outcome.total,
        },
        message,
    )))
}
