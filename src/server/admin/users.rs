use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::access::can_manage;
use crate::auth::{PasswordHasher, RequireAdmin};
use crate::server::AppState;
use crate::server::dto::{CreateUserRequest, UpdateUserRequest};
use crate::server::response::{ApiError, ApiResponse};
use crate::server::validation::{validate_password, validate_username};
use crate::store::NewUser;
use crate::types::{Role, User};

fn record(state: &Arc<AppState>, actor_id: i64, action: &str, detail: String) {
    if let Err(e) = state.store.record_event(Some(actor_id), action, Some(&detail)) {
        tracing::warn!("Failed to record audit event: {e}");
    }
}

pub async fn create_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateUserRequest>,
) -> impl IntoResponse {
    validate_username(&req.username)?;
    validate_password(&req.password)?;

    // Superadmins create admins and unowned users; admins create only users
    // owned by themselves.
    let created_by_admin_id = match (admin.actor.role, req.role) {
        (Role::Superadmin, Role::Admin | Role::User) => None,
        (Role::Admin, Role::User) => Some(admin.actor.id),
        _ => {
            return Err(ApiError::forbidden(
                "You are not allowed to create users with this role",
            ));
        }
    };

    let hasher = PasswordHasher::new();
    let password_hash = hasher
        .hash(&req.password)
        .map_err(|_| ApiError::internal("Failed to hash password"))?;

    let user = state.store.create_user(&NewUser {
        username: req.username,
        password_hash,
        role: req.role,
        created_by_admin_id,
    })?;

    record(
        &state,
        admin.actor.id,
        "user.create",
        format!("created user {} ({})", user.username, user.role),
    );

    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(user))))
}

pub async fn list_users(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let users = match admin.actor.role {
        Role::Superadmin => state.store.list_users()?,
        _ => state.store.list_users_created_by(admin.actor.id)?,
    };

    Ok::<_, ApiError>(Json(ApiResponse::success(users)))
}

fn ensure_visible(admin: &RequireAdmin, target: &User) -> Result<(), ApiError> {
    if admin.actor.role == Role::Admin && target.created_by_admin_id != Some(admin.actor.id) {
        return Err(ApiError::forbidden("Not allowed to manage this user"));
    }
    Ok(())
}

pub async fn get_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = state
        .store
        .get_user(id)?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    ensure_visible(&admin, &user)?;

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn update_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(req): Json<UpdateUserRequest>,
) -> impl IntoResponse {
    let mut user = can_manage(state.store.as_ref(), &admin.actor, id)?;

    if let Some(username) = req.username {
        validate_username(&username)?;
        user.username = username;
    }
    if let Some(password) = req.password {
        validate_password(&password)?;
        let hasher = PasswordHasher::new();
        user.password_hash = hasher
            .hash(&password)
            .map_err(|_| ApiError::internal("Failed to hash password"))?;
    }

    state.store.update_user(&user)?;

    record(
        &state,
        admin.actor.id,
        "user.update",
        format!("updated user {}", user.id),
    );

    Ok::<_, ApiError>(Json(ApiResponse::success(user)))
}

pub async fn delete_user(
    admin: RequireAdmin,
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> impl IntoResponse {
    let user = can_manage(state.store.as_ref(), &admin.actor, id)?;

    if user.id == admin.actor.id {
        return Err(ApiError::bad_request("You cannot delete your own account"));
    }

    state.store.delete_user(user.id)?;

    record(
        &state,
        admin.actor.id,
        "user.delete",
        format!("deleted user {}", user.username),
    );

    Ok::<_, ApiError>(StatusCode::NO_CONTENT)
}
