use std::sync::Arc;

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::auth::RequireSuperadmin;
use crate::server::AppState;
use crate::server::dto::{CreateEmailRequest, SearchParams};
use crate::server::response::{ApiError, ApiResponse, DEFAULT_PAGE_SIZE, PaginatedResponse};
use crate::server::validation::validate_email;

pub async fn search_emails(
    _superadmin: RequireSuperadmin,
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse {
    let query = params.query.unwrap_or_default();
    let offset = params.offset.unwrap_or(0);

    let mut page = state.store.search_authorized_emails(
        &query,
        offset as i64,
        DEFAULT_PAGE_SIZE as i64 + 1,
    )?;
    let has_more = page.len() > DEFAULT_PAGE_SIZE;
    page.truncate(DEFAULT_PAGE_SIZE);

    Ok::<_, ApiError>(Json(PaginatedResponse::new(page, has_more)))
}

pub async fn create_email(
    _superadmin: RequireSuperadmin,
    State(state): State<Arc<AppState>>,
    Json(req): Json<CreateEmailRequest>,
) -> impl IntoResponse {
    let email = req.email.trim().to_lowercase();
    validate_email(&email)?;

    let created = state.store.create_authorized_email(&email)?;
    Ok::<_, ApiError>((StatusCode::CREATED, Json(ApiResponse::success(created))))
}
