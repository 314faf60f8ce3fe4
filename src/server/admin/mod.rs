mod assignments;
mod auth;
mod emails;
mod events;
mod platforms;
mod subjects;
mod templates;
mod users;

use std::sync::Arc;

use axum::{
    Router,
    routing::{delete, get, post, put},
};

use crate::server::AppState;

pub fn admin_router() -> Router<Arc<AppState>> {
    Router::new()
        // Session routes
        .route("/auth/login", post(auth::login))
        .route("/auth/logout", post(auth::logout))
        .route("/auth/me", get(auth::me))
        // User routes
        .route("/users", post(users::create_user))
        .route("/users", get(users::list_users))
        .route("/users/{id}", get(users::get_user))
        .route("/users/{id}", put(users::update_user))
        .route("/users/{id}", delete(users::delete_user))
        // Assignment routes
        .route("/users/{id}/emails", put(assignments::assign_emails))
        .route("/users/{id}/emails", get(assignments::list_assignments))
        .route(
            "/users/{id}/emails/{email_id}",
            delete(assignments::remove_assignment),
        )
        .route(
            "/users/{id}/available-emails",
            get(assignments::available_emails),
        )
        // Delegation routes
        .route(
            "/users/{id}/allowed-emails",
            put(assignments::set_allowed_emails),
        )
        .route(
            "/users/{id}/allowed-emails",
            get(assignments::list_allowed_emails),
        )
        // Template routes
        .route("/templates", post(templates::create_template))
        .route("/templates", get(templates::list_templates))
        .route("/templates/{id}", get(templates::get_template))
        .route("/templates/{id}", delete(templates::delete_template))
        .route("/templates/{id}/apply", post(templates::apply_template))
        // Platform / subject routes
        .route("/platforms", get(platforms::list_platforms))
        .route("/platforms", post(platforms::create_platform))
        .route(
            "/users/{id}/platforms/{platform_id}/subjects",
            put(subjects::save_subjects),
        )
        .route(
            "/users/{id}/platforms/{platform_id}/subjects",
            get(subjects::list_subjects),
        )
        // Catalog routes
        .route("/emails", get(emails::search_emails))
        .route("/emails", post(emails::create_email))
        // Audit trail
        .route("/events", get(events::list_events))
}
