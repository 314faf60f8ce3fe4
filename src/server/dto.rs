use serde::{Deserialize, Serialize};

use crate::types::Role;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct MeResponse {
    pub id: i64,
    pub username: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    pub role: Role,
}

#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignEmailsRequest {
    /// Full replacement set; empty means "clear all assignments".
    pub email_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct AssignEmailsResponse {
    pub inserted: usize,
    pub cascade_removed: usize,
}

#[derive(Debug, Deserialize)]
pub struct AllowedEmailsRequest {
    pub email_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTemplateRequest {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub email_ids: Vec<i64>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyTemplateRequest {
    pub user_ids: Vec<i64>,
}

#[derive(Debug, Serialize)]
pub struct ApplyTemplateResponse {
    pub applied: usize,
    pub total: usize,
}

#[derive(Debug, Deserialize)]
pub struct SaveSubjectsRequest {
    pub keywords: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct CreateEmailRequest {
    pub email: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default)]
    pub offset: Option<usize>,
}
