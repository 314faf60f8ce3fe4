use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Role;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: String,
    #[serde(skip)]
    pub password_hash: String,
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_by_admin_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizedEmail {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

/// A single row of a user's authorized-email set, joined with the catalog
/// entry for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailAssignment {
    pub email_id: i64,
    pub email: String,
    pub assigned_by: i64,
    pub assigned_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionTemplate {
    pub id: i64,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Snapshot of authorized-email ids at creation time. Applying the
    /// template never mutates this list.
    pub email_ids: Vec<i64>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    #[serde(skip)]
    pub id: String,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub id: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<i64>,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful assignment replace.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AssignOutcome {
    /// Rows inserted for the target user.
    pub inserted: usize,
    /// Dependent-user rows removed by the cascade step.
    pub cascade_removed: usize,
}

/// Result of a template fan-out. `applied == total` means full success;
/// anything less is a partial application, reported with counts rather than
/// rolled back.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct TemplateOutcome {
    pub applied: usize,
    pub total: usize,
}

impl TemplateOutcome {
    #[must_use]
    pub const fn fully_applied(&self) -> bool {
        self.applied == self.total
    }
}
