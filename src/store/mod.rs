mod schema;
mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::Result;
use crate::types::*;

/// Store defines the database interface.
pub trait Store: Send + Sync {
    fn initialize(&self) -> Result<()>;

    // User operations
    fn create_user(&self, user: &NewUser) -> Result<User>;
    fn get_user(&self, id: i64) -> Result<Option<User>>;
    fn get_user_by_username(&self, username: &str) -> Result<Option<User>>;
    fn list_users(&self) -> Result<Vec<User>>;
    fn list_users_created_by(&self, admin_id: i64) -> Result<Vec<User>>;
    fn update_user(&self, user: &User) -> Result<()>;
    fn delete_user(&self, id: i64) -> Result<bool>;
    fn has_superadmin(&self) -> Result<bool>;

    // Authorized-email catalog
    fn create_authorized_email(&self, email: &str) -> Result<AuthorizedEmail>;
    fn get_authorized_email(&self, id: i64) -> Result<Option<AuthorizedEmail>>;
    fn search_authorized_emails(
        &self,
        query: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizedEmail>>;
    fn search_unassigned_emails(
        &self,
        user_id: i64,
        query: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizedEmail>>;

    // Assignment operations
    fn list_assignment_ids(&self, user_id: i64) -> Result<Vec<i64>>;
    fn list_assignments(&self, user_id: i64) -> Result<Vec<EmailAssignment>>;
    /// Transactionally replaces the user's assignment set. When
    /// `cascade_removed` is given, rows for users created by `user_id` whose
    /// email is in the removed list are deleted inside the same transaction.
    fn replace_assignments(
        &self,
        user_id: i64,
        email_ids: &[i64],
        assigned_by: i64,
        cascade_removed: Option<&[i64]>,
    ) -> Result<AssignOutcome>;
    fn delete_assignment(&self, user_id: i64, email_id: i64) -> Result<bool>;

    // Delegation (read by the scope resolver; written only by superadmin glue)
    fn list_admin_allowed_emails(&self, admin_id: i64) -> Result<Vec<i64>>;
    fn replace_admin_allowed_emails(&self, admin_id: i64, email_ids: &[i64]) -> Result<usize>;

    // Template operations
    fn create_template(&self, template: &NewTemplate) -> Result<PermissionTemplate>;
    fn get_template(&self, id: i64) -> Result<Option<PermissionTemplate>>;
    fn list_templates(&self) -> Result<Vec<PermissionTemplate>>;
    fn delete_template(&self, id: i64) -> Result<bool>;

    // Platform / subject operations
    fn create_platform(&self, name: &str) -> Result<Platform>;
    fn get_platform(&self, id: i64) -> Result<Option<Platform>>;
    fn list_platforms(&self) -> Result<Vec<Platform>>;
    fn list_platform_subjects(&self, user_id: i64, platform_id: i64) -> Result<Vec<String>>;
    fn replace_platform_subjects(
        &self,
        user_id: i64,
        platform_id: i64,
        keywords: &[String],
    ) -> Result<usize>;

    // Session operations
    fn create_session(&self, session: &Session) -> Result<()>;
    fn get_session(&self, id: &str) -> Result<Option<Session>>;
    fn delete_session(&self, id: &str) -> Result<bool>;
    fn purge_expired_sessions(&self) -> Result<usize>;

    // Audit trail
    fn record_event(&self, user_id: Option<i64>, action: &str, detail: Option<&str>) -> Result<()>;
    fn list_events(&self, limit: i64) -> Result<Vec<AuditEvent>>;

    fn close(&self) -> Result<()>;
}

/// Insert payload for a user row.
pub struct NewUser {
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub created_by_admin_id: Option<i64>,
}

/// Insert payload for a template row.
pub struct NewTemplate {
    pub name: String,
    pub description: Option<String>,
    pub email_ids: Vec<i64>,
    pub created_by: i64,
}
