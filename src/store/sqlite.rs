use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{Connection, OptionalExtension, Row, params};

use super::Store;
use super::schema::SCHEMA;
use super::{NewTemplate, NewUser};
use crate::error::{Error, Result};
use crate::types::*;

pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    pub fn new<P: AsRef<Path>>(db_path: P) -> Result<Self> {
        let conn = Connection::open(db_path)?;

        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.pragma_update(None, "journal_mode", "WAL")?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Returns a guard to the underlying database connection.
    /// This allows consuming applications to execute custom SQL.
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn()
    }
}

fn parse_datetime(s: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|_| {
            // Handle SQLite's default datetime format: "YYYY-MM-DD HH:MM:SS"
            chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            tracing::error!("Invalid datetime in database: '{}' - {}", s, e);
            Utc::now()
        })
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

fn tx_failed(e: rusqlite::Error) -> Error {
    Error::Transaction(e.to_string())
}

fn is_unique_violation(e: &rusqlite::Error) -> bool {
    matches!(
        e,
        rusqlite::Error::SqliteFailure(err, _)
            if err.code == rusqlite::ErrorCode::ConstraintViolation
    )
}

fn user_from_row(row: &Row<'_>) -> rusqlite::Result<User> {
    let role_str: String = row.get(3)?;
    let role = Role::parse(&role_str).ok_or_else(|| {
        rusqlite::Error::FromSqlConversionFailure(
            3,
            rusqlite::types::Type::Text,
            format!("invalid role: {role_str}").into(),
        )
    })?;

    Ok(User {
        id: row.get(0)?,
        username: row.get(1)?,
        password_hash: row.get(2)?,
        role,
        created_by_admin_id: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
        updated_at: parse_datetime(&row.get::<_, String>(6)?),
    })
}

fn template_from_row(row: &Row<'_>) -> rusqlite::Result<PermissionTemplate> {
    let raw_ids: String = row.get(3)?;
    let email_ids: Vec<i64> = serde_json::from_str(&raw_ids).map_err(|e| {
        rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
    })?;

    Ok(PermissionTemplate {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        email_ids,
        created_by: row.get(4)?,
        created_at: parse_datetime(&row.get::<_, String>(5)?),
    })
}

const USER_COLUMNS: &str =
    "id, username, password_hash, role, created_by_admin_id, created_at, updated_at";
const TEMPLATE_COLUMNS: &str = "id, name, description, email_ids, created_by, created_at";

impl Store for SqliteStore {
    fn initialize(&self) -> Result<()> {
        let conn = self.conn();
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    // User operations

    fn create_user(&self, user: &NewUser) -> Result<User> {
        let conn = self.conn();
        let now = format_datetime(&Utc::now());
        let result = conn.execute(
            "INSERT INTO users (username, password_hash, role, created_by_admin_id, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?5)",
            params![
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.created_by_admin_id,
                now,
            ],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .map_err(Error::from)
    }

    fn get_user(&self, id: i64) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?1"),
            params![id],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn get_user_by_username(&self, username: &str) -> Result<Option<User>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {USER_COLUMNS} FROM users WHERE username = ?1"),
            params![username],
            user_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_users(&self) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt =
            conn.prepare(&format!("SELECT {USER_COLUMNS} FROM users ORDER BY id"))?;

        let rows = stmt.query_map([], user_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_users_created_by(&self, admin_id: i64) -> Result<Vec<User>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE created_by_admin_id = ?1 ORDER BY id"
        ))?;

        let rows = stmt.query_map(params![admin_id], user_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn update_user(&self, user: &User) -> Result<()> {
        let result = self.conn().execute(
            "UPDATE users SET username = ?1, password_hash = ?2, role = ?3,
                              created_by_admin_id = ?4, updated_at = ?5
             WHERE id = ?6",
            params![
                user.username,
                user.password_hash,
                user.role.as_str(),
                user.created_by_admin_id,
                format_datetime(&Utc::now()),
                user.id,
            ],
        );

        match result {
            Ok(0) => Err(Error::NotFound),
            Ok(_) => Ok(()),
            Err(e) if is_unique_violation(&e) => Err(Error::AlreadyExists),
            Err(e) => Err(Error::from(e)),
        }
    }

    fn delete_user(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM users WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn has_superadmin(&self) -> Result<bool> {
        let conn = self.conn();
        let count: i32 = conn.query_row(
            "SELECT COUNT(*) FROM users WHERE role = 'superadmin'",
            [],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    // Authorized-email catalog

    fn create_authorized_email(&self, email: &str) -> Result<AuthorizedEmail> {
        let conn = self.conn();
        let now = format_datetime(&Utc::now());
        let result = conn.execute(
            "INSERT INTO authorized_emails (email, created_at) VALUES (?1, ?2)",
            params![email, now],
        );

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        Ok(AuthorizedEmail {
            id: conn.last_insert_rowid(),
            email: email.to_string(),
            created_at: parse_datetime(&now),
        })
    }

    fn get_authorized_email(&self, id: i64) -> Result<Option<AuthorizedEmail>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, email, created_at FROM authorized_emails WHERE id = ?1",
            params![id],
            |row| {
                Ok(AuthorizedEmail {
                    id: row.get(0)?,
                    email: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn search_authorized_emails(
        &self,
        query: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizedEmail>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, email, created_at FROM authorized_emails
             WHERE email LIKE ?1 ORDER BY email LIMIT ?2 OFFSET ?3",
        )?;

        let pattern = format!("%{query}%");
        let rows = stmt.query_map(params![pattern, limit, offset], |row| {
            Ok(AuthorizedEmail {
                id: row.get(0)?,
                email: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn search_unassigned_emails(
        &self,
        user_id: i64,
        query: &str,
        offset: i64,
        limit: i64,
    ) -> Result<Vec<AuthorizedEmail>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, email, created_at FROM authorized_emails
             WHERE email LIKE ?1
               AND id NOT IN (SELECT authorized_email_id FROM user_authorized_emails WHERE user_id = ?2)
             ORDER BY email LIMIT ?3 OFFSET ?4",
        )?;

        let pattern = format!("%{query}%");
        let rows = stmt.query_map(params![pattern, user_id, limit, offset], |row| {
            Ok(AuthorizedEmail {
                id: row.get(0)?,
                email: row.get(1)?,
                created_at: parse_datetime(&row.get::<_, String>(2)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    // Assignment operations

    fn list_assignment_ids(&self, user_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT authorized_email_id FROM user_authorized_emails
             WHERE user_id = ?1 ORDER BY authorized_email_id",
        )?;

        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_assignments(&self, user_id: i64) -> Result<Vec<EmailAssignment>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT a.authorized_email_id, e.email, a.assigned_by, a.assigned_at
             FROM user_authorized_emails a
             JOIN authorized_emails e ON e.id = a.authorized_email_id
             WHERE a.user_id = ?1
             ORDER BY e.email",
        )?;

        let rows = stmt.query_map(params![user_id], |row| {
            Ok(EmailAssignment {
                email_id: row.get(0)?,
                email: row.get(1)?,
                assigned_by: row.get(2)?,
                assigned_at: parse_datetime(&row.get::<_, String>(3)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn replace_assignments(
        &self,
        user_id: i64,
        email_ids: &[i64],
        assigned_by: i64,
        cascade_removed: Option<&[i64]>,
    ) -> Result<AssignOutcome> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(tx_failed)?;
        let now = format_datetime(&Utc::now());

        tx.execute(
            "DELETE FROM user_authorized_emails WHERE user_id = ?1",
            params![user_id],
        )
        .map_err(tx_failed)?;

        let mut inserted = 0;
        for &email_id in email_ids {
            // Selecting from the catalog means an unknown id inserts zero
            // rows instead of tripping the foreign key and killing the
            // transaction.
            let rows = tx
                .execute(
                    "INSERT OR IGNORE INTO user_authorized_emails
                         (user_id, authorized_email_id, assigned_by, assigned_at)
                     SELECT ?1, id, ?2, ?3 FROM authorized_emails WHERE id = ?4",
                    params![user_id, assigned_by, now, email_id],
                )
                .map_err(tx_failed)?;

            if rows == 0 {
                tracing::warn!(
                    "skipping authorized email id {email_id} for user {user_id}: not in catalog or duplicate"
                );
            }
            inserted += rows;
        }

        let mut removed = 0;
        if let Some(removed_ids) = cascade_removed {
            if !removed_ids.is_empty() {
                for &email_id in removed_ids {
                    removed += tx
                        .execute(
                            "DELETE FROM user_authorized_emails
                             WHERE authorized_email_id = ?1
                               AND user_id IN (SELECT id FROM users WHERE created_by_admin_id = ?2)",
                            params![email_id, user_id],
                        )
                        .map_err(tx_failed)?;
                }
            }
        }

        tx.commit().map_err(tx_failed)?;
        Ok(AssignOutcome {
            inserted,
            cascade_removed: removed,
        })
    }

    fn delete_assignment(&self, user_id: i64, email_id: i64) -> Result<bool> {
        let rows = self.conn().execute(
            "DELETE FROM user_authorized_emails WHERE user_id = ?1 AND authorized_email_id = ?2",
            params![user_id, email_id],
        )?;
        Ok(rows > 0)
    }

    // Delegation

    fn list_admin_allowed_emails(&self, admin_id: i64) -> Result<Vec<i64>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT authorized_email_id FROM admin_allowed_emails
             WHERE admin_user_id = ?1 ORDER BY authorized_email_id",
        )?;

        let rows = stmt.query_map(params![admin_id], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn replace_admin_allowed_emails(&self, admin_id: i64, email_ids: &[i64]) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(tx_failed)?;

        tx.execute(
            "DELETE FROM admin_allowed_emails WHERE admin_user_id = ?1",
            params![admin_id],
        )
        .map_err(tx_failed)?;

        let mut inserted = 0;
        for &email_id in email_ids {
            inserted += tx
                .execute(
                    "INSERT OR IGNORE INTO admin_allowed_emails (admin_user_id, authorized_email_id)
                     SELECT ?1, id FROM authorized_emails WHERE id = ?2",
                    params![admin_id, email_id],
                )
                .map_err(tx_failed)?;
        }

        tx.commit().map_err(tx_failed)?;
        Ok(inserted)
    }

    // Template operations

    fn create_template(&self, template: &NewTemplate) -> Result<PermissionTemplate> {
        let conn = self.conn();
        let now = format_datetime(&Utc::now());
        let email_ids = serde_json::to_string(&template.email_ids)
            .map_err(|e| Error::Validation(format!("invalid template email ids: {e}")))?;

        conn.execute(
            "INSERT INTO permission_templates (name, description, email_ids, created_by, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                template.name,
                template.description,
                email_ids,
                template.created_by,
                now,
            ],
        )?;

        let id = conn.last_insert_rowid();
        conn.query_row(
            &format!("SELECT {TEMPLATE_COLUMNS} FROM permission_templates WHERE id = ?1"),
            params![id],
            template_from_row,
        )
        .map_err(Error::from)
    }

    fn get_template(&self, id: i64) -> Result<Option<PermissionTemplate>> {
        let conn = self.conn();
        conn.query_row(
            &format!("SELECT {TEMPLATE_COLUMNS} FROM permission_templates WHERE id = ?1"),
            params![id],
            template_from_row,
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_templates(&self) -> Result<Vec<PermissionTemplate>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(&format!(
            "SELECT {TEMPLATE_COLUMNS} FROM permission_templates ORDER BY name"
        ))?;

        let rows = stmt.query_map([], template_from_row)?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn delete_template(&self, id: i64) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM permission_templates WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    // Platform / subject operations

    fn create_platform(&self, name: &str) -> Result<Platform> {
        let conn = self.conn();
        let result = conn.execute("INSERT INTO platforms (name) VALUES (?1)", params![name]);

        match result {
            Ok(_) => {}
            Err(e) if is_unique_violation(&e) => return Err(Error::AlreadyExists),
            Err(e) => return Err(Error::from(e)),
        }

        Ok(Platform {
            id: conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    fn get_platform(&self, id: i64) -> Result<Option<Platform>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, name FROM platforms WHERE id = ?1",
            params![id],
            |row| {
                Ok(Platform {
                    id: row.get(0)?,
                    name: row.get(1)?,
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn list_platforms(&self) -> Result<Vec<Platform>> {
        let conn = self.conn();
        let mut stmt = conn.prepare("SELECT id, name FROM platforms ORDER BY name")?;

        let rows = stmt.query_map([], |row| {
            Ok(Platform {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn list_platform_subjects(&self, user_id: i64, platform_id: i64) -> Result<Vec<String>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT subject_keyword FROM platform_subject_assignments
             WHERE user_id = ?1 AND platform_id = ?2 ORDER BY subject_keyword",
        )?;

        let rows = stmt.query_map(params![user_id, platform_id], |row| row.get(0))?;
        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn replace_platform_subjects(
        &self,
        user_id: i64,
        platform_id: i64,
        keywords: &[String],
    ) -> Result<usize> {
        let mut conn = self.conn();
        let tx = conn.transaction().map_err(tx_failed)?;

        tx.execute(
            "DELETE FROM platform_subject_assignments WHERE user_id = ?1 AND platform_id = ?2",
            params![user_id, platform_id],
        )
        .map_err(tx_failed)?;

        let mut inserted = 0;
        for keyword in keywords {
            inserted += tx
                .execute(
                    "INSERT OR IGNORE INTO platform_subject_assignments
                         (user_id, platform_id, subject_keyword)
                     VALUES (?1, ?2, ?3)",
                    params![user_id, platform_id, keyword],
                )
                .map_err(tx_failed)?;
        }

        tx.commit().map_err(tx_failed)?;
        Ok(inserted)
    }

    // Session operations

    fn create_session(&self, session: &Session) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sessions (id, user_id, created_at, expires_at) VALUES (?1, ?2, ?3, ?4)",
            params![
                session.id,
                session.user_id,
                format_datetime(&session.created_at),
                format_datetime(&session.expires_at),
            ],
        )?;
        Ok(())
    }

    fn get_session(&self, id: &str) -> Result<Option<Session>> {
        let conn = self.conn();
        conn.query_row(
            "SELECT id, user_id, created_at, expires_at FROM sessions WHERE id = ?1",
            params![id],
            |row| {
                Ok(Session {
                    id: row.get(0)?,
                    user_id: row.get(1)?,
                    created_at: parse_datetime(&row.get::<_, String>(2)?),
                    expires_at: parse_datetime(&row.get::<_, String>(3)?),
                })
            },
        )
        .optional()
        .map_err(Error::from)
    }

    fn delete_session(&self, id: &str) -> Result<bool> {
        let rows = self
            .conn()
            .execute("DELETE FROM sessions WHERE id = ?1", params![id])?;
        Ok(rows > 0)
    }

    fn purge_expired_sessions(&self) -> Result<usize> {
        let rows = self.conn().execute(
            "DELETE FROM sessions WHERE expires_at < ?1",
            params![format_datetime(&Utc::now())],
        )?;
        Ok(rows)
    }

    // Audit trail

    fn record_event(&self, user_id: Option<i64>, action: &str, detail: Option<&str>) -> Result<()> {
        self.conn().execute(
            "INSERT INTO audit_events (user_id, action, detail, created_at) VALUES (?1, ?2, ?3, ?4)",
            params![user_id, action, detail, format_datetime(&Utc::now())],
        )?;
        Ok(())
    }

    fn list_events(&self, limit: i64) -> Result<Vec<AuditEvent>> {
        let conn = self.conn();
        let mut stmt = conn.prepare(
            "SELECT id, user_id, action, detail, created_at FROM audit_events
             ORDER BY id DESC LIMIT ?1",
        )?;

        let rows = stmt.query_map(params![limit], |row| {
            Ok(AuditEvent {
                id: row.get(0)?,
                user_id: row.get(1)?,
                action: row.get(2)?,
                detail: row.get(3)?,
                created_at: parse_datetime(&row.get::<_, String>(4)?),
            })
        })?;

        rows.collect::<std::result::Result<Vec<_>, _>>()
            .map_err(Error::from)
    }

    fn close(&self) -> Result<()> {
        Ok(())
    }
}
