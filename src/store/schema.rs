pub const SCHEMA: &str = r#"
-- Principals. Admin-created users carry created_by_admin_id; when the owning
-- admin is deleted they become unowned instead of disappearing.
CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,          -- argon2id hash with embedded salt
    role TEXT NOT NULL CHECK (role IN ('superadmin', 'admin', 'user')),
    created_by_admin_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    created_at TEXT DEFAULT (datetime('now')),
    updated_at TEXT DEFAULT (datetime('now'))
);

-- Global catalog of shareable email addresses
CREATE TABLE IF NOT EXISTS authorized_emails (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    email TEXT NOT NULL UNIQUE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Which catalog emails a user may read
CREATE TABLE IF NOT EXISTS user_authorized_emails (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    authorized_email_id INTEGER NOT NULL REFERENCES authorized_emails(id) ON DELETE CASCADE,
    assigned_by INTEGER NOT NULL,
    assigned_at TEXT DEFAULT (datetime('now')),
    PRIMARY KEY (user_id, authorized_email_id)
);

-- Delegation: the subset of the catalog an admin may hand out to its users.
-- No rows for an admin means the admin is unrestricted.
CREATE TABLE IF NOT EXISTS admin_allowed_emails (
    admin_user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    authorized_email_id INTEGER NOT NULL REFERENCES authorized_emails(id) ON DELETE CASCADE,
    PRIMARY KEY (admin_user_id, authorized_email_id)
);

-- Reusable email-id sets; email_ids is a JSON array snapshot
CREATE TABLE IF NOT EXISTS permission_templates (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL,
    description TEXT,
    email_ids TEXT NOT NULL DEFAULT '[]',
    created_by INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Platform catalog for subject-keyword filters
CREATE TABLE IF NOT EXISTS platforms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Subject keywords a user may search on, per platform
CREATE TABLE IF NOT EXISTS platform_subject_assignments (
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    platform_id INTEGER NOT NULL REFERENCES platforms(id) ON DELETE CASCADE,
    subject_keyword TEXT NOT NULL,
    PRIMARY KEY (user_id, platform_id, subject_keyword)
);

-- Browser sessions; the id rides the session cookie
CREATE TABLE IF NOT EXISTS sessions (
    id TEXT PRIMARY KEY,
    user_id INTEGER NOT NULL REFERENCES users(id) ON DELETE CASCADE,
    created_at TEXT DEFAULT (datetime('now')),
    expires_at TEXT NOT NULL
);

-- Audit trail; rows outlive their user
CREATE TABLE IF NOT EXISTS audit_events (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    user_id INTEGER REFERENCES users(id) ON DELETE SET NULL,
    action TEXT NOT NULL,
    detail TEXT,
    created_at TEXT DEFAULT (datetime('now'))
);

-- Create indexes
CREATE INDEX IF NOT EXISTS idx_users_created_by ON users(created_by_admin_id);
CREATE INDEX IF NOT EXISTS idx_user_emails_email ON user_authorized_emails(authorized_email_id);
CREATE INDEX IF NOT EXISTS idx_admin_allowed_admin ON admin_allowed_emails(admin_user_id);
CREATE INDEX IF NOT EXISTS idx_subjects_user_platform ON platform_subject_assignments(user_id, platform_id);
CREATE INDEX IF NOT EXISTS idx_sessions_user ON sessions(user_id);
CREATE INDEX IF NOT EXISTS idx_audit_events_user ON audit_events(user_id);
"#;
