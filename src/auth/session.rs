use uuid::Uuid;

pub const SESSION_COOKIE: &str = "mailshare_session";
pub const SESSION_TTL_HOURS: i64 = 24;

const SESSION_PREFIX: &str = "mailshare";

/// Generates a session id with the format: mailshare_<32 hex chars>
#[must_use]
pub fn generate_session_id() -> String {
    format!("{SESSION_PREFIX}_{}", Uuid::new_v4().simple())
}

/// Builds the Set-Cookie value for a fresh session.
#[must_use]
pub fn build_cookie(session_id: &str) -> String {
    format!("{SESSION_COOKIE}={session_id}; Path=/; HttpOnly; SameSite=Lax")
}

/// Builds the Set-Cookie value that clears the session cookie.
#[must_use]
pub fn clear_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Extracts the session id from a Cookie header, if present.
#[must_use]
pub fn session_from_cookie_header(header: &str) -> Option<String> {
    header.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        if name == SESSION_COOKIE && !value.is_empty() {
            Some(value.to_string())
        } else {
            None
        }
    })
}
