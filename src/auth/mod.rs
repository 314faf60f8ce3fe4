mod middleware;
mod password;
mod session;

pub use middleware::{AuthError, RequireAdmin, RequireSuperadmin};
pub use password::PasswordHasher;
pub use session::{
    SESSION_COOKIE, SESSION_TTL_HOURS, build_cookie, clear_cookie, generate_session_id,
    session_from_cookie_header,
};
