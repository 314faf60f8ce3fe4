use crate::server::response::ApiError;

const MAX_USERNAME_LEN: usize = 64;
const MAX_EMAIL_LEN: usize = 254;
const MIN_PASSWORD_LEN: usize = 8;

fn is_valid_username_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.'
}

pub fn validate_username(name: &str) -> Result<(), ApiError> {
    if name.is_empty() {
        return Err(ApiError::bad_request("Username cannot be empty"));
    }
    if name.len() > MAX_USERNAME_LEN {
        return Err(ApiError::bad_request(format!(
            "Username cannot exceed {MAX_USERNAME_LEN} characters"
        )));
    }
    if !name.chars().all(is_valid_username_char) {
        return Err(ApiError::bad_request(
            "Username can only contain alphanumeric characters, hyphens, underscores, and periods",
        ));
    }
    Ok(())
}

pub fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Light structural check; the catalog is admin-curated, not user-facing.
pub fn validate_email(email: &str) -> Result<(), ApiError> {
    if email.is_empty() {
        return Err(ApiError::bad_request("Email cannot be empty"));
    }
    if email.len() > MAX_EMAIL_LEN {
        return Err(ApiError::bad_request(format!(
            "Email cannot exceed {MAX_EMAIL_LEN} characters"
        )));
    }
    let Some((local, domain)) = email.split_once('@') else {
        return Err(ApiError::bad_request("Email must contain '@'"));
    };
    if local.is_empty() || domain.is_empty() || !domain.contains('.') {
        return Err(ApiError::bad_request("Email is malformed"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_username_rules() {
        assert!(validate_username("alice-01").is_ok());
        assert!(validate_username("").is_err());
        assert!(validate_username("no spaces").is_err());
        assert!(validate_username(&"x".repeat(65)).is_err());
    }

    #[test]
    fn test_email_rules() {
        assert!(validate_email("sales@example.com").is_ok());
        assert!(validate_email("no-at-sign").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("x@nodot").is_err());
    }
}
