use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Role of a principal in the management hierarchy.
///
/// Superadmins manage admins and unowned users; admins manage only the users
/// they created; plain users manage nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Superadmin,
    Admin,
    User,
}

impl Role {
    /// Converts a role string (as stored in the database) to a Role.
    pub fn parse(s: &str) -> Option<Role> {
        match s {
            "superadmin" => Some(Role::Superadmin),
            "admin" => Some(Role::Admin),
            "user" => Some(Role::User),
            _ => None,
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::Admin => "admin",
            Role::User => "user",
        }
    }

    /// Returns true for roles allowed into the admin panel at all.
    #[must_use]
    pub const fn is_panel_role(self) -> bool {
        matches!(self, Role::Superadmin | Role::Admin)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The authenticated principal performing an operation.
///
/// Built by the session extractor and passed explicitly into every engine
/// call; nothing below the extractor layer reads ambient session state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: Role,
}

impl Actor {
    #[must_use]
    pub const fn new(id: i64, role: Role) -> Self {
        Self { id, role }
    }
}

/// The set of authorized-email ids an actor may assign.
///
/// `All` applies no filtering downstream. `Restricted` filters to the given
/// set; an empty `Restricted` set means nothing may be assigned, which is a
/// different state from `All` and must never collapse into it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmailScope {
    All,
    Restricted(HashSet<i64>),
}

impl EmailScope {
    #[must_use]
    pub fn permits(&self, email_id: i64) -> bool {
        match self {
            EmailScope::All => true,
            EmailScope::Restricted(ids) => ids.contains(&email_id),
        }
    }

    /// Filters the requested ids down to the scope intersection, preserving
    /// the input order.
    #[must_use]
    pub fn filter(&self, requested: &[i64]) -> Vec<i64> {
        requested
            .iter()
            .copied()
            .filter(|id| self.permits(*id))
            .collect()
    }

    #[must_use]
    pub const fn is_restricted(&self) -> bool {
        matches!(self, EmailScope::Restricted(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Superadmin, Role::Admin, Role::User] {
            assert_eq!(Role::parse(role.as_str()), Some(role));
        }
        assert_eq!(Role::parse("root"), None);
    }

    #[test]
    fn test_panel_roles() {
        assert!(Role::Superadmin.is_panel_role());
        assert!(Role::Admin.is_panel_role());
        assert!(!Role::User.is_panel_role());
    }

    #[test]
    fn test_scope_all_permits_everything() {
        let scope = EmailScope::All;
        assert!(scope.permits(1));
        assert_eq!(scope.filter(&[4, 5, 6]), vec![4, 5, 6]);
    }

    #[test]
    fn test_scope_restricted_filters() {
        let scope = EmailScope::Restricted(HashSet::from([1, 3]));
        assert!(scope.permits(1));
        assert!(!scope.permits(2));
        assert_eq!(scope.filter(&[1, 2, 3]), vec![1, 3]);
    }

    #[test]
    fn test_empty_restricted_is_not_all() {
        let scope = EmailScope::Restricted(HashSet::new());
        assert!(scope.is_restricted());
        assert!(!scope.permits(1));
        assert!(scope.filter(&[1, 2]).is_empty());
    }
}
