use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Actor, Role, User};

/// Resolves whether `actor` may manage the target user, returning the target
/// row on success.
///
/// Superadmins manage admins and unowned users; a user owned by an admin
/// (non-null `created_by_admin_id`) is off-limits to direct superadmin
/// management and belongs exclusively to the owning admin. Plain users manage
/// nothing. This predicate gates every mutating operation on a user's
/// assignments and account.
pub fn can_manage(store: &dyn Store, actor: &Actor, target_user_id: i64) -> Result<User> {
    let target = store.get_user(target_user_id)?.ok_or(Error::NotFound)?;

    let allowed = match actor.role {
        Role::Superadmin => {
            !(target.role == Role::User && target.created_by_admin_id.is_some())
        }
        Role::Admin => {
            target.role == Role::User && target.created_by_admin_id == Some(actor.id)
        }
        Role::User => false,
    };

    if allowed { Ok(target) } else { Err(Error::Forbidden) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewUser, SqliteStore};
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn add_user(store: &SqliteStore, username: &str, role: Role, owner: Option<i64>) -> User {
        store
            .create_user(&NewUser {
                username: username.to_string(),
                password_hash: "$argon2id$test".to_string(),
                role,
                created_by_admin_id: owner,
            })
            .unwrap()
    }

    #[test]
    fn test_ownership_gate() {
        let (_temp, store) = test_store();

        let root = add_user(&store, "root", Role::Superadmin, None);
        let admin_a = add_user(&store, "admin-a", Role::Admin, None);
        let admin_b = add_user(&store, "admin-b", Role::Admin, None);
        let owned = add_user(&store, "owned", Role::User, Some(admin_a.id));
        let unowned = add_user(&store, "unowned", Role::User, None);

        let superadmin = Actor::new(root.id, Role::Superadmin);
        let actor_a = Actor::new(admin_a.id, Role::Admin);
        let actor_b = Actor::new(admin_b.id, Role::Admin);

        // Superadmin reaches admins and unowned users, never owned ones.
        assert!(can_manage(&store, &superadmin, admin_a.id).is_ok());
        assert!(can_manage(&store, &superadmin, unowned.id).is_ok());
        assert!(matches!(
            can_manage(&store, &superadmin, owned.id),
            Err(Error::Forbidden)
        ));

        // The owning admin reaches its user; nobody else does.
        assert!(can_manage(&store, &actor_a, owned.id).is_ok());
        assert!(matches!(
            can_manage(&store, &actor_b, owned.id),
            Err(Error::Forbidden)
        ));

        // Admins never manage other admins or unowned users.
        assert!(matches!(
            can_manage(&store, &actor_a, admin_b.id),
            Err(Error::Forbidden)
        ));
        assert!(matches!(
            can_manage(&store, &actor_a, unowned.id),
            Err(Error::Forbidden)
        ));
    }

    #[test]
    fn test_missing_target_is_not_found() {
        let (_temp, store) = test_store();
        let root = add_user(&store, "root", Role::Superadmin, None);
        let actor = Actor::new(root.id, Role::Superadmin);

        assert!(matches!(
            can_manage(&store, &actor, 404),
            Err(Error::NotFound)
        ));
    }

    #[test]
    fn test_plain_users_manage_nothing() {
        let (_temp, store) = test_store();
        let u1 = add_user(&store, "u1", Role::User, None);
        let u2 = add_user(&store, "u2", Role::User, None);

        let actor = Actor::new(u1.id, Role::User);
        assert!(matches!(
            can_manage(&store, &actor, u2.id),
            Err(Error::Forbidden)
        ));
    }
}
