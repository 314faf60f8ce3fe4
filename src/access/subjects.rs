use crate::error::{Error, Result};
use crate::store::Store;

/// Replaces the subject-keyword set for a (user, platform) pair.
///
/// Coarser than the email engine: the handler's session-level admin gate is
/// the only authorization; there is no ownership filter here. An empty
/// keyword list is a valid clear.
pub fn save_platform_assignment(
    store: &dyn Store,
    user_id: i64,
    platform_id: i64,
    keywords: &[String],
) -> Result<usize> {
    store.get_user(user_id)?.ok_or(Error::NotFound)?;
    store.get_platform(platform_id)?.ok_or(Error::NotFound)?;

    let mut cleaned = Vec::with_capacity(keywords.len());
    for keyword in keywords {
        let trimmed = keyword.trim();
        if trimmed.is_empty() {
            return Err(Error::Validation(
                "subject keywords cannot be empty".to_string(),
            ));
        }
        if !cleaned.iter().any(|k| k == trimmed) {
            cleaned.push(trimmed.to_string());
        }
    }

    store.replace_platform_subjects(user_id, platform_id, &cleaned)
}

/// Read path: the stored keyword set for a (user, platform) pair.
pub fn list_platform_subjects(
    store: &dyn Store,
    user_id: i64,
    platform_id: i64,
) -> Result<Vec<String>> {
    store.get_user(user_id)?.ok_or(Error::NotFound)?;
    store.get_platform(platform_id)?.ok_or(Error::NotFound)?;
    store.list_platform_subjects(user_id, platform_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{NewUser, SqliteStore};
    use crate::types::Role;
    use tempfile::TempDir;

    fn test_store() -> (TempDir, SqliteStore) {
        let temp = TempDir::new().unwrap();
        let store = SqliteStore::new(temp.path().join("test.db")).unwrap();
        store.initialize().unwrap();
        (temp, store)
    }

    fn seed(store: &SqliteStore) -> (i64, i64) {
        let user = store
            .create_user(&NewUser {
                username: "worker".to_string(),
                password_hash: "$argon2id$test".to_string(),
                role: Role::User,
                created_by_admin_id: None,
            })
            .unwrap();
        let platform = store.create_platform("amazon").unwrap();
        (user.id, platform.id)
    }

    #[test]
    fn test_save_and_clear() {
        let (_temp, store) = test_store();
        let (user_id, platform_id) = seed(&store);

        let keywords = vec![" order ".to_string(), "refund".to_string()];
        let saved = save_platform_assignment(&store, user_id, platform_id, &keywords).unwrap();
        assert_eq!(saved, 2);
        assert_eq!(
            list_platform_subjects(&store, user_id, platform_id).unwrap(),
            vec!["order", "refund"]
        );

        let cleared = save_platform_assignment(&store, user_id, platform_id, &[]).unwrap();
        assert_eq!(cleared, 0);
        assert!(list_platform_subjects(&store, user_id, platform_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_blank_keyword_is_rejected() {
        let (_temp, store) = test_store();
        let (user_id, platform_id) = seed(&store);

        let result = save_platform_assignment(
            &store,
            user_id,
            platform_id,
            &["order".to_string(), "   ".to_string()],
        );
        assert!(matches!(result, Err(Error::Validation(_))));
        assert!(list_platform_subjects(&store, user_id, platform_id)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_unknown_user_or_platform() {
        let (_temp, store) = test_store();
        let (user_id, platform_id) = seed(&store);

        assert!(matches!(
            save_platform_assignment(&store, 999, platform_id, &[]),
            Err(Error::NotFound)
        ));
        assert!(matches!(
            save_platform_assignment(&store, user_id, 999, &[]),
            Err(Error::NotFound)
        ));
    }
}
