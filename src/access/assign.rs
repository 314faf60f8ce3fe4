use std::collections::HashSet;

use super::{allowed_scope, can_manage};
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Actor, AssignOutcome, AuthorizedEmail, EmailAssignment, EmailScope, Role};

/// Replaces the target user's authorized-email set with `requested`.
///
/// The request is deduplicated, filtered to the actor's scope, and committed
/// as a single transactional replace. An empty request is a valid "clear all";
/// a non-empty request whose scope intersection is empty is a
/// [`Error::ScopeViolation`] and leaves the target untouched.
///
/// When a superadmin edits an admin's own set, emails dropped from the admin
/// are also removed from every user that admin created, inside the same
/// transaction.
pub fn assign_emails(
    store: &dyn Store,
    actor: &Actor,
    target_user_id: i64,
    requested: &[i64],
) -> Result<AssignOutcome> {
    let target = can_manage(store, actor, target_user_id)?;

    // Snapshot before mutation; the cascade diff is computed against it.
    let previous = store.list_assignment_ids(target.id)?;

    let scope = allowed_scope(store, actor)?;
    let filtered = scope.filter(&dedup(requested));

    if filtered.is_empty() && !requested.is_empty() {
        return Err(Error::ScopeViolation);
    }

    let cascade = if actor.role == Role::Superadmin && target.role == Role::Admin {
        let kept: HashSet<i64> = filtered.iter().copied().collect();
        let removed: Vec<i64> = previous.iter().copied().filter(|id| !kept.contains(id)).collect();
        Some(removed)
    } else {
        None
    };

    store.replace_assignments(target.id, &filtered, actor.id, cascade.as_deref())
}

/// Read path for the UI: the target's current assignments joined with the
/// catalog.
pub fn get_user_assignments(store: &dyn Store, user_id: i64) -> Result<Vec<EmailAssignment>> {
    store.get_user(user_id)?.ok_or(Error::NotFound)?;
    store.list_assignments(user_id)
}

/// Removes a single assignment row, re-checking manageability first.
pub fn remove_assignment(
    store: &dyn Store,
    actor: &Actor,
    target_user_id: i64,
    email_id: i64,
) -> Result<()> {
    let target = can_manage(store, actor, target_user_id)?;

    if !store.delete_assignment(target.id, email_id)? {
        return Err(Error::NotFound);
    }
    Ok(())
}

/// Typeahead search over catalog emails not yet assigned to the target,
/// limited to the actor's scope. Returns the page plus a `has_more` flag.
pub fn search_available_emails(
    store: &dyn Store,
    actor: &Actor,
    target_user_id: i64,
    query: &str,
    offset: usize,
    limit: usize,
) -> Result<(Vec<AuthorizedEmail>, bool)> {
    store.get_user(target_user_id)?.ok_or(Error::NotFound)?;

    match allowed_scope(store, actor)? {
        EmailScope::All => {
            let mut page = store.search_unassigned_emails(
                target_user_id,
                query,
                offset as i64,
                limit as i64 + 1,
            )?;
            let has_more = page.len() > limit;
            page.truncate(limit);
            Ok((page, has_more))
        }
        EmailScope::Restricted(ids) => {
            // Delegated scopes are small by construction; filter and page in
            // memory rather than building a dynamic IN clause.
            if ids.is_empty() {
                return Ok((Vec::new(), false));
            }

            let assigned: HashSet<i64> =
                store.list_assignment_ids(target_user_id)?.into_iter().collect();
            let needle = query.to_lowercase();

            let mut candidates = Vec::new();
            let mut sorted_ids: Vec<i64> = ids.into_iter().collect();
            sorted_ids.sort_unstable();
            for id in sorted_ids {
                if assigned.contains(&id) {
                    continue;
                }
                if let Some(email) = store.get_authorized_email(id)? {
                    if needle.is_empty() || email.email.to_lowercase().contains(&needle) {
                        candidates.push(email);
                    }
                }
            }
            candidates.sort_by(|a, b| a.email.cmp(&b.email));

            let has_more = candidates.len() > offset + limit;
            let page = candidates
                .into_iter()
                .skip(offset)
                .take(limit)
                .collect();
            Ok((page, has_more))
        }
    }
}

/// Order-preserving dedup; requests are sets, repeats carry no meaning.
fn dedup(ids: &[i64]) -> Vec<i64> {
    let mut seen = HashSet::new();
    ids.iter()
        .copied()
        .filter(|id| seen.insert(*id))
        .collect()
}
