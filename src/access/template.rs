use super::assign_emails;
use crate::error::{Error, Result};
use crate::store::Store;
use crate::types::{Actor, TemplateOutcome};

/// Applies a template's email-id snapshot to each target user independently.
///
/// Per-user failures (ownership, scope, missing user) are logged and counted
/// as misses; successes for other users are never rolled back. The caller
/// decides how to present a partial result.
pub fn apply_template(
    store: &dyn Store,
    actor: &Actor,
    template_id: i64,
    target_user_ids: &[i64],
) -> Result<TemplateOutcome> {
    let template = store.get_template(template_id)?.ok_or(Error::NotFound)?;

    if target_user_ids.is_empty() {
        return Err(Error::Validation("no target users given".to_string()));
    }

    let mut applied = 0;
    for &user_id in target_user_ids {
        match assign_emails(store, actor, user_id, &template.email_ids) {
            Ok(_) => applied += 1,
            Err(e) => {
                tracing::warn!(
                    "template {} not applied to user {user_id}: {e}",
                    template.id
                );
            }
        }
    }

    Ok(TemplateOutcome {
        applied,
        total: target_user_ids.len(),
    })
}
