use std::collections::HashSet;

use crate::error::Result;
use crate::store::Store;
use crate::types::{Actor, EmailScope, Role};

/// Resolves the set of authorized-email ids `actor` may assign.
///
/// Superadmins are unrestricted. An admin with delegation rows is restricted
/// to exactly those ids; an admin with *no* delegation rows is unrestricted.
/// Absence of rows means "no restriction", not "nothing allowed". Plain users
/// get an empty restricted scope.
pub fn allowed_scope(store: &dyn Store, actor: &Actor) -> Result<EmailScope> {
    match actor.role {
        Role::Superadmin => Ok(EmailScope::All),
        Role::Admin => {
            let delegated = store.list_admin_allowed_emails(actor.id)?;
            if delegated.is_empty() {
                Ok(EmailScope::All)
            } else {
                Ok(EmailScope::Restricted(delegated.into_iter().collect()))
            }
        }
        Role::User => Ok(EmailScope::Restricted(HashSet::new())),
    }
}
