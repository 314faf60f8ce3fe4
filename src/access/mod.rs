//! Permission-assignment and access-control resolution engine.
//!
//! Everything here takes an explicit [`Actor`](crate::types::Actor) and a
//! `&dyn Store`; no ambient session state is consulted below the HTTP
//! extractor layer.

mod assign;
mod manage;
mod scope;
mod subjects;
mod template;

pub use assign::{
    assign_emails, get_user_assignments, remove_assignment, search_available_emails,
};
pub use manage::can_manage;
pub use scope::allowed_scope;
pub use subjects::{list_platform_subjects, save_platform_assignment};
pub use template::apply_template;
