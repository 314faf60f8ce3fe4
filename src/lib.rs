//! # Mailshare
//!
//! The server core of an email-inbox-sharing admin panel, usable both as a
//! standalone binary and as a library. Administrators authorize specific
//! email addresses per user, delegate assignable scopes to admins, group
//! authorizations into reusable templates, and maintain per-platform
//! subject-keyword filters.
//!
//! ## Library Usage
//!
//! ```toml
//! [dependencies]
//! mailshare = { version = "0.1", default-features = false }
//! ```
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::path::PathBuf;
//! use mailshare::server::{AppState, create_router};
//! use mailshare::store::{SqliteStore, Store};
//!
//! let store = SqliteStore::new(&PathBuf::from("./data/mailshare.db")).unwrap();
//! store.initialize().unwrap();
//!
//! let state = Arc::new(AppState::new(Arc::new(store)));
//! let router = create_router(state);
//! // Serve with axum...
//! ```
//!
//! ## Feature Flags
//!
//! - `cli` (default): Includes the CLI entrypoint dependencies. Disable with
//!   `default-features = false`.

pub mod access;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod store;
pub mod types;
