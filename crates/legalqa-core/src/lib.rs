//! Core library for the Legal QA client.
//!
//! The session core lives in [`auth`]: [`auth::SessionManager`] owns the
//! bearer token, restores it on startup and exposes the current identity.
//! [`guard`] decides which views may render for a given session state.
//! [`api`] talks to the backend, both for authentication and for the
//! workspace features the views consume.

pub mod api;
pub mod auth;
pub mod config;
pub mod guard;
pub mod models;
pub mod utils;

use std::sync::Arc;

pub use api::{ApiClient, ApiError};
pub use auth::{AuthFailure, CredentialStore, SessionManager, SessionState};
pub use config::Config;
pub use guard::{decide, decide_view, Decision, ViewId};

/// Session manager backed by the HTTP client for every backend role.
pub fn session_for(api: &ApiClient, store: Arc<dyn CredentialStore>) -> SessionManager {
    let backend = Arc::new(api.clone());
    SessionManager::new(backend.clone(), backend, store)
}
