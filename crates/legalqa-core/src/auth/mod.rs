//! Authentication module for managing the user session.
//!
//! This module provides:
//! - `SessionManager`: the session state machine (login, register, logout, bootstrap)
//! - `CredentialStore`: durable single-slot token storage (keychain, file, memory)
//! - `Authenticator` / `IdentityResolver`: the backend calls the session depends on
//!
//! Tokens are persisted until logout or until the backend refuses them.

pub mod authenticator;
pub mod credentials;
pub mod error;
pub mod resolver;
pub mod session;

pub use authenticator::Authenticator;
pub use credentials::{CredentialStore, FileStore, KeyringStore, MemoryStore};
pub use error::AuthFailure;
pub use resolver::{IdentityResolver, ResolveError};
pub use session::{SessionManager, SessionState};
