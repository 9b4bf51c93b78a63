use async_trait::async_trait;
use thiserror::Error;

use crate::models::{Token, User};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("Token rejected by the identity endpoint")]
    Unauthorized,

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("Malformed identity response: {0}")]
    MalformedResponse(String),
}

/// Turns a bearer token into the identity it belongs to.
///
/// Implementations make exactly one attempt; retry policy belongs to the caller.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve(&self, token: &Token) -> Result<User, ResolveError>;
}
