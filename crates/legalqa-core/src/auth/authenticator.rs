use async_trait::async_trait;

use super::AuthFailure;
use crate::models::Token;

/// Backend operations that mint a token or create an account.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Exchange a username and password for a bearer token.
    async fn request_token(&self, username: &str, password: &str) -> Result<Token, AuthFailure>;

    /// Create an account. Success does not sign the user in.
    async fn register(&self, username: &str, email: &str, password: &str)
        -> Result<(), AuthFailure>;
}
