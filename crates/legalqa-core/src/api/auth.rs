//! `ApiClient` as the backend for the session core.
//!
//! Maps transport-level `ApiError`s onto the auth taxonomy. No call here
//! retries; the session manager decides what a failure means.

use async_trait::async_trait;
use tracing::debug;

use super::{ApiClient, ApiError};
use crate::auth::{AuthFailure, Authenticator, IdentityResolver, ResolveError};
use crate::models::{Token, User};

fn login_failure(err: ApiError) -> AuthFailure {
    match err {
        ApiError::Unauthorized | ApiError::AccessDenied(_) | ApiError::Rejected(_) => {
            AuthFailure::InvalidCredentials
        }
        ApiError::NetworkError(ref e) if err.is_transport() => {
            AuthFailure::NetworkFailure(e.to_string())
        }
        other => AuthFailure::ServerError(other.to_string()),
    }
}

fn registration_failure(err: ApiError) -> AuthFailure {
    match err {
        ApiError::Rejected(reason) | ApiError::AccessDenied(reason) => {
            AuthFailure::RegistrationRejected(reason)
        }
        ApiError::NetworkError(ref e) if err.is_transport() => {
            AuthFailure::NetworkFailure(e.to_string())
        }
        other => AuthFailure::ServerError(other.to_string()),
    }
}

fn resolve_failure(err: ApiError) -> ResolveError {
    match err {
        ApiError::Unauthorized | ApiError::AccessDenied(_) | ApiError::NotFound(_) => {
            ResolveError::Unauthorized
        }
        ApiError::NetworkError(ref e) if err.is_transport() => {
            ResolveError::NetworkFailure(e.to_string())
        }
        ApiError::NetworkError(e) => ResolveError::MalformedResponse(e.to_string()),
        ApiError::InvalidResponse(reason) | ApiError::Rejected(reason) => {
            ResolveError::MalformedResponse(reason)
        }
        // 5xx and throttling are the backend being unavailable, not the token being bad
        other @ (ApiError::ServerError(_) | ApiError::RateLimited) => {
            ResolveError::NetworkFailure(other.to_string())
        }
    }
}

#[async_trait]
impl Authenticator for ApiClient {
    async fn request_token(&self, username: &str, password: &str) -> Result<Token, AuthFailure> {
        self.fetch_token(username, password)
            .await
            .map_err(|e| {
                debug!(error = %e, "Token request failed");
                login_failure(e)
            })
    }

    async fn register(
        &self,
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<(), AuthFailure> {
        self.register_account(username, email, password)
            .await
            .map_err(|e| {
                debug!(error = %e, "Registration request failed");
                registration_failure(e)
            })
    }
}

#[async_trait]
impl IdentityResolver for ApiClient {
    async fn resolve(&self, token: &Token) -> Result<User, ResolveError> {
        self.fetch_current_user(token).await.map_err(|e| {
            debug!(error = %e, "Identity lookup failed");
            resolve_failure(e)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_login_failure_mapping() {
        assert_eq!(login_failure(ApiError::Unauthorized), AuthFailure::InvalidCredentials);
        assert_eq!(
            login_failure(ApiError::Rejected("Incorrect username or password".to_string())),
            AuthFailure::InvalidCredentials
        );
        assert!(matches!(
            login_failure(ApiError::ServerError("boom".to_string())),
            AuthFailure::ServerError(_)
        ));
        assert!(matches!(
            login_failure(ApiError::InvalidResponse("empty access_token".to_string())),
            AuthFailure::ServerError(_)
        ));
    }

    #[test]
    fn test_registration_failure_mapping() {
        assert_eq!(
            registration_failure(ApiError::Rejected("Username already registered".to_string())),
            AuthFailure::RegistrationRejected("Username already registered".to_string())
        );
        assert!(matches!(
            registration_failure(ApiError::RateLimited),
            AuthFailure::ServerError(_)
        ));
    }

    #[test]
    fn test_resolve_failure_mapping() {
        assert_eq!(resolve_failure(ApiError::Unauthorized), ResolveError::Unauthorized);
        assert_eq!(
            resolve_failure(ApiError::NotFound("user".to_string())),
            ResolveError::Unauthorized
        );
        assert!(matches!(
            resolve_failure(ApiError::InvalidResponse("Status 302".to_string())),
            ResolveError::MalformedResponse(_)
        ));
        assert!(matches!(
            resolve_failure(ApiError::ServerError("down".to_string())),
            ResolveError::NetworkFailure(_)
        ));
    }
}
