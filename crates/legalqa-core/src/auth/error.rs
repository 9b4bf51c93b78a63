use thiserror::Error;

/// Why an explicit `login` / `register` call failed.
///
/// Every variant leaves the session in a well-defined state; none of them is
/// fatal to the process.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthFailure {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid username or password")]
    InvalidCredentials,

    #[error("Network error: {0}")]
    NetworkFailure(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Registration rejected: {0}")]
    RegistrationRejected(String),

    /// The account was created server-side but the follow-up login failed.
    #[error("Account created, but signing in failed: {0}")]
    RegistrationThenLoginMismatch(#[source] Box<AuthFailure>),

    #[error("Another sign-in operation is already in progress")]
    OperationInProgress,

    /// A `logout` happened while the request was in flight; its result was dropped.
    #[error("Signed out while the request was pending")]
    Superseded,
}

impl AuthFailure {
    /// Message suitable for showing to the person at the keyboard.
    pub fn user_message(&self) -> String {
        match self {
            AuthFailure::InvalidInput(reason) => reason.clone(),
            AuthFailure::InvalidCredentials => "Invalid username or password".to_string(),
            AuthFailure::NetworkFailure(_) => {
                "Unable to connect to server. Check your connection and try again.".to_string()
            }
            AuthFailure::ServerError(_) => {
                "The server could not complete the request. Please try again.".to_string()
            }
            AuthFailure::RegistrationRejected(reason) => format!("Registration failed: {}", reason),
            AuthFailure::RegistrationThenLoginMismatch(_) => {
                "Your account was created, but signing in failed. Please log in.".to_string()
            }
            AuthFailure::OperationInProgress => {
                "Please wait for the current sign-in to finish.".to_string()
            }
            AuthFailure::Superseded => "Signed out before the request completed.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn test_mismatch_keeps_login_cause() {
        let failure = AuthFailure::RegistrationThenLoginMismatch(Box::new(
            AuthFailure::NetworkFailure("connection refused".to_string()),
        ));
        let source = failure.source().map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("Network error: connection refused"));
        assert_ne!(failure.user_message(), AuthFailure::InvalidCredentials.user_message());
    }

    #[test]
    fn test_user_message_hides_transport_detail() {
        let failure = AuthFailure::NetworkFailure("dns error: no such host".to_string());
        assert!(!failure.user_message().contains("dns"));
    }
}
