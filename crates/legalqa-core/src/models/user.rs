use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity returned by `GET /users/me`.
///
/// Only `username` and `email` are interpreted; anything else the backend
/// sends is kept in `profile` so richer profiles survive a round trip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(flatten)]
    pub profile: Map<String, Value>,
}

impl User {
    pub fn display_name(&self) -> String {
        if self.email.is_empty() {
            self.username.clone()
        } else {
            format!("{} <{}>", self.username, self.email)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_users_me_response() {
        let json = r#"{"username": "alice", "email": "alice@example.com", "disabled": false}"#;
        let user: User = serde_json::from_str(json).expect("Failed to parse user JSON");
        assert_eq!(user.username, "alice");
        assert_eq!(user.email, "alice@example.com");
        assert_eq!(user.profile.get("disabled"), Some(&Value::Bool(false)));
        assert_eq!(user.display_name(), "alice <alice@example.com>");
    }

    #[test]
    fn test_missing_email_defaults_empty() {
        let user: User = serde_json::from_str(r#"{"username": "bob"}"#)
            .expect("Failed to parse user JSON");
        assert_eq!(user.email, "");
        assert_eq!(user.display_name(), "bob");
    }

    #[test]
    fn test_missing_username_is_rejected() {
        assert!(serde_json::from_str::<User>(r#"{"email": "x@y.z"}"#).is_err());
    }
}
