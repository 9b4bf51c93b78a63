use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque bearer credential issued by `POST /token`.
///
/// `Debug` is redacted so a token never ends up in log output.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Token(String);

impl Token {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Token(<{} bytes>)", self.0.len())
    }
}

impl From<String> for Token {
    fn from(value: String) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_is_redacted() {
        let token = Token::new("secret-value");
        let printed = format!("{:?}", token);
        assert!(!printed.contains("secret"));
        assert_eq!(printed, "Token(<12 bytes>)");
    }

    #[test]
    fn test_blank_token_is_empty() {
        assert!(Token::new("   ").is_empty());
        assert!(!Token::new("abc").is_empty());
    }
}
