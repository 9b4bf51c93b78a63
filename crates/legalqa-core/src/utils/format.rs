/// Truncate a string to at most `max_bytes`, noting the original size.
/// Cuts on a char boundary so multi-byte text never panics.
pub fn truncate_bytes(s: &str, max_bytes: usize) -> String {
    if s.len() <= max_bytes {
        return s.to_string();
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}... (truncated, {} total bytes)", &s[..end], s.len())
}

/// Truncate a string to a maximum number of chars, adding ellipsis if needed
pub fn truncate_chars(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else if max_len <= 3 {
        s.chars().take(max_len).collect()
    } else {
        let truncated: String = s.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

/// Syntactic email check: one `@`, non-empty local part, a dotted domain,
/// no whitespace. Deliverability is the backend's problem.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|label| !label.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_bytes() {
        assert_eq!(truncate_bytes("short", 10), "short");
        assert_eq!(truncate_bytes("abcdef", 3), "abc... (truncated, 6 total bytes)");
        // 'é' is two bytes; cutting at 1 must back off to 0
        assert_eq!(truncate_bytes("éa", 1), "... (truncated, 3 total bytes)");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("Hello", 10), "Hello");
        assert_eq!(truncate_chars("Hello World", 8), "Hello...");
        assert_eq!(truncate_chars("Hello", 3), "Hel");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("bob@x.com"));
        assert!(is_valid_email("first.last@sub.example.org"));

        assert!(!is_valid_email(""));
        assert!(!is_valid_email("bob"));
        assert!(!is_valid_email("@x.com"));
        assert!(!is_valid_email("bob@"));
        assert!(!is_valid_email("bob@localhost"));
        assert!(!is_valid_email("bob@x..com"));
        assert!(!is_valid_email("bob@x.com."));
        assert!(!is_valid_email("bo b@x.com"));
        assert!(!is_valid_email("a@b@c.com"));
    }
}
