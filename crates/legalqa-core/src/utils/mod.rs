//! Utility functions for string formatting and validation.

pub mod format;

pub use format::{is_valid_email, truncate_bytes, truncate_chars};
