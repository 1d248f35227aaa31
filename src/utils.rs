//! Utility functions for string shortening, secret masking, and whitespace cleanup.
//!
//! This module provides helper functions used throughout the application:
//! - Truncation for log previews and database column limits
//! - Masking of API keys before they reach the logs
//! - Whitespace collapsing for scraped page text

use itertools::Itertools;

/// Truncate a string for logging purposes.
///
/// Long strings are cut to at most `max` bytes (on a character boundary)
/// with an ellipsis and byte count indicator appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        let mut end = max;
        while !s.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}…(+{} bytes)", &s[..end], s.len() - end)
    }
}

/// Keep at most `max` characters of `s`.
///
/// Used to fit article URLs into the indexed `url` column.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Show only the first five characters of a secret.
pub fn mask_secret(secret: &str) -> String {
    format!("{}...", truncate_chars(secret, 5))
}

/// Collapse every run of whitespace into a single space and trim the ends.
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().join(" ")
}
