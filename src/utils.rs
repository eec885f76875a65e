//! Small shared helpers: URL extraction and character-safe truncation

use regex::Regex;

/// Pull every http(s) URL out of free text, in document order.
///
/// The pattern is deliberately permissive; callers treat the first match as
/// "the" target URL. No matches yields an empty vec, never an error.
pub fn extract_urls(text: &str) -> Vec<String> {
    let re = Regex::new(r"https?://[^\s<>]+").expect("static regex");
    re.find_iter(text).map(|m| m.as_str().to_string()).collect()
}

/// Truncate to at most `max` characters, respecting char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}
