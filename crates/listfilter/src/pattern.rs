//! Translation of SQL-style wildcard patterns into regular expressions.
//!
//! `%` matches any run of characters (including none) and `_` matches exactly
//! one character. Everything else matches itself.

/// Regex matching any string, used for the lone `%` pattern.
pub const MATCH_ANYTHING: &str = ".*";

/// Converts a wildcard pattern into an anchored regular expression.
///
/// Regex metacharacters in the pattern are escaped first; the wildcards are
/// substituted afterwards so that escaped literal text can never be read as
/// a wildcard.
///
/// # Example
///
/// ```
/// use listfilter_rs::pattern::wildcard_to_regex;
///
/// assert_eq!(wildcard_to_regex("test%"), "^test.*$");
/// assert_eq!(wildcard_to_regex("a.c_"), r"^a\.c.$");
/// assert_eq!(wildcard_to_regex("%"), ".*");
/// ```
pub fn wildcard_to_regex(pattern: &str) -> String {
    if pattern == "%" {
        return MATCH_ANYTHING.to_string();
    }

    // `regex::escape` leaves `%` and `_` untouched.
    let escaped = regex::escape(pattern);
    let mut out = String::with_capacity(escaped.len() + 8);
    out.push('^');
    for c in escaped.chars() {
        match c {
            '%' => out.push_str(".*"),
            '_' => out.push('.'),
            _ => out.push(c),
        }
    }
    out.push('$');
    out
}

/// Converts a literal string into an anchored regex matching exactly that string.
pub fn exact_regex(literal: &str) -> String {
    format!("^{}$", regex::escape(literal))
}
