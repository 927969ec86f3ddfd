//! Gallery search and filter helpers.
//!
//! The gallery matches a free-text term against title, artist and genre
//! (case-insensitive substring) and optionally narrows to one genre. The SQL
//! lives in the record repository; this module prepares its parameters.

/// Default number of records per gallery page.
pub const DEFAULT_LIST_LIMIT: i64 = 50;

/// Maximum number of records per gallery page.
pub const MAX_LIST_LIMIT: i64 = 100;

/// Trim a user-supplied search term or filter; blank input means "no filter".
pub fn normalize_term(term: Option<&str>) -> Option<String> {
    term.map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
}

/// Build an `ILIKE` substring pattern, escaping the LIKE metacharacters so
/// user input is matched literally. The query must use `ESCAPE '\'`.
///
/// # Examples
///
/// ```
/// use vinyl_core::search::like_pattern;
/// assert_eq!(like_pattern("floyd"), "%floyd%");
/// assert_eq!(like_pattern("100%"), "%100\\%%");
/// ```
pub fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Clamp a user-provided limit to valid bounds.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Clamp a user-provided offset to non-negative.
pub fn clamp_offset(offset: Option<i64>) -> i64 {
    offset.unwrap_or(0).max(0)
}
