//! Limit and search-term helpers shared by list endpoints.

/// Upper bound on any page size.
pub const MAX_LIMIT: i64 = 500;

/// Default number of entries on the recent-activity feed.
pub const DEFAULT_ACTIVITY_LIMIT: i64 = 50;

/// Clamp a requested page size into `1..=max`, falling back to `default`.
pub fn clamp_limit(limit: Option<i64>, default: i64, max: i64) -> i64 {
    limit.unwrap_or(default).clamp(1, max)
}

/// Turn free text into an `ILIKE` pattern, escaping `%`, `_` and `\`.
///
/// Returns `None` for blank input so the filter can be skipped.
pub fn like_pattern(term: Option<&str>) -> Option<String> {
    let term = term.map(str::trim).filter(|t| !t.is_empty())?;
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    Some(escaped)
}
