//! Shared field validators used by request handlers.

use validator::ValidateEmail;

use crate::error::CoreError;
use crate::types::Date;

/// Wire format for calendar dates.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date, naming the offending field on failure.
pub fn parse_date(field: &str, value: &str) -> Result<Date, CoreError> {
    Date::parse_from_str(value.trim(), DATE_FORMAT).map_err(|_| {
        CoreError::Validation(format!("Invalid {field} format. Use YYYY-MM-DD"))
    })
}

/// Parse an optional date field. `None` stays `None`.
pub fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<Date>, CoreError> {
    value.map(|v| parse_date(field, v)).transpose()
}

/// Require a non-blank string field no longer than `max_len` characters.
///
/// Returns the trimmed value.
pub fn require_text(field: &str, value: Option<&str>, max_len: usize) -> Result<String, CoreError> {
    let value = value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| CoreError::Validation(format!("{field} is required")))?;
    check_length(field, value, max_len)?;
    Ok(value.to_string())
}

/// Reject values longer than `max_len` characters.
pub fn check_length(field: &str, value: &str, max_len: usize) -> Result<(), CoreError> {
    if value.chars().count() > max_len {
        return Err(CoreError::Validation(format!(
            "{field} must be at most {max_len} characters"
        )));
    }
    Ok(())
}

/// Validate an email address.
pub fn validate_email(email: &str) -> Result<(), CoreError> {
    if !email.validate_email() {
        return Err(CoreError::Validation(format!(
            "'{email}' is not a valid email address"
        )));
    }
    check_length("email", email, 120)
}
