//! Shared query parameter types for API handlers.

use assetflow_core::asset::DEFAULT_EXPIRY_WINDOW_DAYS;
use assetflow_core::types::Date;
use serde::Deserialize;

use crate::error::{AppError, AppResult};

/// `?days=` window for expiry and warranty endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct DaysParams {
    pub days: Option<i64>,
}

impl DaysParams {
    /// Inclusive `(today, today + days)` window. Defaults to 30 days.
    pub fn window(&self, today: Date) -> AppResult<(Date, Date)> {
        look_ahead("days", self.days.unwrap_or(DEFAULT_EXPIRY_WINDOW_DAYS), today)
    }
}

/// Inclusive `(today, today + days)` window for the query parameter `field`.
///
/// Negative counts and windows past the calendar's range are rejected.
pub fn look_ahead(field: &str, days: i64, today: Date) -> AppResult<(Date, Date)> {
    if days < 0 {
        return Err(AppError::BadRequest(format!("{field} must not be negative")));
    }
    let end = chrono::Duration::try_days(days)
        .and_then(|span| today.checked_add_signed(span))
        .ok_or_else(|| AppError::BadRequest(format!("{field} is too large")))?;
    Ok((today, end))
}

/// `?limit=` for feeds.
#[derive(Debug, Deserialize)]
pub struct LimitParams {
    pub limit: Option<i64>,
}

/// `?include_depreciation=true` on asset reads.
#[derive(Debug, Default, Deserialize)]
pub struct DepreciationParams {
    #[serde(default)]
    pub include_depreciation: bool,
}
