//! Aggregate rows for the dashboard endpoints.

use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// Asset counts by lifecycle bucket, plus total purchase value.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetCounts {
    pub total: i64,
    pub available: i64,
    pub assigned: i64,
    /// `Under Maintenance` and `In Repair` combined.
    pub under_maintenance: i64,
    pub retired: i64,
    pub total_value: Decimal,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TicketCounts {
    pub total: i64,
    /// New, Under Review, and In Progress.
    pub open: i64,
    pub resolved: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LicenseCounts {
    pub total: i64,
    pub active: i64,
    pub expired: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct StatusCount {
    pub status: String,
    pub count: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PriorityCount {
    pub priority: String,
    pub count: i64,
}

/// Assets created per calendar month (`YYYY-MM`).
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MonthCount {
    pub month: String,
    pub count: i64,
}
