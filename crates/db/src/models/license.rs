//! Software license model, DTOs, and list filter.

use assetflow_core::types::{Date, DbId, Timestamp};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `licenses` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct License {
    pub id: DbId,
    pub asset_id: Option<DbId>,
    pub software_name: String,
    pub license_key: Option<String>,
    pub vendor: Option<String>,
    pub purchase_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub cost: Option<Decimal>,
    pub seats: i32,
    pub status: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// License joined with the name and serial number of the asset it is installed on.
#[derive(Debug, Clone, FromRow)]
pub struct LicenseWithAsset {
    #[sqlx(flatten)]
    pub license: License,
    pub asset_name: Option<String>,
    pub asset_serial_number: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateLicense {
    pub asset_id: Option<DbId>,
    pub software_name: String,
    pub license_key: Option<String>,
    pub vendor: Option<String>,
    pub purchase_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub cost: Option<Decimal>,
    pub seats: i32,
    pub status: String,
}

/// Partial license update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UpdateLicense {
    pub asset_id: Option<DbId>,
    pub software_name: Option<String>,
    pub license_key: Option<String>,
    pub vendor: Option<String>,
    pub purchase_date: Option<Date>,
    pub expiration_date: Option<Date>,
    pub cost: Option<Decimal>,
    pub seats: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct LicenseFilter {
    pub status: Option<String>,
    pub asset_id: Option<DbId>,
    /// `ILIKE` pattern on `software_name`.
    pub software_name: Option<String>,
}
