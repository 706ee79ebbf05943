//! Asset entity model, DTOs, and list filter.

use assetflow_core::asset::{calculate_depreciation, Depreciation};
use assetflow_core::types::{Date, DbId, Timestamp};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `assets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Asset {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub serial_number: Option<String>,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<Decimal>,
    pub warranty_expiration: Option<Date>,
    pub status: String,
    pub condition: String,
    pub assigned_to_user_id: Option<DbId>,
    pub location: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Asset {
    /// Straight-line depreciation as of `today`, if price and purchase date are known.
    pub fn depreciation(&self, today: Date) -> Option<Depreciation> {
        calculate_depreciation(
            self.purchase_price.and_then(|p| p.to_f64()),
            self.purchase_date,
            today,
        )
    }

    pub fn is_assigned(&self) -> bool {
        self.assigned_to_user_id.is_some()
    }
}

/// Asset row joined with the assignee's username, for CSV export.
#[derive(Debug, Clone, FromRow)]
pub struct AssetExportRow {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub serial_number: Option<String>,
    pub status: String,
    pub condition: String,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<Decimal>,
    pub warranty_expiration: Option<Date>,
    pub assigned_username: Option<String>,
    pub location: Option<String>,
    pub created_at: Timestamp,
}

impl AssetExportRow {
    /// Render the row in `ASSET_EXPORT_HEADERS` order. Missing values are empty.
    pub fn to_csv_fields(&self) -> Vec<String> {
        fn opt<T: ToString>(v: &Option<T>) -> String {
            v.as_ref().map(ToString::to_string).unwrap_or_default()
        }
        vec![
            self.id.to_string(),
            self.name.clone(),
            self.category.clone(),
            opt(&self.serial_number),
            self.status.clone(),
            self.condition.clone(),
            opt(&self.purchase_date),
            opt(&self.purchase_price),
            opt(&self.warranty_expiration),
            opt(&self.assigned_username),
            opt(&self.location),
            self.created_at.to_rfc3339(),
        ]
    }
}

/// Asset whose warranty ends soon, with the assignee for follow-up.
#[derive(Debug, Clone, FromRow)]
pub struct WarrantyExpiringRow {
    #[sqlx(flatten)]
    pub asset: Asset,
    pub assignee_username: Option<String>,
    pub assignee_department: Option<String>,
}

/// DTO for inserting an asset. Values are validated by the caller.
#[derive(Debug, Clone)]
pub struct CreateAsset {
    pub name: String,
    pub description: Option<String>,
    pub category: String,
    pub serial_number: Option<String>,
    pub purchase_date: Option<Date>,
    pub purchase_price: Option<Decimal>,
    pub warranty_expiration: Option<Date>,
    pub status: String,
    pub condition: String,
    pub location: Option<String>,
}

/// Partial asset update. `None` leaves the column unchanged.
///
/// Nullable columns use `Option<Option<T>>`; `Some(None)` clears the value.
#[derive(Debug, Clone, Default)]
pub struct UpdateAsset {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<String>,
    pub serial_number: Option<Option<String>>,
    pub purchase_date: Option<Option<Date>>,
    pub purchase_price: Option<Option<Decimal>>,
    pub warranty_expiration: Option<Option<Date>>,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub location: Option<Option<String>>,
}

/// Filters for [`AssetRepo::list`](crate::repositories::AssetRepo::list).
///
/// Every field is optional; `None` disables that filter.
#[derive(Debug, Clone, Default)]
pub struct AssetFilter {
    pub category: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<DbId>,
    /// Department of the assigned user.
    pub department: Option<String>,
    pub purchase_date_from: Option<Date>,
    pub purchase_date_to: Option<Date>,
    /// Inclusive warranty window `(from, to)`.
    pub warranty_between: Option<(Date, Date)>,
    /// `ILIKE` pattern matched against name, serial number, and description.
    pub search: Option<String>,
}
