//! Asset status rules, depreciation, and warranty windows.

use serde::Serialize;

use crate::error::CoreError;
use crate::types::Date;
use crate::validation::require_text;

/// Maximum length of an asset name.
pub const MAX_NAME_LEN: usize = 100;

/// Maximum length of a category label.
pub const MAX_CATEGORY_LEN: usize = 50;

// ---------------------------------------------------------------------------
// Status and condition
// ---------------------------------------------------------------------------

pub const STATUS_AVAILABLE: &str = "Available";
pub const STATUS_ASSIGNED: &str = "Assigned";
pub const STATUS_UNDER_MAINTENANCE: &str = "Under Maintenance";
pub const STATUS_IN_REPAIR: &str = "In Repair";
pub const STATUS_RETIRED: &str = "Retired";

/// All valid asset statuses.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_AVAILABLE,
    STATUS_ASSIGNED,
    STATUS_UNDER_MAINTENANCE,
    STATUS_IN_REPAIR,
    STATUS_RETIRED,
];

/// Asset lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetStatus {
    Available,
    Assigned,
    UnderMaintenance,
    InRepair,
    Retired,
}

impl AssetStatus {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => STATUS_AVAILABLE,
            Self::Assigned => STATUS_ASSIGNED,
            Self::UnderMaintenance => STATUS_UNDER_MAINTENANCE,
            Self::InRepair => STATUS_IN_REPAIR,
            Self::Retired => STATUS_RETIRED,
        }
    }

    /// Parse from a string, returning an error for unknown statuses.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            STATUS_AVAILABLE => Ok(Self::Available),
            STATUS_ASSIGNED => Ok(Self::Assigned),
            STATUS_UNDER_MAINTENANCE => Ok(Self::UnderMaintenance),
            STATUS_IN_REPAIR => Ok(Self::InRepair),
            STATUS_RETIRED => Ok(Self::Retired),
            other => Err(CoreError::Validation(format!(
                "Invalid asset status '{other}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

pub const CONDITION_EXCELLENT: &str = "Excellent";
pub const CONDITION_GOOD: &str = "Good";
pub const CONDITION_FAIR: &str = "Fair";
pub const CONDITION_POOR: &str = "Poor";

/// All valid asset conditions.
pub const VALID_CONDITIONS: &[&str] = &[
    CONDITION_EXCELLENT,
    CONDITION_GOOD,
    CONDITION_FAIR,
    CONDITION_POOR,
];

/// Physical condition of an asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetCondition {
    Excellent,
    Good,
    Fair,
    Poor,
}

impl AssetCondition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Excellent => CONDITION_EXCELLENT,
            Self::Good => CONDITION_GOOD,
            Self::Fair => CONDITION_FAIR,
            Self::Poor => CONDITION_POOR,
        }
    }

    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            CONDITION_EXCELLENT => Ok(Self::Excellent),
            CONDITION_GOOD => Ok(Self::Good),
            CONDITION_FAIR => Ok(Self::Fair),
            CONDITION_POOR => Ok(Self::Poor),
            other => Err(CoreError::Validation(format!(
                "Invalid asset condition '{other}'. Must be one of: {}",
                VALID_CONDITIONS.join(", ")
            ))),
        }
    }
}

/// Validate and trim an asset name.
pub fn validate_asset_name(name: Option<&str>) -> Result<String, CoreError> {
    require_text("name", name, MAX_NAME_LEN)
}

/// Validate and trim an asset category.
pub fn validate_asset_category(category: Option<&str>) -> Result<String, CoreError> {
    require_text("category", category, MAX_CATEGORY_LEN)
}

/// Check a status requested through create/update rather than through the
/// assign/release/maintenance workflows.
///
/// `Assigned` is only reachable through assignment, and an asset that still
/// has an assignee cannot be made `Available` or `Retired` without a release.
pub fn validate_manual_status(requested: AssetStatus, has_assignee: bool) -> Result<(), CoreError> {
    match requested {
        AssetStatus::Assigned => Err(CoreError::Validation(
            "Status 'Assigned' can only be set by assigning the asset to a user".into(),
        )),
        AssetStatus::Available | AssetStatus::Retired if has_assignee => {
            Err(CoreError::Validation(format!(
                "Asset is assigned. Release it before marking it '{}'",
                requested.as_str()
            )))
        }
        _ => Ok(()),
    }
}

/// Status an asset returns to once its maintenance ends.
pub fn status_after_maintenance(has_assignee: bool) -> AssetStatus {
    if has_assignee {
        AssetStatus::Assigned
    } else {
        AssetStatus::Available
    }
}

// ---------------------------------------------------------------------------
// Depreciation
// ---------------------------------------------------------------------------

/// Straight-line useful life in years.
pub const USEFUL_LIFE_YEARS: u32 = 5;

/// Residual value as a fraction of the purchase price.
pub const SALVAGE_FRACTION: f64 = 0.1;

/// Average days per year, accounting for leap years.
const DAYS_PER_YEAR: f64 = 365.25;

/// Depreciation snapshot for a single asset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Depreciation {
    pub purchase_price: f64,
    pub current_value: f64,
    pub total_depreciation: f64,
    /// Percentage of the purchase price already depreciated.
    pub depreciation_rate: f64,
    pub years_elapsed: f64,
    pub useful_life_years: u32,
}

/// Compute straight-line depreciation as of `today`.
///
/// Returns `None` when either the price or the purchase date is missing, or
/// when the price is not positive. Elapsed time is clamped to
/// `0..=USEFUL_LIFE_YEARS`, so a future purchase date depreciates nothing.
pub fn calculate_depreciation(
    purchase_price: Option<f64>,
    purchase_date: Option<Date>,
    today: Date,
) -> Option<Depreciation> {
    let price = purchase_price.filter(|p| *p > 0.0)?;
    let purchased = purchase_date?;

    let life = f64::from(USEFUL_LIFE_YEARS);
    let salvage = price * SALVAGE_FRACTION;
    let annual = (price - salvage) / life;

    let days = (today - purchased).num_days() as f64;
    let years_elapsed = (days / DAYS_PER_YEAR).clamp(0.0, life);

    let total = annual * years_elapsed;
    let current = (price - total).max(salvage);

    Some(Depreciation {
        purchase_price: price,
        current_value: round2(current),
        total_depreciation: round2(total),
        depreciation_rate: round2(total / price * 100.0),
        years_elapsed: round2(years_elapsed),
        useful_life_years: USEFUL_LIFE_YEARS,
    })
}

/// Round to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

// ---------------------------------------------------------------------------
// Expiry windows
// ---------------------------------------------------------------------------

/// Default look-ahead for warranty and license expiry queries.
pub const DEFAULT_EXPIRY_WINDOW_DAYS: i64 = 30;

/// Whole days from `today` until `date` (negative once past).
pub fn days_until(date: Date, today: Date) -> i64 {
    (date - today).num_days()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> Date {
        Date::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn status_parse_round_trips() {
        for name in VALID_STATUSES {
            assert_eq!(AssetStatus::parse(name).unwrap().as_str(), *name);
        }
        assert!(AssetStatus::parse("Lost").is_err());
    }

    #[test]
    fn condition_parse() {
        assert_eq!(AssetCondition::parse("Fair").unwrap(), AssetCondition::Fair);
        assert!(AssetCondition::parse("Broken").is_err());
    }

    #[test]
    fn name_and_category_are_required() {
        assert_eq!(validate_asset_name(Some(" Dell XPS ")).unwrap(), "Dell XPS");
        assert!(validate_asset_name(None).is_err());
        assert!(validate_asset_category(Some(&"c".repeat(51))).is_err());
    }

    #[test]
    fn assigned_cannot_be_set_manually() {
        assert!(validate_manual_status(AssetStatus::Assigned, false).is_err());
        assert!(validate_manual_status(AssetStatus::Assigned, true).is_err());
    }

    #[test]
    fn assigned_asset_must_be_released_before_available_or_retired() {
        assert!(validate_manual_status(AssetStatus::Available, true).is_err());
        assert!(validate_manual_status(AssetStatus::Retired, true).is_err());
        assert!(validate_manual_status(AssetStatus::InRepair, true).is_ok());
        assert!(validate_manual_status(AssetStatus::Retired, false).is_ok());
    }

    #[test]
    fn maintenance_end_restores_assignment() {
        assert_eq!(status_after_maintenance(true), AssetStatus::Assigned);
        assert_eq!(status_after_maintenance(false), AssetStatus::Available);
    }

    #[test]
    fn depreciation_requires_price_and_date() {
        let today = date(2025, 1, 1);
        assert!(calculate_depreciation(None, Some(today), today).is_none());
        assert!(calculate_depreciation(Some(1000.0), None, today).is_none());
        assert!(calculate_depreciation(Some(0.0), Some(today), today).is_none());
    }

    #[test]
    fn depreciation_on_purchase_day_is_zero() {
        let today = date(2025, 1, 1);
        let d = calculate_depreciation(Some(1000.0), Some(today), today).unwrap();
        assert_eq!(d.current_value, 1000.0);
        assert_eq!(d.total_depreciation, 0.0);
        assert_eq!(d.depreciation_rate, 0.0);
        assert_eq!(d.useful_life_years, 5);
    }

    #[test]
    fn depreciation_after_two_and_a_half_years() {
        // 913 days / 365.25 = 2.49966 years; annual = (1000 - 100) / 5 = 180.
        let d = calculate_depreciation(Some(1000.0), Some(date(2020, 1, 1)), date(2022, 7, 2))
            .unwrap();
        assert_eq!(d.years_elapsed, 2.5);
        assert_eq!(d.total_depreciation, 449.94);
        assert_eq!(d.current_value, 550.06);
        assert_eq!(d.depreciation_rate, 44.99);
    }

    #[test]
    fn depreciation_floors_at_salvage_value() {
        let d = calculate_depreciation(Some(2000.0), Some(date(2010, 1, 1)), date(2025, 1, 1))
            .unwrap();
        assert_eq!(d.years_elapsed, 5.0);
        assert_eq!(d.current_value, 200.0);
        assert_eq!(d.total_depreciation, 1800.0);
        assert_eq!(d.depreciation_rate, 90.0);
    }

    #[test]
    fn future_purchase_date_depreciates_nothing() {
        let d = calculate_depreciation(Some(500.0), Some(date(2026, 1, 1)), date(2025, 1, 1))
            .unwrap();
        assert_eq!(d.years_elapsed, 0.0);
        assert_eq!(d.current_value, 500.0);
    }

    #[test]
    fn days_until_counts_whole_days() {
        assert_eq!(days_until(date(2025, 6, 11), date(2025, 6, 1)), 10);
        assert_eq!(days_until(date(2025, 5, 30), date(2025, 6, 1)), -2);
    }
}
