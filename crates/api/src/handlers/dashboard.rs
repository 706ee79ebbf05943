//! Read-only dashboard aggregates. Every endpoint requires authentication.

use assetflow_core::asset::{days_until, round2, Depreciation};
use assetflow_core::search::{clamp_limit, DEFAULT_ACTIVITY_LIMIT, MAX_LIMIT};
use assetflow_core::types::Date;
use assetflow_db::models::asset::{Asset, WarrantyExpiringRow};
use assetflow_db::models::dashboard::{
    AssetCounts, CategoryCount, DepartmentCount, LicenseCounts, MonthCount, PriorityCount,
    StatusCount, TicketCounts,
};
use assetflow_db::models::history::AssetHistoryDetail;
use assetflow_db::repositories::{AssetHistoryRepo, AssetRepo, DashboardRepo, UserRepo};
use axum::extract::{Query, State};
use axum::Json;
use serde::Serialize;

use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::query::{DaysParams, LimitParams};
use crate::response::DataResponse;
use crate::state::AppState;

/// Window for the "recent tickets" figure in maintenance stats.
const RECENT_TICKET_DAYS: i64 = 30;

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct DashboardStats {
    pub assets: AssetCounts,
    pub maintenance: TicketCounts,
    pub licenses: LicenseCounts,
    pub active_users: i64,
}

#[derive(Debug, Serialize)]
pub struct WarrantyExpiringAsset {
    #[serde(flatten)]
    pub asset: Asset,
    pub assigned_username: Option<String>,
    pub assigned_department: Option<String>,
    pub days_until_expiry: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct MaintenanceStats {
    pub by_status: Vec<StatusCount>,
    pub by_priority: Vec<PriorityCount>,
    /// `None` until at least one ticket has been resolved.
    pub avg_resolution_hours: Option<f64>,
    pub tickets_last_30_days: i64,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct AssetValueSummary {
    pub asset_count: usize,
    pub total_purchase_value: f64,
    pub total_current_value: f64,
    pub total_depreciation: f64,
    /// Depreciation as a percentage of purchase value, 0 when nothing is priced.
    pub depreciation_rate: f64,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/dashboard/stats
pub async fn get_stats(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<DashboardStats>>> {
    let assets = DashboardRepo::asset_counts(&state.pool).await?;
    let maintenance = DashboardRepo::ticket_counts(&state.pool).await?;
    let licenses = DashboardRepo::license_counts(&state.pool).await?;
    let active_users = UserRepo::count_active(&state.pool).await?;

    Ok(Json(DataResponse {
        data: DashboardStats {
            assets,
            maintenance,
            licenses,
            active_users,
        },
    }))
}

/// GET /api/v1/dashboard/assets-by-category
pub async fn assets_by_category(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<CategoryCount>>>> {
    let data = DashboardRepo::assets_by_category(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/assets-by-department
///
/// Assets with no assignee department are counted under `Unassigned`, listed last.
pub async fn assets_by_department(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<DepartmentCount>>>> {
    let data = DashboardRepo::assets_by_department(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/assets-by-status
pub async fn assets_by_status(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<StatusCount>>>> {
    let data = DashboardRepo::assets_by_status(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/warranty-expiring
pub async fn warranty_expiring(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<DaysParams>,
) -> AppResult<Json<DataResponse<Vec<WarrantyExpiringAsset>>>> {
    let today = chrono::Utc::now().date_naive();
    let (from, to) = params.window(today)?;

    let rows = DashboardRepo::warranty_expiring(&state.pool, from, to).await?;
    Ok(Json(DataResponse {
        data: rows
            .into_iter()
            .map(|row| warranty_entry(row, today))
            .collect(),
    }))
}

/// GET /api/v1/dashboard/recent-activities
pub async fn recent_activities(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<LimitParams>,
) -> AppResult<Json<DataResponse<Vec<AssetHistoryDetail>>>> {
    let limit = clamp_limit(params.limit, DEFAULT_ACTIVITY_LIMIT, MAX_LIMIT);
    let data = AssetHistoryRepo::recent(&state.pool, limit).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/dashboard/maintenance-stats
pub async fn maintenance_stats(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<MaintenanceStats>>> {
    let by_status = DashboardRepo::tickets_by_status(&state.pool).await?;
    let by_priority = DashboardRepo::tickets_by_priority(&state.pool).await?;
    let avg_resolution_hours = DashboardRepo::avg_resolution_hours(&state.pool)
        .await?
        .map(round2);
    let since = chrono::Utc::now() - chrono::Duration::days(RECENT_TICKET_DAYS);
    let tickets_last_30_days = DashboardRepo::tickets_created_since(&state.pool, since).await?;

    Ok(Json(DataResponse {
        data: MaintenanceStats {
            by_status,
            by_priority,
            avg_resolution_hours,
            tickets_last_30_days,
        },
    }))
}

/// GET /api/v1/dashboard/asset-value-summary
///
/// Purchase value, current value, and depreciation summed over every asset
/// with both a price and a purchase date.
pub async fn asset_value_summary(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<AssetValueSummary>>> {
    let today = chrono::Utc::now().date_naive();
    let assets = AssetRepo::list_priced(&state.pool).await?;
    let snapshots: Vec<Depreciation> = assets
        .iter()
        .filter_map(|a| a.depreciation(today))
        .collect();

    Ok(Json(DataResponse {
        data: summarize_values(&snapshots),
    }))
}

/// GET /api/v1/dashboard/assets-timeline
pub async fn assets_timeline(
    State(state): State<AppState>,
    _auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<MonthCount>>>> {
    let data = DashboardRepo::assets_timeline(&state.pool).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn warranty_entry(row: WarrantyExpiringRow, today: Date) -> WarrantyExpiringAsset {
    WarrantyExpiringAsset {
        days_until_expiry: row.asset.warranty_expiration.map(|d| days_until(d, today)),
        asset: row.asset,
        assigned_username: row.assignee_username,
        assigned_department: row.assignee_department,
    }
}

fn summarize_values(snapshots: &[Depreciation]) -> AssetValueSummary {
    let (purchase, current, depreciation) =
        snapshots.iter().fold((0.0, 0.0, 0.0), |(p, c, d), s| {
            (p + s.purchase_price, c + s.current_value, d + s.total_depreciation)
        });

    AssetValueSummary {
        asset_count: snapshots.len(),
        total_purchase_value: round2(purchase),
        total_current_value: round2(current),
        total_depreciation: round2(depreciation),
        depreciation_rate: if purchase > 0.0 {
            round2(depreciation / purchase * 100.0)
        } else {
            0.0
        },
    }
}
