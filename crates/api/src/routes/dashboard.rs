//! Route definitions for the `/dashboard` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::dashboard;
use crate::state::AppState;

/// Routes mounted at `/dashboard`. All read-only.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/stats", get(dashboard::get_stats))
        .route("/assets-by-category", get(dashboard::assets_by_category))
        .route("/assets-by-department", get(dashboard::assets_by_department))
        .route("/assets-by-status", get(dashboard::assets_by_status))
        .route("/warranty-expiring", get(dashboard::warranty_expiring))
        .route("/recent-activities", get(dashboard::recent_activities))
        .route("/maintenance-stats", get(dashboard::maintenance_stats))
        .route("/asset-value-summary", get(dashboard::asset_value_summary))
        .route("/assets-timeline", get(dashboard::assets_timeline))
}
