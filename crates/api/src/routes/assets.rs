//! Route definitions for the `/assets` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::assets;
use crate::state::AppState;

/// Routes mounted at `/assets`.
///
/// Role checks are enforced by handler extractors.
///
/// ```text
/// GET    /                   -> list_assets
/// POST   /                   -> create_asset
/// GET    /export             -> export_assets
/// GET    /{id}               -> get_asset
/// PUT    /{id}               -> update_asset
/// DELETE /{id}               -> delete_asset
/// POST   /{id}/assign        -> assign_asset
/// POST   /{id}/release       -> release_asset
/// GET    /{id}/history       -> get_asset_history
/// GET    /{id}/depreciation  -> get_asset_depreciation
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(assets::list_assets).post(assets::create_asset))
        .route("/export", get(assets::export_assets))
        .route(
            "/{id}",
            get(assets::get_asset)
                .put(assets::update_asset)
                .delete(assets::delete_asset),
        )
        .route("/{id}/assign", post(assets::assign_asset))
        .route("/{id}/release", post(assets::release_asset))
        .route("/{id}/history", get(assets::get_asset_history))
        .route("/{id}/depreciation", get(assets::get_asset_depreciation))
}
