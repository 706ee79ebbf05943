//! Route definitions for the `/licenses` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::licenses;
use crate::state::AppState;

/// Routes mounted at `/licenses`.
///
/// ```text
/// GET    /          -> list_licenses
/// POST   /          -> create_license
/// GET    /expiring  -> list_expiring_licenses
/// GET    /{id}      -> get_license
/// PUT    /{id}      -> update_license
/// DELETE /{id}      -> delete_license
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(licenses::list_licenses).post(licenses::create_license),
        )
        .route("/expiring", get(licenses::list_expiring_licenses))
        .route(
            "/{id}",
            get(licenses::get_license)
                .put(licenses::update_license)
                .delete(licenses::delete_license),
        )
}
