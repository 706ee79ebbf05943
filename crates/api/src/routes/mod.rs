pub mod assets;
pub mod auth;
pub mod dashboard;
pub mod health;
pub mod licenses;
pub mod maintenance;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/register                        register (public)
/// /auth/login                           login (public)
/// /auth/refresh                         refresh (public)
/// /auth/logout                          logout
/// /auth/me                              get, update
/// /auth/change-password                 change password
/// /auth/validate                        token identity
///
/// /users                                list
/// /users/{id}                           get, update, delete
/// /users/{id}/assets                    assets assigned to the user
///
/// /assets                               list, create
/// /assets/export                        CSV export
/// /assets/{id}                          get, update, delete
/// /assets/{id}/assign                   assign (POST)
/// /assets/{id}/release                  release (POST)
/// /assets/{id}/history                  audit trail
/// /assets/{id}/depreciation             depreciation snapshot
///
/// /maintenance                          list, create
/// /maintenance/{id}                     get, update, delete
/// /maintenance/{id}/status              change status (PUT)
/// /maintenance/{id}/assign              assign technician (PUT)
/// /maintenance/{id}/upload              attachment upload (POST, multipart)
///
/// /licenses                             list, create
/// /licenses/expiring                    expiring soon
/// /licenses/{id}                        get, update, delete
///
/// /dashboard/*                          read-only aggregates
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/users", users::router())
        .nest("/assets", assets::router())
        .nest("/maintenance", maintenance::router())
        .nest("/licenses", licenses::router())
        .nest("/dashboard", dashboard::router())
}
