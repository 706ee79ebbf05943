//! Route definitions for the `/auth` resource.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::auth;
use crate::state::AppState;

/// Routes mounted at `/auth`.
///
/// ```text
/// POST /register         -> register (public)
/// POST /login            -> login (public)
/// POST /refresh          -> refresh (public)
/// POST /logout           -> logout
/// GET  /me               -> me
/// PUT  /me               -> update_me
/// POST /change-password  -> change_password
/// POST /validate         -> validate
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me).put(auth::update_me))
        .route("/change-password", post(auth::change_password))
        .route("/validate", post(auth::validate))
}
