//! Route definitions for the `/maintenance` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::maintenance;
use crate::state::AppState;

/// Routes mounted at `/maintenance`.
///
/// ```text
/// GET    /              -> list_tickets
/// POST   /              -> create_ticket
/// GET    /{id}          -> get_ticket
/// PUT    /{id}          -> update_ticket
/// DELETE /{id}          -> delete_ticket
/// PUT    /{id}/status   -> update_ticket_status
/// PUT    /{id}/assign   -> assign_ticket
/// POST   /{id}/upload   -> upload_attachment
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(maintenance::list_tickets).post(maintenance::create_ticket),
        )
        .route(
            "/{id}",
            get(maintenance::get_ticket)
                .put(maintenance::update_ticket)
                .delete(maintenance::delete_ticket),
        )
        .route("/{id}/status", put(maintenance::update_ticket_status))
        .route("/{id}/assign", put(maintenance::assign_ticket))
        .route("/{id}/upload", post(maintenance::upload_attachment))
}
