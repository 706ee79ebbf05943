//! Maintenance ticket model, DTOs, and list filter.

use assetflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `maintenance_tickets` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct MaintenanceTicket {
    pub id: DbId,
    pub asset_id: DbId,
    pub reported_by_user_id: DbId,
    pub assigned_to_user_id: Option<DbId>,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub resolution_notes: Option<String>,
    pub attachment_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    pub resolved_at: Option<Timestamp>,
}

/// DTO for opening a ticket.
#[derive(Debug, Clone)]
pub struct CreateTicket {
    pub asset_id: DbId,
    pub reported_by_user_id: DbId,
    pub title: String,
    pub description: String,
    pub priority: String,
}

/// Patch of the editable ticket fields.
#[derive(Debug, Clone, Default)]
pub struct UpdateTicket {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub resolution_notes: Option<String>,
}

/// Filters for ticket listing. `None` disables a filter.
#[derive(Debug, Clone, Default)]
pub struct TicketFilter {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub asset_id: Option<DbId>,
    pub reported_by: Option<DbId>,
    pub assigned_to: Option<DbId>,
}
