//! Handlers for the `/maintenance` resource.
//!
//! Employees only see and touch tickets they reported. Opening, resolving, and
//! deleting a ticket move the asset's status inside the repository
//! transaction.

use std::collections::HashMap;

use assetflow_core::asset::AssetStatus;
use assetflow_core::error::CoreError;
use assetflow_core::maintenance::{
    attachment_storage_name, validate_attachment_filename, TicketPriority, TicketStatus,
    MAX_TITLE_LEN,
};
use assetflow_core::types::DbId;
use assetflow_core::validation::require_text;
use assetflow_db::models::asset::Asset;
use assetflow_db::models::maintenance::{
    CreateTicket, MaintenanceTicket, TicketFilter, UpdateTicket,
};
use assetflow_db::models::user::UserSummary;
use assetflow_db::repositories::{AssetRepo, MaintenanceRepo, UserRepo};
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireAdmin, RequireManager, RequireStaff};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /maintenance`.
#[derive(Debug, Default, Deserialize)]
pub struct ListTicketsQuery {
    pub status: Option<String>,
    pub priority: Option<String>,
    pub asset_id: Option<DbId>,
    pub reported_by: Option<DbId>,
    pub assigned_to: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct CreateTicketRequest {
    pub asset_id: Option<DbId>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub priority: Option<String>,
    pub resolution_notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AssignTicketRequest {
    pub user_id: Option<DbId>,
}

/// The asset a ticket concerns, as embedded in ticket responses.
#[derive(Debug, Clone, Serialize)]
pub struct TicketAsset {
    pub id: DbId,
    pub name: String,
    pub category: String,
    pub status: String,
}

impl From<&Asset> for TicketAsset {
    fn from(asset: &Asset) -> Self {
        Self {
            id: asset.id,
            name: asset.name.clone(),
            category: asset.category.clone(),
            status: asset.status.clone(),
        }
    }
}

/// Ticket with its asset, reporter, and assignee resolved.
#[derive(Debug, Serialize)]
pub struct TicketResponse {
    #[serde(flatten)]
    pub ticket: MaintenanceTicket,
    pub asset: Option<TicketAsset>,
    pub reported_by: Option<UserSummary>,
    pub assigned_to: Option<UserSummary>,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/maintenance
///
/// Newest first. For Employees the `reported_by` filter is forced to the caller.
pub async fn list_tickets(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Query(params): Query<ListTicketsQuery>,
) -> AppResult<Json<DataResponse<Vec<TicketResponse>>>> {
    let filter = TicketFilter {
        status: params
            .status
            .as_deref()
            .map(TicketStatus::parse)
            .transpose()?
            .map(|s| s.as_str().to_string()),
        priority: params
            .priority
            .as_deref()
            .map(TicketPriority::parse)
            .transpose()?
            .map(|p| p.as_str().to_string()),
        asset_id: params.asset_id,
        reported_by: if auth_user.is_employee() {
            Some(auth_user.user_id)
        } else {
            params.reported_by
        },
        assigned_to: params.assigned_to,
    };

    let tickets = MaintenanceRepo::list(&state.pool, &filter).await?;
    let data = enrich_tickets(&state, tickets).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/maintenance
///
/// Opens a ticket and puts the asset `Under Maintenance`.
pub async fn create_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    AppJson(input): AppJson<CreateTicketRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<TicketResponse>>)> {
    let (Some(asset_id), Some(_), Some(_)) = (input.asset_id, &input.title, &input.description)
    else {
        return Err(AppError::BadRequest(
            "Missing required fields: asset_id, title, description".into(),
        ));
    };

    let title = require_text("title", input.title.as_deref(), MAX_TITLE_LEN)?;
    let description = input
        .description
        .as_deref()
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .ok_or_else(|| CoreError::Validation("description is required".into()))?
        .to_string();
    let priority = match input.priority.as_deref() {
        Some(p) => TicketPriority::parse(p)?,
        None => TicketPriority::Medium,
    };

    let asset = AssetRepo::find_by_id(&state.pool, asset_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Asset",
            id: asset_id,
        }))?;
    if asset.status == AssetStatus::Retired.as_str() {
        return Err(AppError::BadRequest(
            "Cannot open a maintenance ticket for a retired asset".into(),
        ));
    }

    let create = CreateTicket {
        asset_id,
        reported_by_user_id: auth_user.user_id,
        title,
        description,
        priority: priority.as_str().to_string(),
    };
    let ticket = MaintenanceRepo::create(&state.pool, &create)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Asset",
            id: asset_id,
        }))?;
    tracing::info!(
        ticket_id = ticket.id,
        asset_id,
        user_id = auth_user.user_id,
        "Maintenance ticket created"
    );

    let data = enrich_ticket(&state, ticket).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/maintenance/{id}
pub async fn get_ticket(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    let ticket = find_visible_ticket(&state, &auth_user, id).await?;
    let data = enrich_ticket(&state, ticket).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/maintenance/{id}
pub async fn update_ticket(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateTicketRequest>,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    let title = input
        .title
        .as_deref()
        .map(|t| require_text("title", Some(t), MAX_TITLE_LEN))
        .transpose()?;
    let priority = input
        .priority
        .as_deref()
        .map(TicketPriority::parse)
        .transpose()?
        .map(|p| p.as_str().to_string());

    let patch = UpdateTicket {
        title,
        description: input.description,
        priority,
        resolution_notes: input.resolution_notes,
    };

    let ticket = MaintenanceRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaintenanceTicket",
            id,
        }))?;
    tracing::info!(ticket_id = id, user_id = user.user_id, "Maintenance ticket updated");

    let data = enrich_ticket(&state, ticket).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/maintenance/{id}/status
///
/// Resolving a ticket returns its asset to service.
pub async fn update_ticket_status(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateStatusRequest>,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    let status = input
        .status
        .as_deref()
        .ok_or_else(|| AppError::BadRequest("status is required".into()))?;
    let status = TicketStatus::parse(status)?;

    let ticket = MaintenanceRepo::update_status(&state.pool, id, status, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaintenanceTicket",
            id,
        }))?;
    tracing::info!(
        ticket_id = id,
        status = status.as_str(),
        user_id = user.user_id,
        "Maintenance ticket status changed"
    );

    let data = enrich_ticket(&state, ticket).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/maintenance/{id}/assign
pub async fn assign_ticket(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<AssignTicketRequest>,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    let assignee_id = input
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))?;

    let assignee = UserRepo::find_by_id(&state.pool, assignee_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: assignee_id,
        }))?;
    if !assignee.is_active {
        return Err(AppError::BadRequest(
            "Cannot assign a ticket to an inactive user".into(),
        ));
    }

    let ticket = MaintenanceRepo::assign(&state.pool, id, assignee.id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaintenanceTicket",
            id,
        }))?;
    tracing::info!(
        ticket_id = id,
        to_user_id = assignee.id,
        user_id = user.user_id,
        "Maintenance ticket assigned"
    );

    let data = enrich_ticket(&state, ticket).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/maintenance/{id}
pub async fn delete_ticket(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !MaintenanceRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "MaintenanceTicket",
            id,
        }));
    }
    tracing::info!(ticket_id = id, admin_id = admin.user_id, "Maintenance ticket deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/maintenance/{id}/upload
///
/// Accepts a multipart form with a required `file` field. The file is stored
/// in the upload directory and served back under `/uploads`.
pub async fn upload_attachment(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<Json<DataResponse<TicketResponse>>> {
    find_visible_ticket(&state, &auth_user, id).await?;

    let mut file_data: Option<(String, Vec<u8>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(e.to_string()))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or("").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
        file_data = Some((filename, data.to_vec()));
    }

    let (filename, data) =
        file_data.ok_or_else(|| AppError::BadRequest("No file provided".into()))?;
    let sanitized = validate_attachment_filename(&filename)?;
    let stored_name = attachment_storage_name(id, chrono::Utc::now(), &sanitized);

    let path = state.config.upload_dir.join(&stored_name);
    tokio::fs::write(&path, &data)
        .await
        .map_err(|e| AppError::InternalError(format!("Failed to store attachment: {e}")))?;

    let url = format!("/uploads/{stored_name}");
    let ticket = record_attachment(&state.pool, id, &path, &url).await?;
    tracing::info!(
        ticket_id = id,
        file = %stored_name,
        bytes = data.len(),
        user_id = auth_user.user_id,
        "Maintenance attachment uploaded"
    );

    let data = enrich_ticket(&state, ticket).await?;
    Ok(Json(DataResponse { data }))
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Point the ticket at a stored file. If the row cannot be updated the file
/// is removed again.
async fn record_attachment(
    pool: &PgPool,
    id: DbId,
    path: &std::path::Path,
    url: &str,
) -> AppResult<MaintenanceTicket> {
    let error = match MaintenanceRepo::set_attachment(pool, id, url).await {
        Ok(Some(ticket)) => return Ok(ticket),
        Ok(None) => AppError::Core(CoreError::NotFound {
            entity: "MaintenanceTicket",
            id,
        }),
        Err(e) => AppError::from(e),
    };

    if let Err(e) = tokio::fs::remove_file(path).await {
        tracing::warn!(
            ticket_id = id,
            path = %path.display(),
            error = %e,
            "Failed to remove orphaned attachment"
        );
    }
    Err(error)
}

/// Load a ticket, rejecting Employees who did not report it.
async fn find_visible_ticket(
    state: &AppState,
    auth_user: &AuthUser,
    id: DbId,
) -> AppResult<MaintenanceTicket> {
    let ticket = MaintenanceRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "MaintenanceTicket",
            id,
        }))?;

    if auth_user.is_employee() && ticket.reported_by_user_id != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden("Access denied".into())));
    }
    Ok(ticket)
}

/// Resolve assets and users for a batch of tickets with one query each.
async fn enrich_tickets(
    state: &AppState,
    tickets: Vec<MaintenanceTicket>,
) -> AppResult<Vec<TicketResponse>> {
    let mut asset_ids: Vec<DbId> = tickets.iter().map(|t| t.asset_id).collect();
    asset_ids.sort_unstable();
    asset_ids.dedup();

    let mut user_ids: Vec<DbId> = tickets
        .iter()
        .flat_map(|t| std::iter::once(t.reported_by_user_id).chain(t.assigned_to_user_id))
        .collect();
    user_ids.sort_unstable();
    user_ids.dedup();

    let assets: HashMap<DbId, TicketAsset> = AssetRepo::find_by_ids(&state.pool, &asset_ids)
        .await?
        .iter()
        .map(|a| (a.id, TicketAsset::from(a)))
        .collect();
    let users: HashMap<DbId, UserSummary> = UserRepo::find_by_ids(&state.pool, &user_ids)
        .await?
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    Ok(tickets
        .into_iter()
        .map(|ticket| TicketResponse {
            asset: assets.get(&ticket.asset_id).cloned(),
            reported_by: users.get(&ticket.reported_by_user_id).cloned(),
            assigned_to: ticket
                .assigned_to_user_id
                .and_then(|id| users.get(&id).cloned()),
            ticket,
        })
        .collect())
}

async fn enrich_ticket(state: &AppState, ticket: MaintenanceTicket) -> AppResult<TicketResponse> {
    enrich_tickets(state, vec![ticket])
        .await?
        .pop()
        .ok_or_else(|| AppError::InternalError("Ticket enrichment produced no row".into()))
}
