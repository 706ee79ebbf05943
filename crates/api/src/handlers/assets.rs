//! Handlers for the `/assets` resource: CRUD, assign/release, history,
//! depreciation, and CSV export.

use std::collections::HashMap;

use assetflow_core::asset::{
    validate_asset_category, validate_asset_name, validate_manual_status, AssetCondition,
    AssetStatus, Depreciation,
};
use assetflow_core::error::CoreError;
use assetflow_core::export::{build_csv, ASSET_EXPORT_FILENAME, ASSET_EXPORT_HEADERS};
use assetflow_core::search::like_pattern;
use assetflow_core::types::{Date, DbId};
use assetflow_core::validation::parse_optional_date;
use assetflow_db::models::asset::{Asset, AssetFilter, CreateAsset, UpdateAsset};
use assetflow_db::models::history::AssetHistoryDetail;
use assetflow_db::models::user::UserSummary;
use assetflow_db::repositories::{AssetHistoryRepo, AssetRepo, UserRepo};
use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::{nullable, AppJson};
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::{RequireManager, RequireStaff};
use crate::query::{look_ahead, DepreciationParams};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Query parameters for `GET /assets`.
#[derive(Debug, Default, Deserialize)]
pub struct ListAssetsQuery {
    pub category: Option<String>,
    pub status: Option<String>,
    pub assigned_to: Option<DbId>,
    /// Department of the assigned user.
    pub department: Option<String>,
    pub purchase_date_from: Option<String>,
    pub purchase_date_to: Option<String>,
    /// Only assets whose warranty ends within this many days from today.
    pub warranty_expiring_days: Option<i64>,
    /// Case-insensitive match on name, serial number, or description.
    pub search: Option<String>,
    #[serde(default)]
    pub include_depreciation: bool,
}

/// Request body for `POST /assets`.
#[derive(Debug, Deserialize)]
pub struct CreateAssetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    pub description: Option<String>,
    pub serial_number: Option<String>,
    pub purchase_date: Option<String>,
    pub purchase_price: Option<Decimal>,
    pub warranty_expiration: Option<String>,
    pub status: Option<String>,
    pub condition: Option<String>,
    pub location: Option<String>,
}

/// Request body for `PUT /assets/{id}`. Absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct UpdateAssetRequest {
    pub name: Option<String>,
    pub category: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub serial_number: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub purchase_date: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub purchase_price: Option<Option<Decimal>>,
    #[serde(default, deserialize_with = "nullable")]
    pub warranty_expiration: Option<Option<String>>,
    pub status: Option<String>,
    pub condition: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub location: Option<Option<String>>,
}

/// Request body for `POST /assets/{id}/assign`.
#[derive(Debug, Deserialize)]
pub struct AssignRequest {
    pub user_id: Option<DbId>,
}

/// Asset with its assignee and, on request, its depreciation.
#[derive(Debug, Serialize)]
pub struct AssetResponse {
    #[serde(flatten)]
    pub asset: Asset,
    pub assigned_user: Option<UserSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub depreciation: Option<Depreciation>,
}

/// Response body for `GET /assets/{id}/depreciation`.
#[derive(Debug, Serialize)]
pub struct AssetDepreciation {
    pub asset_id: DbId,
    pub asset_name: String,
    #[serde(flatten)]
    pub depreciation: Depreciation,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// GET /api/v1/assets
pub async fn list_assets(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<ListAssetsQuery>,
) -> AppResult<Json<DataResponse<Vec<AssetResponse>>>> {
    let filter = build_filter(&params, today())?;
    let assets = AssetRepo::list(&state.pool, &filter).await?;
    let data = enrich_assets(&state, assets, params.include_depreciation).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/assets
///
/// `name` and `category` are required. Logs a `created` history entry.
pub async fn create_asset(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    AppJson(input): AppJson<CreateAssetRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AssetResponse>>)> {
    let name = validate_asset_name(input.name.as_deref())?;
    let category = validate_asset_category(input.category.as_deref())?;

    let status = match input.status.as_deref() {
        Some(s) => {
            let status = AssetStatus::parse(s)?;
            validate_manual_status(status, false)?;
            status
        }
        None => AssetStatus::Available,
    };
    let condition = match input.condition.as_deref() {
        Some(c) => AssetCondition::parse(c)?,
        None => AssetCondition::Good,
    };
    validate_price(input.purchase_price)?;

    let create = CreateAsset {
        name,
        category,
        description: input.description,
        serial_number: blank_to_none(input.serial_number),
        purchase_date: parse_optional_date("purchase_date", input.purchase_date.as_deref())?,
        purchase_price: input.purchase_price,
        warranty_expiration: parse_optional_date(
            "warranty_expiration",
            input.warranty_expiration.as_deref(),
        )?,
        status: status.as_str().to_string(),
        condition: condition.as_str().to_string(),
        location: input.location,
    };

    let asset = AssetRepo::create(&state.pool, &create, user.user_id).await?;
    tracing::info!(asset_id = asset.id, user_id = user.user_id, "Asset created");

    let data = enrich_asset(&state, asset, false).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/assets/{id}
pub async fn get_asset(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DbId>,
    Query(params): Query<DepreciationParams>,
) -> AppResult<Json<DataResponse<AssetResponse>>> {
    let asset = find_asset(&state, id).await?;
    let data = enrich_asset(&state, asset, params.include_depreciation).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/assets/{id}
///
/// Partial update. Logs an `updated` entry listing each changed field.
pub async fn update_asset(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateAssetRequest>,
) -> AppResult<Json<DataResponse<AssetResponse>>> {
    let current = find_asset(&state, id).await?;

    let name = input
        .name
        .as_deref()
        .map(|n| validate_asset_name(Some(n)))
        .transpose()?;
    let category = input
        .category
        .as_deref()
        .map(|c| validate_asset_category(Some(c)))
        .transpose()?;
    let status = match input.status.as_deref() {
        Some(s) => {
            let status = AssetStatus::parse(s)?;
            if status.as_str() != current.status {
                validate_manual_status(status, current.is_assigned())?;
            }
            Some(status.as_str().to_string())
        }
        None => None,
    };
    let condition = input
        .condition
        .as_deref()
        .map(AssetCondition::parse)
        .transpose()?
        .map(|c| c.as_str().to_string());
    validate_price(input.purchase_price.flatten())?;

    let patch = UpdateAsset {
        name,
        category,
        description: input.description,
        serial_number: input.serial_number.map(blank_to_none),
        purchase_date: patch_date("purchase_date", input.purchase_date)?,
        purchase_price: input.purchase_price,
        warranty_expiration: patch_date("warranty_expiration", input.warranty_expiration)?,
        status,
        condition,
        location: input.location,
    };

    let asset = AssetRepo::update(&state.pool, id, &patch, user.user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))?;
    tracing::info!(asset_id = id, user_id = user.user_id, "Asset updated");

    let data = enrich_asset(&state, asset, false).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/assets/{id}
///
/// Assigned assets must be released first.
pub async fn delete_asset(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let asset = find_asset(&state, id).await?;
    if asset.is_assigned() {
        return Err(AppError::BadRequest(
            "Cannot delete an assigned asset. Please release it first.".into(),
        ));
    }

    AssetRepo::delete(&state.pool, id).await?;
    tracing::info!(asset_id = id, user_id = user.user_id, "Asset deleted");
    Ok(StatusCode::NO_CONTENT)
}

/// POST /api/v1/assets/{id}/assign
///
/// Assign an `Available` asset to an active user. Logs `assigned`.
pub async fn assign_asset(
    State(state): State<AppState>,
    RequireStaff(user): RequireStaff,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<AssignRequest>,
) -> AppResult<Json<DataResponse<AssetResponse>>> {
    let user_id = input
        .user_id
        .ok_or_else(|| AppError::BadRequest("user_id is required".into()))?;

    let asset = find_asset(&state, id).await?;
    if asset.is_assigned() {
        return Err(AppError::BadRequest("Asset is already assigned".into()));
    }
    if asset.status != AssetStatus::Available.as_str() {
        return Err(AppError::BadRequest(format!(
            "Asset is not available for assignment (status: {})",
            asset.status
        )));
    }

    let assignee = UserRepo::find_by_id(&state.pool, user_id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "User",
            id: user_id,
        }))?;
    if !assignee.is_active {
        return Err(AppError::BadRequest(
            "Cannot assign an asset to an inactive user".into(),
        ));
    }

    let asset = AssetRepo::assign(&state.pool, id, assignee.id, &assignee.username, user.user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::Conflict("Asset is no longer available".into()))
        })?;
    tracing::info!(asset_id = id, to_user_id = assignee.id, user_id = user.user_id, "Asset assigned");

    let data = enrich_asset(&state, asset, false).await?;
    Ok(Json(DataResponse { data }))
}

/// POST /api/v1/assets/{id}/release
///
/// Employees may only release assets assigned to themselves. Logs `released`.
pub async fn release_asset(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AssetResponse>>> {
    let asset = find_asset(&state, id).await?;
    let Some(assignee) = asset.assigned_to_user_id else {
        return Err(AppError::BadRequest("Asset is not assigned".into()));
    };

    if auth_user.is_employee() && assignee != auth_user.user_id {
        return Err(AppError::Core(CoreError::Forbidden(
            "You can only release your own assets".into(),
        )));
    }

    let asset = AssetRepo::release(&state.pool, id, auth_user.user_id)
        .await?
        .ok_or_else(|| AppError::BadRequest("Asset is not assigned".into()))?;
    tracing::info!(asset_id = id, from_user_id = assignee, user_id = auth_user.user_id, "Asset released");

    let data = enrich_asset(&state, asset, false).await?;
    Ok(Json(DataResponse { data }))
}

/// GET /api/v1/assets/{id}/history
///
/// Newest first, with usernames resolved.
pub async fn get_asset_history(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssetHistoryDetail>>>> {
    find_asset(&state, id).await?;
    let history = AssetHistoryRepo::list_for_asset(&state.pool, id).await?;
    Ok(Json(DataResponse { data: history }))
}

/// GET /api/v1/assets/{id}/depreciation
pub async fn get_asset_depreciation(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<AssetDepreciation>>> {
    let asset = find_asset(&state, id).await?;
    let depreciation = asset.depreciation(today()).ok_or_else(|| {
        AppError::BadRequest(
            "Cannot calculate depreciation. Purchase price and date are required.".into(),
        )
    })?;

    Ok(Json(DataResponse {
        data: AssetDepreciation {
            asset_id: asset.id,
            asset_name: asset.name,
            depreciation,
        },
    }))
}

/// GET /api/v1/assets/export
///
/// Every asset as a CSV attachment.
pub async fn export_assets(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
) -> AppResult<Response> {
    let rows = AssetRepo::list_for_export(&state.pool).await?;
    let count = rows.len();
    let csv = build_csv(ASSET_EXPORT_HEADERS, rows.iter().map(|r| r.to_csv_fields()));
    tracing::info!(user_id = user.user_id, count, "Assets exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{ASSET_EXPORT_FILENAME}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn today() -> Date {
    chrono::Utc::now().date_naive()
}

async fn find_asset(state: &AppState, id: DbId) -> AppResult<Asset> {
    AssetRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "Asset", id }))
}

/// Translate list query parameters into a repository filter.
fn build_filter(params: &ListAssetsQuery, today: Date) -> AppResult<AssetFilter> {
    let status = params
        .status
        .as_deref()
        .map(AssetStatus::parse)
        .transpose()?
        .map(|s| s.as_str().to_string());

    let warranty_between = params
        .warranty_expiring_days
        .map(|days| look_ahead("warranty_expiring_days", days, today))
        .transpose()?;

    Ok(AssetFilter {
        category: params.category.clone(),
        status,
        assigned_to: params.assigned_to,
        department: params.department.clone(),
        purchase_date_from: parse_optional_date(
            "purchase_date_from",
            params.purchase_date_from.as_deref(),
        )?,
        purchase_date_to: parse_optional_date(
            "purchase_date_to",
            params.purchase_date_to.as_deref(),
        )?,
        warranty_between,
        search: like_pattern(params.search.as_deref()),
    })
}

fn validate_price(price: Option<Decimal>) -> Result<(), CoreError> {
    match price {
        Some(p) if p.is_sign_negative() => Err(CoreError::Validation(
            "purchase_price must not be negative".into(),
        )),
        _ => Ok(()),
    }
}

/// Parse a clearable date field from an update body.
fn patch_date(field: &str, value: Option<Option<String>>) -> AppResult<Option<Option<Date>>> {
    value
        .map(|inner| parse_optional_date(field, inner.as_deref()))
        .transpose()
        .map_err(AppError::from)
}

fn blank_to_none(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Attach assignee summaries (one query for the whole batch) and optional
/// depreciation.
pub(crate) async fn enrich_assets(
    state: &AppState,
    assets: Vec<Asset>,
    include_depreciation: bool,
) -> AppResult<Vec<AssetResponse>> {
    let mut ids: Vec<DbId> = assets.iter().filter_map(|a| a.assigned_to_user_id).collect();
    ids.sort_unstable();
    ids.dedup();

    let users: HashMap<DbId, UserSummary> = UserRepo::find_by_ids(&state.pool, &ids)
        .await?
        .into_iter()
        .map(|u| (u.id, UserSummary::from(u)))
        .collect();

    let today = today();
    Ok(assets
        .into_iter()
        .map(|asset| AssetResponse {
            assigned_user: asset
                .assigned_to_user_id
                .and_then(|id| users.get(&id).cloned()),
            depreciation: include_depreciation
                .then(|| asset.depreciation(today))
                .flatten(),
            asset,
        })
        .collect())
}

async fn enrich_asset(
    state: &AppState,
    asset: Asset,
    include_depreciation: bool,
) -> AppResult<AssetResponse> {
    let mut enriched = enrich_assets(state, vec![asset], include_depreciation).await?;
    enriched
        .pop()
        .ok_or_else(|| AppError::InternalError("Asset enrichment produced no row".into()))
}
