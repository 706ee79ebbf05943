//! Handlers for the `/licenses` resource.

use assetflow_core::error::CoreError;
use assetflow_core::license::{
    days_until, validate_seats, LicenseStatus, MAX_SOFTWARE_NAME_LEN,
};
use assetflow_core::search::like_pattern;
use assetflow_core::types::{Date, DbId};
use assetflow_core::validation::{parse_optional_date, require_text};
use assetflow_db::models::license::{
    CreateLicense, License, LicenseFilter, LicenseWithAsset, UpdateLicense,
};
use assetflow_db::repositories::{AssetRepo, LicenseRepo};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireManager;
use crate::query::DaysParams;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListLicensesQuery {
    pub status: Option<String>,
    pub asset_id: Option<DbId>,
    /// Case-insensitive substring match.
    pub software_name: Option<String>,
}

/// Request body for `POST /licenses`; also used for `PUT /licenses/{id}`,
/// where absent fields are left unchanged.
#[derive(Debug, Deserialize)]
pub struct LicenseRequest {
    pub asset_id: Option<DbId>,
    pub software_name: Option<String>,
    pub license_key: Option<String>,
    pub vendor: Option<String>,
    pub purchase_date: Option<String>,
    pub expiration_date: Option<String>,
    pub cost: Option<Decimal>,
    pub seats: Option<i32>,
    pub status: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct LicenseAsset {
    pub id: DbId,
    pub name: String,
    pub serial_number: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct LicenseResponse {
    #[serde(flatten)]
    pub license: License,
    pub asset: Option<LicenseAsset>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_until_expiry: Option<i64>,
}

impl From<LicenseWithAsset> for LicenseResponse {
    fn from(row: LicenseWithAsset) -> Self {
        let asset = row
            .license
            .asset_id
            .zip(row.asset_name)
            .map(|(id, name)| LicenseAsset {
                id,
                name,
                serial_number: row.asset_serial_number,
            });
        Self {
            license: row.license,
            asset,
            days_until_expiry: None,
        }
    }
}

/// GET /api/v1/licenses
pub async fn list_licenses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<ListLicensesQuery>,
) -> AppResult<Json<DataResponse<Vec<LicenseResponse>>>> {
    let filter = LicenseFilter {
        status: params
            .status
            .as_deref()
            .map(LicenseStatus::parse)
            .transpose()?
            .map(|s| s.as_str().to_string()),
        asset_id: params.asset_id,
        software_name: like_pattern(params.software_name.as_deref()),
    };

    let rows = LicenseRepo::list(&state.pool, &filter).await?;
    Ok(Json(DataResponse {
        data: rows.into_iter().map(LicenseResponse::from).collect(),
    }))
}

/// POST /api/v1/licenses
pub async fn create_license(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    AppJson(input): AppJson<LicenseRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<LicenseResponse>>)> {
    let software_name = require_text(
        "software_name",
        input.software_name.as_deref(),
        MAX_SOFTWARE_NAME_LEN,
    )?;
    let seats = input.seats.unwrap_or(1);
    validate_seats(seats)?;
    let status = match input.status.as_deref() {
        Some(s) => LicenseStatus::parse(s)?,
        None => LicenseStatus::Active,
    };
    validate_cost(input.cost)?;
    if let Some(asset_id) = input.asset_id {
        ensure_asset_exists(&state, asset_id).await?;
    }

    let create = CreateLicense {
        asset_id: input.asset_id,
        software_name,
        license_key: input.license_key,
        vendor: input.vendor,
        purchase_date: parse_optional_date("purchase_date", input.purchase_date.as_deref())?,
        expiration_date: parse_optional_date(
            "expiration_date",
            input.expiration_date.as_deref(),
        )?,
        cost: input.cost,
        seats,
        status: status.as_str().to_string(),
    };

    let license = LicenseRepo::create(&state.pool, &create).await?;
    tracing::info!(license_id = license.id, user_id = user.user_id, "License created");

    let data = load_license(&state, license.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data })))
}

/// GET /api/v1/licenses/expiring
///
/// Active licenses expiring within `days` (default 30), soonest first.
pub async fn list_expiring_licenses(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Query(params): Query<DaysParams>,
) -> AppResult<Json<DataResponse<Vec<LicenseResponse>>>> {
    let today = chrono::Utc::now().date_naive();
    let (from, to) = params.window(today)?;

    let rows = LicenseRepo::list_expiring(&state.pool, from, to).await?;
    Ok(Json(DataResponse {
        data: rows
            .into_iter()
            .map(|row| with_days_until_expiry(row, today))
            .collect(),
    }))
}

/// GET /api/v1/licenses/{id}
pub async fn get_license(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<LicenseResponse>>> {
    let data = load_license(&state, id).await?;
    Ok(Json(DataResponse { data }))
}

/// PUT /api/v1/licenses/{id}
pub async fn update_license(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<LicenseRequest>,
) -> AppResult<Json<DataResponse<LicenseResponse>>> {
    let software_name = input
        .software_name
        .as_deref()
        .map(|n| require_text("software_name", Some(n), MAX_SOFTWARE_NAME_LEN))
        .transpose()?;
    if let Some(seats) = input.seats {
        validate_seats(seats)?;
    }
    let status = input
        .status
        .as_deref()
        .map(LicenseStatus::parse)
        .transpose()?
        .map(|s| s.as_str().to_string());
    validate_cost(input.cost)?;
    if let Some(asset_id) = input.asset_id {
        ensure_asset_exists(&state, asset_id).await?;
    }

    let patch = UpdateLicense {
        asset_id: input.asset_id,
        software_name,
        license_key: input.license_key,
        vendor: input.vendor,
        purchase_date: parse_optional_date("purchase_date", input.purchase_date.as_deref())?,
        expiration_date: parse_optional_date(
            "expiration_date",
            input.expiration_date.as_deref(),
        )?,
        cost: input.cost,
        seats: input.seats,
        status,
    };

    LicenseRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }))?;
    tracing::info!(license_id = id, user_id = user.user_id, "License updated");

    let data = load_license(&state, id).await?;
    Ok(Json(DataResponse { data }))
}

/// DELETE /api/v1/licenses/{id}
pub async fn delete_license(
    State(state): State<AppState>,
    RequireManager(user): RequireManager,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if !LicenseRepo::delete(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }));
    }
    tracing::info!(license_id = id, user_id = user.user_id, "License deleted");
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn load_license(state: &AppState, id: DbId) -> AppResult<LicenseResponse> {
    LicenseRepo::find_by_id(&state.pool, id)
        .await?
        .map(LicenseResponse::from)
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "License",
            id,
        }))
}

async fn ensure_asset_exists(state: &AppState, asset_id: DbId) -> AppResult<()> {
    AssetRepo::find_by_id(&state.pool, asset_id)
        .await?
        .map(|_| ())
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Asset",
            id: asset_id,
        }))
}

fn validate_cost(cost: Option<Decimal>) -> Result<(), CoreError> {
    match cost {
        Some(c) if c.is_sign_negative() => {
            Err(CoreError::Validation("cost must not be negative".into()))
        }
        _ => Ok(()),
    }
}

fn with_days_until_expiry(row: LicenseWithAsset, today: Date) -> LicenseResponse {
    let days = row.license.expiration_date.map(|d| days_until(d, today));
    LicenseResponse {
        days_until_expiry: days,
        ..LicenseResponse::from(row)
    }
}
