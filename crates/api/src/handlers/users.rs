//! Handlers for the `/users` resource.
//!
//! Reads are department-scoped for everyone but `Admin`; writes are admin-only.

use assetflow_core::error::CoreError;
use assetflow_core::roles::UserRole;
use assetflow_core::types::DbId;
use assetflow_core::validation::validate_email;
use assetflow_db::models::user::{UpdateUser, UserResponse};
use assetflow_db::repositories::{AssetRepo, SessionRepo, UserRepo};
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use crate::error::{AppError, AppResult};
use crate::extract::AppJson;
use crate::handlers::assets::{enrich_assets, AssetResponse};
use crate::handlers::auth::normalize_department;
use crate::middleware::auth::AuthUser;
use crate::middleware::rbac::RequireAdmin;
use crate::response::DataResponse;
use crate::state::AppState;

/// Request body for `PUT /users/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateUserRequest {
    pub email: Option<String>,
    pub role: Option<String>,
    pub department: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/v1/users
///
/// Admins see every user; everyone else sees their own department.
pub async fn list_users(
    State(state): State<AppState>,
    auth_user: AuthUser,
) -> AppResult<Json<DataResponse<Vec<UserResponse>>>> {
    let users = if auth_user.is_admin() {
        UserRepo::list(&state.pool).await?
    } else {
        UserRepo::list_by_department(&state.pool, auth_user.department.as_deref()).await?
    };

    Ok(Json(DataResponse {
        data: users.into_iter().map(UserResponse::from).collect(),
    }))
}

/// GET /api/v1/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let user = UserRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if !auth_user.is_admin() && user.department != auth_user.department {
        return Err(AppError::Core(CoreError::Forbidden("Access denied".into())));
    }

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// PUT /api/v1/users/{id}
///
/// Admin patch of role, department, email, and active flag. Deactivating a
/// user revokes their refresh sessions.
pub async fn update_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
    AppJson(input): AppJson<UpdateUserRequest>,
) -> AppResult<Json<DataResponse<UserResponse>>> {
    let role = input
        .role
        .as_deref()
        .map(UserRole::parse)
        .transpose()?
        .map(|r| r.as_str().to_string());

    let email = input.email.map(|e| e.trim().to_string());
    if let Some(email) = &email {
        validate_email(email)?;
    }

    let patch = UpdateUser {
        email,
        role,
        department: normalize_department(input.department)?,
        is_active: input.is_active,
    };

    let user = UserRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound { entity: "User", id }))?;

    if input.is_active == Some(false) {
        SessionRepo::revoke_all_for_user(&state.pool, id).await?;
    }

    tracing::info!(user_id = id, admin_id = admin.user_id, "User updated");

    Ok(Json(DataResponse {
        data: UserResponse::from(user),
    }))
}

/// DELETE /api/v1/users/{id}
///
/// Users still holding assets cannot be deleted. Users referenced by history
/// or tickets fail with 409 from the foreign key.
pub async fn delete_user(
    State(state): State<AppState>,
    RequireAdmin(admin): RequireAdmin,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    if id == admin.user_id {
        return Err(AppError::BadRequest("Cannot delete your own account".into()));
    }

    if UserRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    if UserRepo::has_assigned_assets(&state.pool, id).await? {
        return Err(AppError::Core(CoreError::Conflict(
            "User still has assigned assets. Release them first.".into(),
        )));
    }

    UserRepo::delete(&state.pool, id).await?;
    tracing::info!(user_id = id, admin_id = admin.user_id, "User deleted");

    Ok(StatusCode::NO_CONTENT)
}

/// GET /api/v1/users/{id}/assets
pub async fn list_user_assets(
    State(state): State<AppState>,
    _auth_user: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Vec<AssetResponse>>>> {
    if UserRepo::find_by_id(&state.pool, id).await?.is_none() {
        return Err(AppError::Core(CoreError::NotFound { entity: "User", id }));
    }

    let assets = AssetRepo::list_by_assignee(&state.pool, id).await?;
    let data = enrich_assets(&state, assets, false).await?;

    Ok(Json(DataResponse { data }))
}
