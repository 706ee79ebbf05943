//! Role-based access control (RBAC) extractors.
//!
//! Each extractor wraps [`AuthUser`] and rejects with 403 when the user's role
//! is outside the required group.

use assetflow_core::error::CoreError;
use assetflow_core::roles::{describe_group, UserRole, MANAGERS, STAFF};
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then require membership in `group`.
async fn require_group(
    parts: &mut Parts,
    state: &AppState,
    group: &[UserRole],
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !user.role.is_one_of(group) {
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "Access denied. Required role: {}",
            describe_group(group)
        ))));
    }
    Ok(user)
}

/// Requires the `Admin` role.
///
/// ```ignore
/// async fn admin_only(RequireAdmin(user): RequireAdmin) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_group(parts, state, &[UserRole::Admin])
            .await
            .map(RequireAdmin)
    }
}

/// Requires `Admin` or `Asset Manager`: asset and license writes.
pub struct RequireManager(pub AuthUser);

impl FromRequestParts<AppState> for RequireManager {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_group(parts, state, MANAGERS)
            .await
            .map(RequireManager)
    }
}

/// Requires `Admin`, `Asset Manager`, or `HR`: assignment and ticket handling.
pub struct RequireStaff(pub AuthUser);

impl FromRequestParts<AppState> for RequireStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        require_group(parts, state, STAFF).await.map(RequireStaff)
    }
}

/// Requires any authenticated user.
///
/// Equivalent to [`AuthUser`], named for routes where "authenticated only"
/// should read explicitly.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = AuthUser::from_request_parts(parts, state).await?;
        Ok(RequireAuth(user))
    }
}
