//! Well-known role names and role groups.
//!
//! These must match the CHECK constraint on `users.role` in
//! `20250101000002_create_users.sql`.

use crate::error::CoreError;

pub const ROLE_ADMIN: &str = "Admin";
pub const ROLE_ASSET_MANAGER: &str = "Asset Manager";
pub const ROLE_HR: &str = "HR";
pub const ROLE_EMPLOYEE: &str = "Employee";

/// All valid role names, in privilege order.
pub const VALID_ROLES: &[&str] = &[ROLE_ADMIN, ROLE_ASSET_MANAGER, ROLE_HR, ROLE_EMPLOYEE];

/// A user's role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserRole {
    Admin,
    AssetManager,
    Hr,
    Employee,
}

/// Roles allowed to create, edit, delete, and export assets and licenses.
pub const MANAGERS: &[UserRole] = &[UserRole::Admin, UserRole::AssetManager];

/// Roles allowed to assign assets and work maintenance tickets.
pub const STAFF: &[UserRole] = &[UserRole::Admin, UserRole::AssetManager, UserRole::Hr];

impl UserRole {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Admin => ROLE_ADMIN,
            Self::AssetManager => ROLE_ASSET_MANAGER,
            Self::Hr => ROLE_HR,
            Self::Employee => ROLE_EMPLOYEE,
        }
    }

    /// Parse from a string, returning an error for unknown roles.
    pub fn parse(s: &str) -> Result<Self, CoreError> {
        match s {
            ROLE_ADMIN => Ok(Self::Admin),
            ROLE_ASSET_MANAGER => Ok(Self::AssetManager),
            ROLE_HR => Ok(Self::Hr),
            ROLE_EMPLOYEE => Ok(Self::Employee),
            _ => Err(CoreError::Validation(format!(
                "Invalid role. Must be one of: {}",
                VALID_ROLES.join(", ")
            ))),
        }
    }

    /// Whether this role belongs to the given group.
    pub fn is_one_of(&self, group: &[UserRole]) -> bool {
        group.contains(self)
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Human-readable list of role names for a group, used in 403 messages.
pub fn describe_group(group: &[UserRole]) -> String {
    group
        .iter()
        .map(UserRole::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}
