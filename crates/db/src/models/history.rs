//! Asset history model and DTOs.

use assetflow_core::types::{DbId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the append-only `asset_history` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetHistory {
    pub id: DbId,
    pub asset_id: DbId,
    pub action: String,
    pub details: Option<String>,
    pub performed_by_user_id: DbId,
    pub from_user_id: Option<DbId>,
    pub to_user_id: Option<DbId>,
    pub extra_data: Option<serde_json::Value>,
    pub created_at: Timestamp,
}

/// History row joined with the asset name and the usernames it references.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct AssetHistoryDetail {
    #[sqlx(flatten)]
    #[serde(flatten)]
    pub entry: AssetHistory,
    pub asset_name: Option<String>,
    pub performed_by: Option<String>,
    pub from_user: Option<String>,
    pub to_user: Option<String>,
}

/// DTO for appending a history entry.
#[derive(Debug, Clone)]
pub struct CreateHistoryEntry {
    pub asset_id: DbId,
    pub action: &'static str,
    pub details: Option<String>,
    pub performed_by_user_id: DbId,
    pub from_user_id: Option<DbId>,
    pub to_user_id: Option<DbId>,
    pub extra_data: Option<serde_json::Value>,
}

impl CreateHistoryEntry {
    /// Entry with only the required fields set.
    pub fn new(asset_id: DbId, action: &'static str, performed_by_user_id: DbId) -> Self {
        Self {
            asset_id,
            action,
            details: None,
            performed_by_user_id,
            from_user_id: None,
            to_user_id: None,
            extra_data: None,
        }
    }

    pub fn details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn from_user(mut self, user_id: Option<DbId>) -> Self {
        self.from_user_id = user_id;
        self
    }

    pub fn to_user(mut self, user_id: Option<DbId>) -> Self {
        self.to_user_id = user_id;
        self
    }

    pub fn extra(mut self, extra: serde_json::Value) -> Self {
        self.extra_data = Some(extra);
        self
    }
}
