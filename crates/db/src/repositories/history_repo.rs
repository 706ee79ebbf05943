//! Repository for the append-only `asset_history` table.

use assetflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::history::{AssetHistory, AssetHistoryDetail, CreateHistoryEntry};

const COLUMNS: &str = "id, asset_id, action, details, performed_by_user_id, from_user_id, \
                       to_user_id, extra_data, created_at";

/// Columns for [`AssetHistoryDetail`] queries, aliased over `h`, `a`, `pb`, `fu`, `tu`.
const DETAIL_COLUMNS: &str = "h.id, h.asset_id, h.action, h.details, h.performed_by_user_id, \
                              h.from_user_id, h.to_user_id, h.extra_data, h.created_at, \
                              a.name AS asset_name, pb.username AS performed_by, \
                              fu.username AS from_user, tu.username AS to_user";

const DETAIL_JOINS: &str = "FROM asset_history h
             LEFT JOIN assets a ON a.id = h.asset_id
             LEFT JOIN users pb ON pb.id = h.performed_by_user_id
             LEFT JOIN users fu ON fu.id = h.from_user_id
             LEFT JOIN users tu ON tu.id = h.to_user_id";

/// Reads and appends asset history entries.
pub struct AssetHistoryRepo;

impl AssetHistoryRepo {
    /// Append an entry inside the caller's transaction.
    pub async fn insert(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        entry: &CreateHistoryEntry,
    ) -> Result<AssetHistory, sqlx::Error> {
        let query = format!(
            "INSERT INTO asset_history
                (asset_id, action, details, performed_by_user_id, from_user_id, to_user_id, extra_data)
             VALUES ($1, $2, $3, $4, $5, $6, $7)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, AssetHistory>(&query)
            .bind(entry.asset_id)
            .bind(entry.action)
            .bind(&entry.details)
            .bind(entry.performed_by_user_id)
            .bind(entry.from_user_id)
            .bind(entry.to_user_id)
            .bind(&entry.extra_data)
            .fetch_one(&mut **tx)
            .await
    }

    /// History of one asset, newest first, with usernames resolved.
    pub async fn list_for_asset(
        pool: &PgPool,
        asset_id: DbId,
    ) -> Result<Vec<AssetHistoryDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             WHERE h.asset_id = $1
             ORDER BY h.created_at DESC, h.id DESC"
        );
        sqlx::query_as::<_, AssetHistoryDetail>(&query)
            .bind(asset_id)
            .fetch_all(pool)
            .await
    }

    /// Most recent entries across all assets.
    pub async fn recent(pool: &PgPool, limit: i64) -> Result<Vec<AssetHistoryDetail>, sqlx::Error> {
        let query = format!(
            "SELECT {DETAIL_COLUMNS}
             {DETAIL_JOINS}
             ORDER BY h.created_at DESC, h.id DESC
             LIMIT $1"
        );
        sqlx::query_as::<_, AssetHistoryDetail>(&query)
            .bind(limit)
            .fetch_all(pool)
            .await
    }
}
