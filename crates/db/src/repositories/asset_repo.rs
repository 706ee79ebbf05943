//! Repository for the `assets` table.
//!
//! Every mutation that changes an asset's lifecycle writes its
//! `asset_history` entry in the same transaction.

use assetflow_core::asset::{STATUS_ASSIGNED, STATUS_AVAILABLE};
use assetflow_core::history::{self, actions, ChangeSet};
use assetflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::asset::{Asset, AssetExportRow, AssetFilter, CreateAsset, UpdateAsset};
use crate::models::history::CreateHistoryEntry;
use crate::repositories::AssetHistoryRepo;

const COLUMNS: &str = "id, name, description, category, serial_number, purchase_date, \
                       purchase_price, warranty_expiration, status, condition, \
                       assigned_to_user_id, location, created_at, updated_at";

/// [`COLUMNS`] qualified with the `a` alias for joined queries.
const A_COLUMNS: &str = "a.id, a.name, a.description, a.category, a.serial_number, \
                         a.purchase_date, a.purchase_price, a.warranty_expiration, a.status, \
                         a.condition, a.assigned_to_user_id, a.location, a.created_at, a.updated_at";

/// Asset CRUD plus the assign/release workflow.
pub struct AssetRepo;

impl AssetRepo {
    /// Insert an asset and its `created` history entry.
    pub async fn create(
        pool: &PgPool,
        input: &CreateAsset,
        performed_by: DbId,
    ) -> Result<Asset, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO assets
                (name, description, category, serial_number, purchase_date, purchase_price,
                 warranty_expiration, status, condition, location)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(&input.category)
            .bind(&input.serial_number)
            .bind(input.purchase_date)
            .bind(input.purchase_price)
            .bind(input.warranty_expiration)
            .bind(&input.status)
            .bind(&input.condition)
            .bind(&input.location)
            .fetch_one(&mut *tx)
            .await?;

        let entry = CreateHistoryEntry::new(asset.id, actions::CREATED, performed_by)
            .details(history::created_details(&asset.name));
        AssetHistoryRepo::insert(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(asset)
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Asset>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1");
        sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Load several assets at once. Missing IDs are skipped.
    pub async fn find_by_ids(pool: &PgPool, ids: &[DbId]) -> Result<Vec<Asset>, sqlx::Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = ANY($1)");
        sqlx::query_as::<_, Asset>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List assets matching every set filter, ordered by ID.
    pub async fn list(pool: &PgPool, filter: &AssetFilter) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {A_COLUMNS}
             FROM assets a
             LEFT JOIN users u ON u.id = a.assigned_to_user_id
             WHERE ($1::TEXT IS NULL OR a.category = $1)
               AND ($2::TEXT IS NULL OR a.status = $2)
               AND ($3::BIGINT IS NULL OR a.assigned_to_user_id = $3)
               AND ($4::TEXT IS NULL OR u.department = $4)
               AND ($5::DATE IS NULL OR a.purchase_date >= $5)
               AND ($6::DATE IS NULL OR a.purchase_date <= $6)
               AND ($7::DATE IS NULL OR a.warranty_expiration >= $7)
               AND ($8::DATE IS NULL OR a.warranty_expiration <= $8)
               AND ($9::TEXT IS NULL
                    OR a.name ILIKE $9
                    OR a.serial_number ILIKE $9
                    OR a.description ILIKE $9)
             ORDER BY a.id"
        );
        let (warranty_from, warranty_to) = filter.warranty_between.unzip();
        sqlx::query_as::<_, Asset>(&query)
            .bind(&filter.category)
            .bind(&filter.status)
            .bind(filter.assigned_to)
            .bind(&filter.department)
            .bind(filter.purchase_date_from)
            .bind(filter.purchase_date_to)
            .bind(warranty_from)
            .bind(warranty_to)
            .bind(&filter.search)
            .fetch_all(pool)
            .await
    }

    /// Assets currently assigned to a user.
    pub async fn list_by_assignee(pool: &PgPool, user_id: DbId) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assets WHERE assigned_to_user_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, Asset>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }

    /// All assets with the assignee's username, for CSV export.
    pub async fn list_for_export(pool: &PgPool) -> Result<Vec<AssetExportRow>, sqlx::Error> {
        sqlx::query_as::<_, AssetExportRow>(
            "SELECT a.id, a.name, a.category, a.serial_number, a.status, a.condition,
                    a.purchase_date, a.purchase_price, a.warranty_expiration,
                    u.username AS assigned_username, a.location, a.created_at
             FROM assets a
             LEFT JOIN users u ON u.id = a.assigned_to_user_id
             ORDER BY a.id",
        )
        .fetch_all(pool)
        .await
    }

    /// Assets that have both a purchase price and a purchase date.
    pub async fn list_priced(pool: &PgPool) -> Result<Vec<Asset>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM assets
             WHERE purchase_price IS NOT NULL AND purchase_date IS NOT NULL
             ORDER BY id"
        );
        sqlx::query_as::<_, Asset>(&query).fetch_all(pool).await
    }

    /// Patch an asset, logging an `updated` entry listing the changed fields.
    ///
    /// Nothing is logged when the patch changes no values. Returns `None` if
    /// the asset does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateAsset,
        performed_by: DbId,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!("SELECT {COLUMNS} FROM assets WHERE id = $1 FOR UPDATE");
        let Some(old) = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let mut changes = ChangeSet::new();
        changes.track("name", Some(old.name.as_str()), input.name.as_deref());
        changes.track_nullable(
            "description",
            old.description.as_deref(),
            input.description.as_ref().map(Option::as_deref),
        );
        changes.track("category", Some(old.category.as_str()), input.category.as_deref());
        changes.track_nullable(
            "serial_number",
            old.serial_number.as_deref(),
            input.serial_number.as_ref().map(Option::as_deref),
        );
        changes.track_nullable(
            "purchase_date",
            old.purchase_date.as_ref(),
            input.purchase_date.as_ref().map(Option::as_ref),
        );
        changes.track_nullable(
            "purchase_price",
            old.purchase_price.as_ref(),
            input.purchase_price.as_ref().map(Option::as_ref),
        );
        changes.track_nullable(
            "warranty_expiration",
            old.warranty_expiration.as_ref(),
            input.warranty_expiration.as_ref().map(Option::as_ref),
        );
        changes.track("status", Some(old.status.as_str()), input.status.as_deref());
        changes.track("condition", Some(old.condition.as_str()), input.condition.as_deref());
        changes.track_nullable(
            "location",
            old.location.as_deref(),
            input.location.as_ref().map(Option::as_deref),
        );

        if changes.is_empty() {
            tx.commit().await?;
            return Ok(Some(old));
        }

        // Nullable columns take their resolved value from `patched`.
        let query = format!(
            "UPDATE assets SET
                name = COALESCE($2, name),
                description = $3,
                category = COALESCE($4, category),
                serial_number = $5,
                purchase_date = $6,
                purchase_price = $7,
                warranty_expiration = $8,
                status = COALESCE($9, status),
                condition = COALESCE($10, condition),
                location = $11
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(patched(&input.description, &old.description))
            .bind(&input.category)
            .bind(patched(&input.serial_number, &old.serial_number))
            .bind(patched(&input.purchase_date, &old.purchase_date))
            .bind(patched(&input.purchase_price, &old.purchase_price))
            .bind(patched(&input.warranty_expiration, &old.warranty_expiration))
            .bind(&input.status)
            .bind(&input.condition)
            .bind(patched(&input.location, &old.location))
            .fetch_one(&mut *tx)
            .await?;

        let entry = CreateHistoryEntry::new(id, actions::UPDATED, performed_by)
            .details(changes.details())
            .extra(serde_json::json!({ "fields": changes.fields() }));
        AssetHistoryRepo::insert(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(Some(asset))
    }

    /// Delete an asset. Its tickets, licenses, and history cascade.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM assets WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Assign an available, unassigned asset to a user and log `assigned`.
    ///
    /// Returns `None` when the asset is missing, already assigned, or not
    /// `Available`.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
        username: &str,
        performed_by: DbId,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "UPDATE assets SET assigned_to_user_id = $2, status = $3
             WHERE id = $1 AND assigned_to_user_id IS NULL AND status = $4
             RETURNING {COLUMNS}"
        );
        let Some(asset) = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(user_id)
            .bind(STATUS_ASSIGNED)
            .bind(STATUS_AVAILABLE)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let entry = CreateHistoryEntry::new(id, actions::ASSIGNED, performed_by)
            .details(history::assigned_details(username))
            .to_user(Some(user_id));
        AssetHistoryRepo::insert(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(Some(asset))
    }

    /// Clear an asset's assignee and log `released`.
    ///
    /// An `Assigned` asset becomes `Available`; an asset in maintenance keeps
    /// its maintenance status. Returns `None` when the asset is missing or
    /// not assigned.
    pub async fn release(
        pool: &PgPool,
        id: DbId,
        performed_by: DbId,
    ) -> Result<Option<Asset>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let previous: Option<Option<DbId>> =
            sqlx::query_scalar("SELECT assigned_to_user_id FROM assets WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(Some(previous_user)) = previous else {
            return Ok(None);
        };

        let query = format!(
            "UPDATE assets SET
                assigned_to_user_id = NULL,
                status = CASE WHEN status = $2 THEN $3 ELSE status END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let asset = sqlx::query_as::<_, Asset>(&query)
            .bind(id)
            .bind(STATUS_ASSIGNED)
            .bind(STATUS_AVAILABLE)
            .fetch_one(&mut *tx)
            .await?;

        let entry = CreateHistoryEntry::new(id, actions::RELEASED, performed_by)
            .details(history::released_details())
            .from_user(Some(previous_user));
        AssetHistoryRepo::insert(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(Some(asset))
    }
}

/// Resolve a nullable patch field against the stored value.
fn patched<T: Clone>(patch: &Option<Option<T>>, current: &Option<T>) -> Option<T> {
    match patch {
        Some(value) => value.clone(),
        None => current.clone(),
    }
}
