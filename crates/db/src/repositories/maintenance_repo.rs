//! Repository for the `maintenance_tickets` table.
//!
//! Opening, resolving, and deleting tickets also moves the affected asset's
//! status. Those writes share one transaction with the ticket change.

use assetflow_core::asset::{
    status_after_maintenance, STATUS_IN_REPAIR, STATUS_UNDER_MAINTENANCE,
};
use assetflow_core::history::{self, actions};
use assetflow_core::maintenance::{self, status_after_ticket_assignment, TicketStatus};
use assetflow_core::types::DbId;
use sqlx::PgPool;

use crate::models::history::CreateHistoryEntry;
use crate::models::maintenance::{CreateTicket, MaintenanceTicket, TicketFilter, UpdateTicket};
use crate::repositories::AssetHistoryRepo;

const COLUMNS: &str = "id, asset_id, reported_by_user_id, assigned_to_user_id, title, description, \
                       status, priority, resolution_notes, attachment_url, created_at, updated_at, \
                       resolved_at";

/// Maintenance ticket persistence and its asset side effects.
pub struct MaintenanceRepo;

impl MaintenanceRepo {
    /// Open a ticket, put the asset under maintenance, and log
    /// `maintenance_requested`.
    ///
    /// Returns `None` if the asset does not exist.
    pub async fn create(
        pool: &PgPool,
        input: &CreateTicket,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let old_status: Option<String> =
            sqlx::query_scalar("SELECT status FROM assets WHERE id = $1 FOR UPDATE")
                .bind(input.asset_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(old_status) = old_status else {
            return Ok(None);
        };

        let query = format!(
            "INSERT INTO maintenance_tickets
                (asset_id, reported_by_user_id, title, description, priority)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(input.asset_id)
            .bind(input.reported_by_user_id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .fetch_one(&mut *tx)
            .await?;

        sqlx::query("UPDATE assets SET status = $2 WHERE id = $1")
            .bind(input.asset_id)
            .bind(STATUS_UNDER_MAINTENANCE)
            .execute(&mut *tx)
            .await?;

        let entry =
            CreateHistoryEntry::new(input.asset_id, actions::MAINTENANCE_REQUESTED, input.reported_by_user_id)
                .details(history::maintenance_requested_details(ticket.id, &ticket.title))
                .extra(history::maintenance_requested_extra(
                    &old_status,
                    STATUS_UNDER_MAINTENANCE,
                    ticket.id,
                ));
        AssetHistoryRepo::insert(&mut tx, &entry).await?;

        tx.commit().await?;
        Ok(Some(ticket))
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_tickets WHERE id = $1");
        sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List tickets matching every set filter, newest first.
    pub async fn list(
        pool: &PgPool,
        filter: &TicketFilter,
    ) -> Result<Vec<MaintenanceTicket>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM maintenance_tickets
             WHERE ($1::TEXT IS NULL OR status = $1)
               AND ($2::TEXT IS NULL OR priority = $2)
               AND ($3::BIGINT IS NULL OR asset_id = $3)
               AND ($4::BIGINT IS NULL OR reported_by_user_id = $4)
               AND ($5::BIGINT IS NULL OR assigned_to_user_id = $5)
             ORDER BY created_at DESC, id DESC"
        );
        sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(&filter.status)
            .bind(&filter.priority)
            .bind(filter.asset_id)
            .bind(filter.reported_by)
            .bind(filter.assigned_to)
            .fetch_all(pool)
            .await
    }

    /// Patch the editable fields. Returns `None` if the ticket does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTicket,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_tickets SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                priority = COALESCE($4, priority),
                resolution_notes = COALESCE($5, resolution_notes)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.priority)
            .bind(&input.resolution_notes)
            .fetch_optional(pool)
            .await
    }

    /// Move a ticket to `status`.
    ///
    /// The first transition into `Resolved` stamps `resolved_at`, returns the
    /// asset to `Assigned` or `Available`, and logs `maintenance_resolved`.
    pub async fn update_status(
        pool: &PgPool,
        id: DbId,
        status: TicketStatus,
        performed_by: DbId,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock_inner(&mut tx, id).await? else {
            return Ok(None);
        };
        let resolving = status == TicketStatus::Resolved
            && current.status != TicketStatus::Resolved.as_str();

        let query = format!(
            "UPDATE maintenance_tickets SET
                status = $2,
                resolved_at = CASE WHEN $3 THEN NOW() ELSE resolved_at END
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(id)
            .bind(status.as_str())
            .bind(resolving)
            .fetch_one(&mut *tx)
            .await?;

        if resolving {
            let new_asset_status = Self::restore_asset_inner(&mut tx, ticket.asset_id).await?;
            let entry = CreateHistoryEntry::new(
                ticket.asset_id,
                actions::MAINTENANCE_RESOLVED,
                performed_by,
            )
            .details(history::maintenance_resolved_details(ticket.id))
            .extra(history::maintenance_resolved_extra(ticket.id, &new_asset_status));
            AssetHistoryRepo::insert(&mut tx, &entry).await?;
        }

        tx.commit().await?;
        Ok(Some(ticket))
    }

    /// Assign a ticket to a user. `New` tickets move to `Under Review`.
    pub async fn assign(
        pool: &PgPool,
        id: DbId,
        user_id: DbId,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(current) = Self::lock_inner(&mut tx, id).await? else {
            return Ok(None);
        };
        let next_status = match TicketStatus::parse(&current.status) {
            Ok(s) => status_after_ticket_assignment(s).as_str().to_string(),
            Err(_) => current.status.clone(),
        };

        let query = format!(
            "UPDATE maintenance_tickets SET assigned_to_user_id = $2, status = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        let ticket = sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(id)
            .bind(user_id)
            .bind(&next_status)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(ticket))
    }

    /// Record the public URL of an uploaded attachment.
    pub async fn set_attachment(
        pool: &PgPool,
        id: DbId,
        url: &str,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let query = format!(
            "UPDATE maintenance_tickets SET attachment_url = $2
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(id)
            .bind(url)
            .fetch_optional(pool)
            .await
    }

    /// Delete a ticket. Deleting an open ticket takes the asset out of maintenance.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let Some(ticket) = Self::lock_inner(&mut tx, id).await? else {
            return Ok(false);
        };
        if maintenance::is_open(&ticket.status) {
            Self::restore_asset_inner(&mut tx, ticket.asset_id).await?;
        }

        sqlx::query("DELETE FROM maintenance_tickets WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }

    // -----------------------------------------------------------------------
    // Internal helpers
    // -----------------------------------------------------------------------

    async fn lock_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        id: DbId,
    ) -> Result<Option<MaintenanceTicket>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM maintenance_tickets WHERE id = $1 FOR UPDATE");
        sqlx::query_as::<_, MaintenanceTicket>(&query)
            .bind(id)
            .fetch_optional(&mut **tx)
            .await
    }

    /// Take an asset out of maintenance, returning its resulting status.
    ///
    /// Only `Under Maintenance` and `In Repair` assets move; a retired asset
    /// stays retired.
    async fn restore_asset_inner(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        asset_id: DbId,
    ) -> Result<String, sqlx::Error> {
        let (status, assignee): (String, Option<DbId>) = sqlx::query_as(
            "SELECT status, assigned_to_user_id FROM assets WHERE id = $1 FOR UPDATE",
        )
        .bind(asset_id)
        .fetch_one(&mut **tx)
        .await?;

        if status != STATUS_UNDER_MAINTENANCE && status != STATUS_IN_REPAIR {
            return Ok(status);
        }

        let restored = status_after_maintenance(assignee.is_some()).as_str();
        sqlx::query("UPDATE assets SET status = $2 WHERE id = $1")
            .bind(asset_id)
            .bind(restored)
            .execute(&mut **tx)
            .await?;
        Ok(restored.to_string())
    }
}
