//! Read-only aggregate queries behind the dashboard endpoints.

use assetflow_core::asset::{
    STATUS_ASSIGNED, STATUS_AVAILABLE, STATUS_IN_REPAIR, STATUS_RETIRED, STATUS_UNDER_MAINTENANCE,
};
use assetflow_core::license::{LICENSE_ACTIVE, LICENSE_EXPIRED};
use assetflow_core::maintenance::{
    TICKET_IN_PROGRESS, TICKET_NEW, TICKET_RESOLVED, TICKET_UNDER_REVIEW,
};
use assetflow_core::types::{Date, Timestamp};
use sqlx::PgPool;

use crate::models::asset::WarrantyExpiringRow;
use crate::models::dashboard::{
    AssetCounts, CategoryCount, DepartmentCount, LicenseCounts, MonthCount, PriorityCount,
    StatusCount, TicketCounts,
};

/// Bucket label for assets without an assignee or whose assignee has no department.
pub const UNASSIGNED_DEPARTMENT: &str = "Unassigned";

pub struct DashboardRepo;

impl DashboardRepo {
    pub async fn asset_counts(pool: &PgPool) -> Result<AssetCounts, sqlx::Error> {
        sqlx::query_as::<_, AssetCounts>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = $1) AS available,
                COUNT(*) FILTER (WHERE status = $2) AS assigned,
                COUNT(*) FILTER (WHERE status IN ($3, $4)) AS under_maintenance,
                COUNT(*) FILTER (WHERE status = $5) AS retired,
                COALESCE(SUM(purchase_price), 0) AS total_value
             FROM assets",
        )
        .bind(STATUS_AVAILABLE)
        .bind(STATUS_ASSIGNED)
        .bind(STATUS_UNDER_MAINTENANCE)
        .bind(STATUS_IN_REPAIR)
        .bind(STATUS_RETIRED)
        .fetch_one(pool)
        .await
    }

    pub async fn ticket_counts(pool: &PgPool) -> Result<TicketCounts, sqlx::Error> {
        sqlx::query_as::<_, TicketCounts>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status IN ($1, $2, $3)) AS open,
                COUNT(*) FILTER (WHERE status = $4) AS resolved
             FROM maintenance_tickets",
        )
        .bind(TICKET_NEW)
        .bind(TICKET_UNDER_REVIEW)
        .bind(TICKET_IN_PROGRESS)
        .bind(TICKET_RESOLVED)
        .fetch_one(pool)
        .await
    }

    pub async fn license_counts(pool: &PgPool) -> Result<LicenseCounts, sqlx::Error> {
        sqlx::query_as::<_, LicenseCounts>(
            "SELECT
                COUNT(*) AS total,
                COUNT(*) FILTER (WHERE status = $1) AS active,
                COUNT(*) FILTER (WHERE status = $2) AS expired
             FROM licenses",
        )
        .bind(LICENSE_ACTIVE)
        .bind(LICENSE_EXPIRED)
        .fetch_one(pool)
        .await
    }

    pub async fn assets_by_category(pool: &PgPool) -> Result<Vec<CategoryCount>, sqlx::Error> {
        sqlx::query_as::<_, CategoryCount>(
            "SELECT category, COUNT(*) AS count FROM assets GROUP BY category ORDER BY category",
        )
        .fetch_all(pool)
        .await
    }

    /// Asset counts per assignee department, with one `Unassigned` bucket.
    pub async fn assets_by_department(pool: &PgPool) -> Result<Vec<DepartmentCount>, sqlx::Error> {
        sqlx::query_as::<_, DepartmentCount>(
            "SELECT department, COUNT(*) AS count
             FROM (
                SELECT COALESCE(u.department, $1) AS department
                FROM assets a
                LEFT JOIN users u ON u.id = a.assigned_to_user_id
             ) d
             GROUP BY department
             ORDER BY department = $1, department",
        )
        .bind(UNASSIGNED_DEPARTMENT)
        .fetch_all(pool)
        .await
    }

    pub async fn assets_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM assets GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn tickets_by_status(pool: &PgPool) -> Result<Vec<StatusCount>, sqlx::Error> {
        sqlx::query_as::<_, StatusCount>(
            "SELECT status, COUNT(*) AS count FROM maintenance_tickets
             GROUP BY status ORDER BY status",
        )
        .fetch_all(pool)
        .await
    }

    pub async fn tickets_by_priority(pool: &PgPool) -> Result<Vec<PriorityCount>, sqlx::Error> {
        sqlx::query_as::<_, PriorityCount>(
            "SELECT priority, COUNT(*) AS count FROM maintenance_tickets
             GROUP BY priority ORDER BY priority",
        )
        .fetch_all(pool)
        .await
    }

    /// Mean hours from creation to resolution over resolved tickets, or `None`
    /// when nothing has been resolved yet.
    pub async fn avg_resolution_hours(pool: &PgPool) -> Result<Option<f64>, sqlx::Error> {
        sqlx::query_scalar(
            "SELECT AVG(EXTRACT(EPOCH FROM (resolved_at - created_at)) / 3600.0)::DOUBLE PRECISION
             FROM maintenance_tickets
             WHERE resolved_at IS NOT NULL",
        )
        .fetch_one(pool)
        .await
    }

    /// Tickets opened at or after `since`.
    pub async fn tickets_created_since(pool: &PgPool, since: Timestamp) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM maintenance_tickets WHERE created_at >= $1")
            .bind(since)
            .fetch_one(pool)
            .await
    }

    /// Assets whose warranty ends within `from..=to`, soonest first.
    pub async fn warranty_expiring(
        pool: &PgPool,
        from: Date,
        to: Date,
    ) -> Result<Vec<WarrantyExpiringRow>, sqlx::Error> {
        sqlx::query_as::<_, WarrantyExpiringRow>(
            "SELECT a.id, a.name, a.description, a.category, a.serial_number,
                    a.purchase_date, a.purchase_price, a.warranty_expiration, a.status,
                    a.condition, a.assigned_to_user_id, a.location, a.created_at, a.updated_at,
                    u.username AS assignee_username, u.department AS assignee_department
             FROM assets a
             LEFT JOIN users u ON u.id = a.assigned_to_user_id
             WHERE a.warranty_expiration IS NOT NULL
               AND a.warranty_expiration >= $1
               AND a.warranty_expiration <= $2
             ORDER BY a.warranty_expiration, a.id",
        )
        .bind(from)
        .bind(to)
        .fetch_all(pool)
        .await
    }

    /// Assets created per month, oldest month first.
    pub async fn assets_timeline(pool: &PgPool) -> Result<Vec<MonthCount>, sqlx::Error> {
        sqlx::query_as::<_, MonthCount>(
            "SELECT to_char(created_at, 'YYYY-MM') AS month, COUNT(*) AS count
             FROM assets
             GROUP BY to_char(created_at, 'YYYY-MM')
             ORDER BY month",
        )
        .fetch_all(pool)
        .await
    }
}
