//! Repository for the `licenses` table.

use assetflow_core::license::LICENSE_ACTIVE;
use assetflow_core::types::{Date, DbId};
use sqlx::PgPool;

use crate::models::license::{CreateLicense, License, LicenseFilter, LicenseWithAsset, UpdateLicense};

const COLUMNS: &str = "id, asset_id, software_name, license_key, vendor, purchase_date, \
                       expiration_date, cost, seats, status, created_at, updated_at";

/// Columns for [`LicenseWithAsset`], aliased over `l` and `a`.
const JOINED_COLUMNS: &str = "l.id, l.asset_id, l.software_name, l.license_key, l.vendor, \
                              l.purchase_date, l.expiration_date, l.cost, l.seats, l.status, \
                              l.created_at, l.updated_at, a.name AS asset_name, \
                              a.serial_number AS asset_serial_number";

pub struct LicenseRepo;

impl LicenseRepo {
    pub async fn create(pool: &PgPool, input: &CreateLicense) -> Result<License, sqlx::Error> {
        let query = format!(
            "INSERT INTO licenses
                (asset_id, software_name, license_key, vendor, purchase_date,
                 expiration_date, cost, seats, status)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, License>(&query)
            .bind(input.asset_id)
            .bind(&input.software_name)
            .bind(&input.license_key)
            .bind(&input.vendor)
            .bind(input.purchase_date)
            .bind(input.expiration_date)
            .bind(input.cost)
            .bind(input.seats)
            .bind(&input.status)
            .fetch_one(pool)
            .await
    }

    /// Find a license together with its asset's name.
    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<LicenseWithAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM licenses l
             LEFT JOIN assets a ON a.id = l.asset_id
             WHERE l.id = $1"
        );
        sqlx::query_as::<_, LicenseWithAsset>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List licenses matching every set filter, ordered by ID.
    pub async fn list(
        pool: &PgPool,
        filter: &LicenseFilter,
    ) -> Result<Vec<LicenseWithAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM licenses l
             LEFT JOIN assets a ON a.id = l.asset_id
             WHERE ($1::TEXT IS NULL OR l.status = $1)
               AND ($2::BIGINT IS NULL OR l.asset_id = $2)
               AND ($3::TEXT IS NULL OR l.software_name ILIKE $3)
             ORDER BY l.id"
        );
        sqlx::query_as::<_, LicenseWithAsset>(&query)
            .bind(&filter.status)
            .bind(filter.asset_id)
            .bind(&filter.software_name)
            .fetch_all(pool)
            .await
    }

    /// Patch a license. Returns `None` if it does not exist.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateLicense,
    ) -> Result<Option<License>, sqlx::Error> {
        let query = format!(
            "UPDATE licenses SET
                asset_id = COALESCE($2, asset_id),
                software_name = COALESCE($3, software_name),
                license_key = COALESCE($4, license_key),
                vendor = COALESCE($5, vendor),
                purchase_date = COALESCE($6, purchase_date),
                expiration_date = COALESCE($7, expiration_date),
                cost = COALESCE($8, cost),
                seats = COALESCE($9, seats),
                status = COALESCE($10, status)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, License>(&query)
            .bind(id)
            .bind(input.asset_id)
            .bind(&input.software_name)
            .bind(&input.license_key)
            .bind(&input.vendor)
            .bind(input.purchase_date)
            .bind(input.expiration_date)
            .bind(input.cost)
            .bind(input.seats)
            .bind(&input.status)
            .fetch_optional(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM licenses WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Active licenses expiring within `from..=to`, soonest first.
    pub async fn list_expiring(
        pool: &PgPool,
        from: Date,
        to: Date,
    ) -> Result<Vec<LicenseWithAsset>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS}
             FROM licenses l
             LEFT JOIN assets a ON a.id = l.asset_id
             WHERE l.status = $1
               AND l.expiration_date IS NOT NULL
               AND l.expiration_date >= $2
               AND l.expiration_date <= $3
             ORDER BY l.expiration_date, l.id"
        );
        sqlx::query_as::<_, LicenseWithAsset>(&query)
            .bind(LICENSE_ACTIVE)
            .bind(from)
            .bind(to)
            .fetch_all(pool)
            .await
    }
}
