use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{unique_field, DriverStore, StorageResult};
use crate::models::driver::{Driver, DriverStatus, LicenseCategory};
use crate::utils::errors::StorageError;

const DRIVER_COLUMNS: &str = "id, name, national_id, birth_date, email, phone, license_number, \
    license_category, license_expires_on, status, overtime_minutes, notes, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct DriverRow {
    id: Uuid,
    name: String,
    national_id: String,
    birth_date: NaiveDate,
    email: Option<String>,
    phone: String,
    license_number: String,
    license_category: String,
    license_expires_on: NaiveDate,
    status: String,
    overtime_minutes: i32,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl DriverRow {
    fn into_driver(self) -> StorageResult<Driver> {
        let corrupted = |e: String| StorageError::Corrupted(format!("driver {}: {}", self.id, e));
        let license_category = self.license_category.parse::<LicenseCategory>().map_err(corrupted)?;
        let status = self.status.parse::<DriverStatus>().map_err(corrupted)?;
        Ok(Driver {
            id: self.id,
            name: self.name,
            national_id: self.national_id,
            birth_date: self.birth_date,
            email: self.email,
            phone: self.phone,
            license_number: self.license_number,
            license_category,
            license_expires_on: self.license_expires_on,
            status,
            overtime_minutes: self.overtime_minutes,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgDriverStore {
    pool: PgPool,
}

impl PgDriverStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl DriverStore for PgDriverStore {
    async fn create(&self, driver: &Driver) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO drivers (id, name, national_id, birth_date, email, phone, license_number,
                                 license_category, license_expires_on, status, overtime_minutes,
                                 notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14)
            "#,
        )
        .bind(driver.id)
        .bind(&driver.name)
        .bind(&driver.national_id)
        .bind(driver.birth_date)
        .bind(&driver.email)
        .bind(&driver.phone)
        .bind(&driver.license_number)
        .bind(driver.license_category.as_str())
        .bind(driver.license_expires_on)
        .bind(driver.status.as_str())
        .bind(driver.overtime_minutes)
        .bind(&driver.notes)
        .bind(driver.created_at)
        .bind(driver.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_field(e, &["national_id", "license_number"]))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Driver>> {
        let row = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {} FROM drivers WHERE id = $1",
            DRIVER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(DriverRow::into_driver).transpose()
    }

    async fn list(&self) -> StorageResult<Vec<Driver>> {
        let rows = sqlx::query_as::<_, DriverRow>(&format!(
            "SELECT {} FROM drivers ORDER BY name",
            DRIVER_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(DriverRow::into_driver).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DriverStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        sqlx::query("UPDATE drivers SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
