use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use super::{unique_field, StorageResult, VehicleStore};
use crate::models::vehicle::{Vehicle, VehicleStatus, VehicleType};
use crate::utils::errors::StorageError;

const VEHICLE_COLUMNS: &str = "id, plate, brand, model, year, vehicle_type, capacity, status, \
    chassis, color, notes, documents_valid, documents_expire_on, last_maintenance_on, \
    next_maintenance_on, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct VehicleRow {
    id: Uuid,
    plate: String,
    brand: String,
    model: String,
    year: i32,
    vehicle_type: String,
    capacity: i32,
    status: String,
    chassis: Option<String>,
    color: Option<String>,
    notes: Option<String>,
    documents_valid: bool,
    documents_expire_on: NaiveDate,
    last_maintenance_on: Option<NaiveDate>,
    next_maintenance_on: Option<NaiveDate>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl VehicleRow {
    fn into_vehicle(self) -> StorageResult<Vehicle> {
        let corrupted = |e: String| StorageError::Corrupted(format!("vehicle {}: {}", self.id, e));
        let vehicle_type = self.vehicle_type.parse::<VehicleType>().map_err(corrupted)?;
        let status = self.status.parse::<VehicleStatus>().map_err(corrupted)?;
        Ok(Vehicle {
            id: self.id,
            plate: self.plate,
            brand: self.brand,
            model: self.model,
            year: self.year,
            vehicle_type,
            capacity: self.capacity,
            status,
            chassis: self.chassis,
            color: self.color,
            notes: self.notes,
            documents_valid: self.documents_valid,
            documents_expire_on: self.documents_expire_on,
            last_maintenance_on: self.last_maintenance_on,
            next_maintenance_on: self.next_maintenance_on,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

pub struct PgVehicleStore {
    pool: PgPool,
}

impl PgVehicleStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl VehicleStore for PgVehicleStore {
    async fn create(&self, vehicle: &Vehicle) -> StorageResult<()> {
        sqlx::query(
            r#"
            INSERT INTO vehicles (id, plate, brand, model, year, vehicle_type, capacity, status,
                                  chassis, color, notes, documents_valid, documents_expire_on,
                                  last_maintenance_on, next_maintenance_on, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17)
            "#,
        )
        .bind(vehicle.id)
        .bind(&vehicle.plate)
        .bind(&vehicle.brand)
        .bind(&vehicle.model)
        .bind(vehicle.year)
        .bind(vehicle.vehicle_type.as_str())
        .bind(vehicle.capacity)
        .bind(vehicle.status.as_str())
        .bind(&vehicle.chassis)
        .bind(&vehicle.color)
        .bind(&vehicle.notes)
        .bind(vehicle.documents_valid)
        .bind(vehicle.documents_expire_on)
        .bind(vehicle.last_maintenance_on)
        .bind(vehicle.next_maintenance_on)
        .bind(vehicle.created_at)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| unique_field(e, &["plate"]))?;

        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Vehicle>> {
        let row = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM vehicles WHERE id = $1",
            VEHICLE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(VehicleRow::into_vehicle).transpose()
    }

    async fn list(&self) -> StorageResult<Vec<Vehicle>> {
        let rows = sqlx::query_as::<_, VehicleRow>(&format!(
            "SELECT {} FROM vehicles ORDER BY plate",
            VEHICLE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(VehicleRow::into_vehicle).collect()
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        sqlx::query("UPDATE vehicles SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id)
            .bind(status.as_str())
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn update_maintenance(&self, vehicle: &Vehicle) -> StorageResult<()> {
        sqlx::query(
            r#"
            UPDATE vehicles
            SET status = $2, last_maintenance_on = $3, next_maintenance_on = $4, updated_at = $5
            WHERE id = $1
            "#,
        )
        .bind(vehicle.id)
        .bind(vehicle.status.as_str())
        .bind(vehicle.last_maintenance_on)
        .bind(vehicle.next_maintenance_on)
        .bind(vehicle.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
