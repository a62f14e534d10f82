//! Repositorio de viajes sobre PostgreSQL
//!
//! Exclusión por recurso con `pg_advisory_xact_lock`: los locks se toman en
//! orden de clave antes de cualquier lectura y se liberan con la transacción.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{ReservationStore, ReservationTx, StorageResult};
use crate::models::resource::{ResourceKind, ResourceRef};
use crate::models::trip::{TimeWindow, Trip, TripFilter, TripStatus};
use crate::utils::errors::StorageError;

const TRIP_COLUMNS: &str = "id, vehicle_id, driver_id, client_id, origin, destination, \
    start_time, end_time, value, status, notes, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    vehicle_id: Uuid,
    driver_id: Uuid,
    client_id: Uuid,
    origin: String,
    destination: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    value: Decimal,
    status: String,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TripRow {
    fn into_trip(self) -> StorageResult<Trip> {
        let status = self
            .status
            .parse::<TripStatus>()
            .map_err(|e| StorageError::Corrupted(format!("trip {}: {}", self.id, e)))?;
        Ok(Trip {
            id: self.id,
            vehicle_id: self.vehicle_id,
            driver_id: self.driver_id,
            client_id: self.client_id,
            origin: self.origin,
            destination: self.destination,
            start_time: self.start_time,
            end_time: self.end_time,
            value: self.value,
            status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

fn into_trips(rows: Vec<TripRow>) -> StorageResult<Vec<Trip>> {
    rows.into_iter().map(TripRow::into_trip).collect()
}

fn resource_column(kind: ResourceKind) -> &'static str {
    match kind {
        ResourceKind::Vehicle => "vehicle_id",
        ResourceKind::Driver => "driver_id",
    }
}

/// Intersección de intervalos cerrados, igual que `TimeWindow::overlaps`
fn overlap_query(kind: ResourceKind) -> String {
    format!(
        "SELECT {} FROM trips \
         WHERE {} = $1 AND status <> 'CANCELLED' \
           AND start_time <= $3 AND $2 <= end_time \
           AND ($4::uuid IS NULL OR id <> $4) \
         ORDER BY start_time",
        TRIP_COLUMNS,
        resource_column(kind)
    )
}

pub struct PgReservationStore {
    pool: PgPool,
}

impl PgReservationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReservationStore for PgReservationStore {
    async fn begin(&self, locks: &[ResourceRef]) -> StorageResult<Box<dyn ReservationTx>> {
        let mut tx = self.pool.begin().await?;

        let mut keys: Vec<String> = locks.iter().map(ResourceRef::lock_key).collect();
        keys.sort();
        keys.dedup();

        for key in &keys {
            sqlx::query("SELECT pg_advisory_xact_lock(hashtextextended($1, 0))")
                .bind(key.as_str())
                .execute(&mut *tx)
                .await?;
        }
        log::debug!("🔒 Locks adquiridos: {:?}", keys);

        Ok(Box::new(PgReservationTx { tx: Some(tx) }))
    }

    async fn get_trip(&self, id: Uuid) -> StorageResult<Option<Trip>> {
        let row = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {} FROM trips WHERE id = $1",
            TRIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TripRow::into_trip).transpose()
    }

    async fn list_trips(&self, filter: &TripFilter) -> StorageResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {} FROM trips \
             WHERE ($1::uuid IS NULL OR vehicle_id = $1) \
               AND ($2::uuid IS NULL OR driver_id = $2) \
               AND ($3::uuid IS NULL OR client_id = $3) \
               AND ($4::text IS NULL OR status = $4) \
             ORDER BY start_time DESC \
             LIMIT $5 OFFSET $6",
            TRIP_COLUMNS
        ))
        .bind(filter.vehicle_id)
        .bind(filter.driver_id)
        .bind(filter.client_id)
        .bind(filter.status.map(|s| s.as_str()))
        .bind(filter.limit())
        .bind(filter.offset())
        .fetch_all(&self.pool)
        .await?;

        into_trips(rows)
    }

    async fn find_overlapping(
        &self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>> {
        let rows = sqlx::query_as::<_, TripRow>(&overlap_query(resource.kind))
            .bind(resource.id)
            .bind(window.start)
            .bind(window.end)
            .bind(exclude)
            .fetch_all(&self.pool)
            .await?;

        into_trips(rows)
    }
}

pub struct PgReservationTx {
    tx: Option<Transaction<'static, Postgres>>,
}

impl PgReservationTx {
    fn tx(&mut self) -> StorageResult<&mut Transaction<'static, Postgres>> {
        self.tx
            .as_mut()
            .ok_or_else(|| StorageError::Database("transaction already finished".to_string()))
    }
}

#[async_trait]
impl ReservationTx for PgReservationTx {
    async fn get_trip(&mut self, id: Uuid) -> StorageResult<Option<Trip>> {
        let tx = self.tx()?;
        let row = sqlx::query_as::<_, TripRow>(&format!(
            "SELECT {} FROM trips WHERE id = $1 FOR UPDATE",
            TRIP_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&mut **tx)
        .await?;

        row.map(TripRow::into_trip).transpose()
    }

    async fn find_overlapping(
        &mut self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>> {
        let tx = self.tx()?;
        let rows = sqlx::query_as::<_, TripRow>(&overlap_query(resource.kind))
            .bind(resource.id)
            .bind(window.start)
            .bind(window.end)
            .bind(exclude)
            .fetch_all(&mut **tx)
            .await?;

        into_trips(rows)
    }

    async fn create_trip(&mut self, trip: &Trip) -> StorageResult<()> {
        let tx = self.tx()?;
        sqlx::query(
            r#"
            INSERT INTO trips (id, vehicle_id, driver_id, client_id, origin, destination,
                               start_time, end_time, value, status, notes, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            "#,
        )
        .bind(trip.id)
        .bind(trip.vehicle_id)
        .bind(trip.driver_id)
        .bind(trip.client_id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.start_time)
        .bind(trip.end_time)
        .bind(trip.value)
        .bind(trip.status.as_str())
        .bind(&trip.notes)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    async fn update_trip(&mut self, trip: &Trip) -> StorageResult<()> {
        let tx = self.tx()?;
        let result = sqlx::query(
            r#"
            UPDATE trips
            SET vehicle_id = $2, driver_id = $3, origin = $4, destination = $5,
                start_time = $6, end_time = $7, value = $8, status = $9,
                notes = $10, updated_at = $11
            WHERE id = $1
            "#,
        )
        .bind(trip.id)
        .bind(trip.vehicle_id)
        .bind(trip.driver_id)
        .bind(&trip.origin)
        .bind(&trip.destination)
        .bind(trip.start_time)
        .bind(trip.end_time)
        .bind(trip.value)
        .bind(trip.status.as_str())
        .bind(&trip.notes)
        .bind(trip.updated_at)
        .execute(&mut **tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::Database(format!("trip {} vanished during update", trip.id)));
        }
        Ok(())
    }

    async fn commit(&mut self) -> StorageResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.commit().await?),
            None => Err(StorageError::Database("transaction already finished".to_string())),
        }
    }

    async fn rollback(&mut self) -> StorageResult<()> {
        match self.tx.take() {
            Some(tx) => Ok(tx.rollback().await?),
            None => Ok(()),
        }
    }
}
