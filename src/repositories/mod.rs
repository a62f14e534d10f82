//! Repositorios del sistema
//!
//! Un trait de almacenamiento por entidad. El coordinador depende solo de
//! estos traits; hay implementación PostgreSQL (sqlx) y en memoria.

pub mod client_repository;
pub mod driver_repository;
pub mod memory;
pub mod trip_repository;
pub mod vehicle_repository;

use async_trait::async_trait;
use sqlx::PgPool;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::client::Client;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::resource::ResourceRef;
use crate::models::trip::{TimeWindow, Trip, TripFilter};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::utils::errors::StorageError;

pub use client_repository::PgClientStore;
pub use driver_repository::PgDriverStore;
pub use memory::InMemoryStore;
pub use trip_repository::PgReservationStore;
pub use vehicle_repository::PgVehicleStore;

pub type StorageResult<T> = Result<T, StorageError>;

/// Unidad de trabajo atómica sobre las reservas.
///
/// Los locks pedidos en `begin` se mantienen hasta `commit` o `rollback`.
/// Soltar la transacción sin confirmar equivale a `rollback`.
#[async_trait]
pub trait ReservationTx: Send {
    /// Lee un viaje bloqueando su fila hasta el final de la transacción
    async fn get_trip(&mut self, id: Uuid) -> StorageResult<Option<Trip>>;

    /// Viajes activos de `resource` que solapan `window`, sin `exclude`
    async fn find_overlapping(
        &mut self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>>;

    async fn create_trip(&mut self, trip: &Trip) -> StorageResult<()>;

    async fn update_trip(&mut self, trip: &Trip) -> StorageResult<()>;

    async fn commit(&mut self) -> StorageResult<()>;

    async fn rollback(&mut self) -> StorageResult<()>;
}

#[async_trait]
pub trait ReservationStore: Send + Sync {
    /// Abre una transacción con locks exclusivos sobre `locks`
    async fn begin(&self, locks: &[ResourceRef]) -> StorageResult<Box<dyn ReservationTx>>;

    async fn get_trip(&self, id: Uuid) -> StorageResult<Option<Trip>>;

    /// Ordenados por inicio descendente
    async fn list_trips(&self, filter: &TripFilter) -> StorageResult<Vec<Trip>>;

    /// Lectura sin locks, solo para consultas informativas
    async fn find_overlapping(
        &self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>>;
}

#[async_trait]
pub trait VehicleStore: Send + Sync {
    async fn create(&self, vehicle: &Vehicle) -> StorageResult<()>;

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Vehicle>>;

    async fn list(&self) -> StorageResult<Vec<Vehicle>>;

    /// Actualiza el indicador administrativo con el instante del reloj del llamador
    async fn set_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()>;

    /// Persiste fechas de mantenimiento, estado y `updated_at` del vehículo
    async fn update_maintenance(&self, vehicle: &Vehicle) -> StorageResult<()>;
}

#[async_trait]
pub trait DriverStore: Send + Sync {
    async fn create(&self, driver: &Driver) -> StorageResult<()>;

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Driver>>;

    async fn list(&self) -> StorageResult<Vec<Driver>>;

    async fn set_status(
        &self,
        id: Uuid,
        status: DriverStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()>;
}

#[async_trait]
pub trait ClientStore: Send + Sync {
    async fn create(&self, client: &Client) -> StorageResult<()>;

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Client>>;

    async fn set_active(&self, id: Uuid, active: bool, now: DateTime<Utc>) -> StorageResult<()>;
}

/// Conjunto de almacenes compartido por los servicios
#[derive(Clone)]
pub struct StoreSet {
    pub reservations: Arc<dyn ReservationStore>,
    pub vehicles: Arc<dyn VehicleStore>,
    pub drivers: Arc<dyn DriverStore>,
    pub clients: Arc<dyn ClientStore>,
}

impl StoreSet {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            reservations: Arc::new(PgReservationStore::new(pool.clone())),
            vehicles: Arc::new(PgVehicleStore::new(pool.clone())),
            drivers: Arc::new(PgDriverStore::new(pool.clone())),
            clients: Arc::new(PgClientStore::new(pool)),
        }
    }

    pub fn in_memory(store: Arc<InMemoryStore>) -> Self {
        Self {
            reservations: store.clone(),
            vehicles: store.clone(),
            drivers: store.clone(),
            clients: store,
        }
    }
}

/// Traduce el nombre de la restricción violada al campo que la causa
pub(crate) fn unique_field(error: sqlx::Error, fields: &[&str]) -> StorageError {
    match StorageError::from(error) {
        StorageError::UniqueViolation(constraint) => {
            let field = fields
                .iter()
                .find(|field| constraint.contains(*field))
                .map(|field| field.to_string())
                .unwrap_or(constraint);
            StorageError::UniqueViolation(field)
        }
        other => other,
    }
}
