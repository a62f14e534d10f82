//! Almacén en memoria
//!
//! Usado cuando no hay `DATABASE_URL` y en los tests. Una transacción toma el
//! guard exclusivo de la tabla de viajes y trabaja sobre una copia que solo
//! se publica en `commit`.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use super::{
    ClientStore, DriverStore, ReservationStore, ReservationTx, StorageResult, VehicleStore,
};
use crate::models::client::Client;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::resource::ResourceRef;
use crate::models::trip::{TimeWindow, Trip, TripFilter};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::utils::errors::StorageError;

type TripTable = HashMap<Uuid, Trip>;

#[derive(Default)]
pub struct InMemoryStore {
    trips: Arc<Mutex<TripTable>>,
    vehicles: RwLock<HashMap<Uuid, Vehicle>>,
    drivers: RwLock<HashMap<Uuid, Driver>>,
    clients: RwLock<HashMap<Uuid, Client>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn trip_count(&self) -> usize {
        self.trips.lock().await.len()
    }
}

fn overlapping(
    trips: &TripTable,
    resource: ResourceRef,
    window: &TimeWindow,
    exclude: Option<Uuid>,
) -> Vec<Trip> {
    let mut found: Vec<Trip> = trips
        .values()
        .filter(|trip| trip.blocks(resource, window, exclude))
        .cloned()
        .collect();
    found.sort_by_key(|trip| trip.start_time);
    found
}

fn read_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockReadGuard<'_, T> {
    lock.read().unwrap_or_else(|e| e.into_inner())
}

fn write_lock<T>(lock: &RwLock<T>) -> std::sync::RwLockWriteGuard<'_, T> {
    lock.write().unwrap_or_else(|e| e.into_inner())
}

#[async_trait]
impl ReservationStore for InMemoryStore {
    async fn begin(&self, locks: &[ResourceRef]) -> StorageResult<Box<dyn ReservationTx>> {
        let guard = self.trips.clone().lock_owned().await;
        log::debug!("🔒 Transacción en memoria abierta ({} recursos)", locks.len());
        let working = guard.clone();
        Ok(Box::new(InMemoryTx {
            guard: Some(guard),
            working,
        }))
    }

    async fn get_trip(&self, id: Uuid) -> StorageResult<Option<Trip>> {
        Ok(self.trips.lock().await.get(&id).cloned())
    }

    async fn list_trips(&self, filter: &TripFilter) -> StorageResult<Vec<Trip>> {
        let trips = self.trips.lock().await;
        let mut matching: Vec<Trip> = trips.values().filter(|t| filter.matches(t)).cloned().collect();
        matching.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        Ok(matching
            .into_iter()
            .skip(filter.offset() as usize)
            .take(filter.limit() as usize)
            .collect())
    }

    async fn find_overlapping(
        &self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>> {
        let trips = self.trips.lock().await;
        Ok(overlapping(&trips, resource, window, exclude))
    }
}

pub struct InMemoryTx {
    guard: Option<OwnedMutexGuard<TripTable>>,
    working: TripTable,
}

impl InMemoryTx {
    fn ensure_open(&self) -> StorageResult<()> {
        if self.guard.is_none() {
            return Err(StorageError::Database("transaction already finished".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationTx for InMemoryTx {
    async fn get_trip(&mut self, id: Uuid) -> StorageResult<Option<Trip>> {
        self.ensure_open()?;
        Ok(self.working.get(&id).cloned())
    }

    async fn find_overlapping(
        &mut self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>> {
        self.ensure_open()?;
        Ok(overlapping(&self.working, resource, window, exclude))
    }

    async fn create_trip(&mut self, trip: &Trip) -> StorageResult<()> {
        self.ensure_open()?;
        if self.working.contains_key(&trip.id) {
            return Err(StorageError::UniqueViolation("id".to_string()));
        }
        self.working.insert(trip.id, trip.clone());
        Ok(())
    }

    async fn update_trip(&mut self, trip: &Trip) -> StorageResult<()> {
        self.ensure_open()?;
        match self.working.get_mut(&trip.id) {
            Some(stored) => {
                *stored = trip.clone();
                Ok(())
            }
            None => Err(StorageError::Database(format!(
                "trip {} vanished during update",
                trip.id
            ))),
        }
    }

    async fn commit(&mut self) -> StorageResult<()> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| StorageError::Database("transaction already finished".to_string()))?;
        *guard = std::mem::take(&mut self.working);
        Ok(())
    }

    async fn rollback(&mut self) -> StorageResult<()> {
        self.guard.take();
        self.working.clear();
        Ok(())
    }
}

#[async_trait]
impl VehicleStore for InMemoryStore {
    async fn create(&self, vehicle: &Vehicle) -> StorageResult<()> {
        let mut vehicles = write_lock(&self.vehicles);
        if vehicles.values().any(|v| v.plate == vehicle.plate) {
            return Err(StorageError::UniqueViolation("plate".to_string()));
        }
        vehicles.insert(vehicle.id, vehicle.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Vehicle>> {
        Ok(read_lock(&self.vehicles).get(&id).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<Vehicle>> {
        let mut vehicles: Vec<Vehicle> = read_lock(&self.vehicles).values().cloned().collect();
        vehicles.sort_by(|a, b| a.plate.cmp(&b.plate));
        Ok(vehicles)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: VehicleStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        if let Some(vehicle) = write_lock(&self.vehicles).get_mut(&id) {
            vehicle.set_status(status, now);
        }
        Ok(())
    }

    async fn update_maintenance(&self, vehicle: &Vehicle) -> StorageResult<()> {
        if let Some(stored) = write_lock(&self.vehicles).get_mut(&vehicle.id) {
            stored.status = vehicle.status;
            stored.last_maintenance_on = vehicle.last_maintenance_on;
            stored.next_maintenance_on = vehicle.next_maintenance_on;
            stored.updated_at = vehicle.updated_at;
        }
        Ok(())
    }
}

#[async_trait]
impl DriverStore for InMemoryStore {
    async fn create(&self, driver: &Driver) -> StorageResult<()> {
        let mut drivers = write_lock(&self.drivers);
        if drivers.values().any(|d| d.national_id == driver.national_id) {
            return Err(StorageError::UniqueViolation("national_id".to_string()));
        }
        if drivers.values().any(|d| d.license_number == driver.license_number) {
            return Err(StorageError::UniqueViolation("license_number".to_string()));
        }
        drivers.insert(driver.id, driver.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Driver>> {
        Ok(read_lock(&self.drivers).get(&id).cloned())
    }

    async fn list(&self) -> StorageResult<Vec<Driver>> {
        let mut drivers: Vec<Driver> = read_lock(&self.drivers).values().cloned().collect();
        drivers.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(drivers)
    }

    async fn set_status(
        &self,
        id: Uuid,
        status: DriverStatus,
        now: DateTime<Utc>,
    ) -> StorageResult<()> {
        if let Some(driver) = write_lock(&self.drivers).get_mut(&id) {
            driver.set_status(status, now);
        }
        Ok(())
    }
}

#[async_trait]
impl ClientStore for InMemoryStore {
    async fn create(&self, client: &Client) -> StorageResult<()> {
        let mut clients = write_lock(&self.clients);
        if clients.values().any(|c| c.tax_id == client.tax_id) {
            return Err(StorageError::UniqueViolation("tax_id".to_string()));
        }
        clients.insert(client.id, client.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: Uuid) -> StorageResult<Option<Client>> {
        Ok(read_lock(&self.clients).get(&id).cloned())
    }

    async fn set_active(&self, id: Uuid, active: bool, now: DateTime<Utc>) -> StorageResult<()> {
        if let Some(client) = write_lock(&self.clients).get_mut(&id) {
            client.set_active(active, now);
        }
        Ok(())
    }
}
