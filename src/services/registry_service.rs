//! Alta y consulta de vehículos, conductores y clientes
//!
//! Cada alta pasa por la validación de registro de la entidad antes de
//! llegar al almacén. Los documentos se guardan sólo con dígitos, así la
//! unicidad no depende de cómo vinieron formateados.

use std::sync::Arc;
use uuid::Uuid;

use crate::models::client::Client;
use crate::models::driver::Driver;
use crate::models::resource::EntityKind;
use crate::models::vehicle::Vehicle;
use crate::repositories::StoreSet;
use crate::utils::clock::Clock;
use crate::utils::errors::{SchedulingError, SchedulingResult};

pub struct RegistryService {
    stores: StoreSet,
    clock: Arc<dyn Clock>,
}

impl RegistryService {
    pub fn new(stores: StoreSet, clock: Arc<dyn Clock>) -> Self {
        Self { stores, clock }
    }

    pub async fn register_vehicle(&self, vehicle: Vehicle) -> SchedulingResult<Vehicle> {
        vehicle.validate(self.clock.now().date_naive())?;
        self.stores.vehicles.create(&vehicle).await?;
        log::info!("🚐 Vehículo {} registrado ({})", vehicle.id, vehicle.plate);
        Ok(vehicle)
    }

    pub async fn register_driver(&self, mut driver: Driver) -> SchedulingResult<Driver> {
        driver.normalize_documents();
        driver.validate(self.clock.now().date_naive())?;
        self.stores.drivers.create(&driver).await?;
        log::info!("🧑‍✈️ Conductor {} registrado", driver.id);
        Ok(driver)
    }

    pub async fn register_client(&self, mut client: Client) -> SchedulingResult<Client> {
        client.normalize_documents();
        client.validate(self.clock.now().date_naive())?;
        self.stores.clients.create(&client).await?;
        log::info!("👤 Cliente {} registrado", client.id);
        Ok(client)
    }

    pub async fn get_vehicle(&self, id: Uuid) -> SchedulingResult<Vehicle> {
        self.stores
            .vehicles
            .get_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Vehicle, id))
    }

    /// Registra un mantenimiento hecho hoy y programa el siguiente
    pub async fn record_vehicle_maintenance(&self, id: Uuid) -> SchedulingResult<Vehicle> {
        let mut vehicle = self.get_vehicle(id).await?;
        vehicle.register_maintenance(self.clock.now());
        self.stores.vehicles.update_maintenance(&vehicle).await?;
        log::info!(
            "🔧 Mantenimiento del vehículo {} registrado, próximo {:?}",
            vehicle.plate,
            vehicle.next_maintenance_on
        );
        Ok(vehicle)
    }

    pub async fn list_vehicles(&self) -> SchedulingResult<Vec<Vehicle>> {
        Ok(self.stores.vehicles.list().await?)
    }

    pub async fn get_driver(&self, id: Uuid) -> SchedulingResult<Driver> {
        self.stores
            .drivers
            .get_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Driver, id))
    }

    pub async fn list_drivers(&self) -> SchedulingResult<Vec<Driver>> {
        Ok(self.stores.drivers.list().await?)
    }

    pub async fn get_client(&self, id: Uuid) -> SchedulingResult<Client> {
        self.stores
            .clients
            .get_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Client, id))
    }

    /// Activa o desactiva un cliente; con política estricta uno inactivo no reserva
    pub async fn set_client_active(&self, id: Uuid, active: bool) -> SchedulingResult<Client> {
        let mut client = self.get_client(id).await?;
        let now = self.clock.now();
        client.set_active(active, now);
        self.stores.clients.set_active(id, active, now).await?;
        log::info!("👤 Cliente {} {}", id, if active { "activado" } else { "desactivado" });
        Ok(client)
    }
}
