//! Coordinador de planificación
//!
//! Cada operación que reserva recursos sigue el mismo orden: validación pura,
//! búsqueda de participantes, transacción con locks por recurso, verificación
//! de disponibilidad, escritura y commit. Si algo falla antes del commit la
//! transacción se descarta y no queda ninguna reserva parcial.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::scheduling::{SchedulingConfig, StatusFlagPolicy};
use crate::models::client::Client;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::resource::{EntityKind, ResourceRef};
use crate::models::trip::{NewTrip, TimeWindow, Trip, TripChanges, TripFilter, TripStatus};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::{ReservationTx, StoreSet};
use crate::services::availability_service::AvailabilityChecker;
use crate::services::trip_lifecycle::{TripEvent, TripLifecycle};
use crate::utils::clock::Clock;
use crate::utils::errors::{
    SchedulingError, SchedulingResult, StorageError, ValidationError, ValidationReason,
};
use crate::utils::validation::{validate_positive, validate_required, validate_trip_window};

pub struct SchedulingCoordinator {
    stores: StoreSet,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
}

impl SchedulingCoordinator {
    pub fn new(stores: StoreSet, clock: Arc<dyn Clock>, config: SchedulingConfig) -> Self {
        Self {
            stores,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &SchedulingConfig {
        &self.config
    }

    /// Reserva un vehículo y un conductor para un viaje nuevo
    pub async fn create_trip(&self, new_trip: NewTrip) -> SchedulingResult<Trip> {
        let now = self.clock.now();

        validate_trip_window(&new_trip.window, now)?;
        validate_trip_fields(new_trip.value, &new_trip.origin, &new_trip.destination)?;

        if let Some(requested) = new_trip.requested_status.filter(|s| *s != TripLifecycle::INITIAL) {
            log::debug!(
                "ℹ️ Estado solicitado {} ignorado, los viajes se crean como {}",
                requested,
                TripLifecycle::INITIAL
            );
        }

        let vehicle = self.load_vehicle(new_trip.vehicle_id).await?;
        let driver = self.load_driver(new_trip.driver_id).await?;
        let client = self.load_client(new_trip.client_id).await?;
        self.apply_status_policy(&vehicle, &driver, Some(&client), &new_trip.window)?;

        let trip = Trip {
            id: new_trip.id,
            vehicle_id: vehicle.id,
            driver_id: driver.id,
            client_id: client.id,
            origin: new_trip.origin,
            destination: new_trip.destination,
            start_time: new_trip.window.start,
            end_time: new_trip.window.end,
            value: new_trip.value,
            status: TripLifecycle::INITIAL,
            notes: new_trip.notes,
            created_at: now,
            updated_at: now,
        };
        let locks = [ResourceRef::vehicle(trip.vehicle_id), ResourceRef::driver(trip.driver_id)];

        let stored = self
            .within_deadline("create_trip", async {
                let mut tx = self.stores.reservations.begin(&locks).await?;
                if let Some(existing) = tx.get_trip(trip.id).await? {
                    tx.rollback().await?;
                    return Ok::<_, SchedulingError>(Some(existing));
                }
                ensure_available(tx.as_mut(), &locks, trip.window(), None).await?;
                tx.create_trip(&trip).await?;
                tx.commit().await?;
                Ok(None)
            })
            .await?;

        // Un commit confirmado cuya respuesta se perdió deja el viaje ya escrito
        if let Some(existing) = stored {
            if !existing.same_booking(&trip) {
                return Err(ValidationError::new("id", ValidationReason::Duplicate).into());
            }
            log::info!("♻️ Viaje {} ya reservado, se devuelve el existente", existing.id);
            return Ok(existing);
        }

        log::info!(
            "✅ Viaje {} reservado: vehículo {} conductor {} {}",
            trip.id,
            trip.vehicle_id,
            trip.driver_id,
            trip.window()
        );
        Ok(trip)
    }

    /// Aplica cambios parciales; si tocan horario o recursos se revalida la reserva
    pub async fn update_trip(&self, id: Uuid, changes: TripChanges) -> SchedulingResult<Trip> {
        let now = self.clock.now();
        let current = self.get_trip(id).await?;

        if !changes.reschedules(&current) {
            let updated = self
                .within_deadline("update_trip", async {
                    let mut tx = self.stores.reservations.begin(&[]).await?;
                    let mut trip = lock_trip(tx.as_mut(), id).await?;
                    if changes.reschedules(&trip) {
                        return Err(concurrent_change(id));
                    }
                    apply_changes(&mut trip, &changes, now);
                    validate_trip_fields(trip.value, &trip.origin, &trip.destination)?;
                    tx.update_trip(&trip).await?;
                    tx.commit().await?;
                    Ok::<_, SchedulingError>(trip)
                })
                .await?;

            log::info!("📝 Viaje {} actualizado", id);
            return Ok(updated);
        }

        if !TripLifecycle::allows_reschedule(current.status) {
            return Err(ValidationError::new("status", ValidationReason::NotReschedulable).into());
        }

        let mut proposed = current.clone();
        apply_changes(&mut proposed, &changes, now);
        validate_trip_window(&proposed.window(), now)?;
        validate_trip_fields(proposed.value, &proposed.origin, &proposed.destination)?;

        let vehicle = self.load_vehicle(proposed.vehicle_id).await?;
        let driver = self.load_driver(proposed.driver_id).await?;
        let client = match self.config.status_policy {
            StatusFlagPolicy::Enforce => Some(self.load_client(proposed.client_id).await?),
            StatusFlagPolicy::Advisory => None,
        };
        self.apply_status_policy(&vehicle, &driver, client.as_ref(), &proposed.window())?;

        let locks = [
            ResourceRef::vehicle(proposed.vehicle_id),
            ResourceRef::driver(proposed.driver_id),
        ];

        let updated = self
            .within_deadline("update_trip", async {
                let mut tx = self.stores.reservations.begin(&locks).await?;
                let mut trip = lock_trip(tx.as_mut(), id).await?;
                if !TripLifecycle::allows_reschedule(trip.status) {
                    return Err(SchedulingError::from(ValidationError::new(
                        "status",
                        ValidationReason::NotReschedulable,
                    )));
                }
                apply_changes(&mut trip, &changes, now);
                if trip.vehicle_id != proposed.vehicle_id || trip.driver_id != proposed.driver_id {
                    return Err(concurrent_change(id));
                }
                validate_trip_window(&trip.window(), now)?;
                ensure_available(tx.as_mut(), &locks, trip.window(), Some(id)).await?;
                tx.update_trip(&trip).await?;
                tx.commit().await?;
                Ok::<_, SchedulingError>(trip)
            })
            .await?;

        log::info!("🔁 Viaje {} reprogramado {}", id, updated.window());
        Ok(updated)
    }

    pub async fn cancel_trip(&self, id: Uuid) -> SchedulingResult<Trip> {
        self.apply_event(id, TripEvent::Cancel).await
    }

    pub async fn start_trip(&self, id: Uuid) -> SchedulingResult<Trip> {
        self.apply_event(id, TripEvent::Start).await
    }

    pub async fn complete_trip(&self, id: Uuid) -> SchedulingResult<Trip> {
        self.apply_event(id, TripEvent::Complete).await
    }

    pub async fn get_trip(&self, id: Uuid) -> SchedulingResult<Trip> {
        self.stores
            .reservations
            .get_trip(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Trip, id))
    }

    pub async fn list_trips(&self, filter: &TripFilter) -> SchedulingResult<Vec<Trip>> {
        Ok(self.stores.reservations.list_trips(filter).await?)
    }

    async fn apply_event(&self, id: Uuid, event: TripEvent) -> SchedulingResult<Trip> {
        let now = self.clock.now();

        let (from, trip) = self
            .within_deadline(&format!("{}_trip", event), async {
                let mut tx = self.stores.reservations.begin(&[]).await?;
                let mut trip = lock_trip(tx.as_mut(), id).await?;
                let from = trip.status;
                trip.status = TripLifecycle::transition(from, event)?;
                trip.updated_at = now;
                tx.update_trip(&trip).await?;
                tx.commit().await?;
                Ok::<_, SchedulingError>((from, trip))
            })
            .await?;

        log::info!("🚦 Viaje {}: {} -> {}", id, from, trip.status);
        self.sync_status_flags(&trip, from, now).await;
        Ok(trip)
    }

    /// Actualización oportunista de los indicadores; un fallo solo se registra
    async fn sync_status_flags(&self, trip: &Trip, from: TripStatus, now: DateTime<Utc>) {
        let flags = match (from, trip.status) {
            (_, TripStatus::InProgress) => Some((VehicleStatus::InUse, DriverStatus::OnTrip)),
            (_, TripStatus::Completed) | (TripStatus::InProgress, TripStatus::Cancelled) => {
                Some((VehicleStatus::Available, DriverStatus::Available))
            }
            _ => None,
        };
        let Some((vehicle_status, driver_status)) = flags else {
            return;
        };

        if let Err(e) = self.stores.vehicles.set_status(trip.vehicle_id, vehicle_status, now).await {
            log::warn!("⚠️ No se pudo marcar el vehículo {} como {}: {}", trip.vehicle_id, vehicle_status, e);
        }
        if let Err(e) = self.stores.drivers.set_status(trip.driver_id, driver_status, now).await {
            log::warn!("⚠️ No se pudo marcar el conductor {} como {}: {}", trip.driver_id, driver_status, e);
        }
    }

    async fn load_vehicle(&self, id: Uuid) -> SchedulingResult<Vehicle> {
        self.stores
            .vehicles
            .get_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Vehicle, id))
    }

    async fn load_driver(&self, id: Uuid) -> SchedulingResult<Driver> {
        self.stores
            .drivers
            .get_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Driver, id))
    }

    async fn load_client(&self, id: Uuid) -> SchedulingResult<Client> {
        self.stores
            .clients
            .get_by_id(id)
            .await?
            .ok_or_else(|| SchedulingError::not_found(EntityKind::Client, id))
    }

    fn apply_status_policy(
        &self,
        vehicle: &Vehicle,
        driver: &Driver,
        client: Option<&Client>,
        window: &TimeWindow,
    ) -> SchedulingResult<()> {
        if self.config.status_policy == StatusFlagPolicy::Advisory {
            return Ok(());
        }
        let last_day = window.end.date_naive();

        if !vehicle.status_allows_booking() {
            return Err(ValidationError::new("vehicle_id", ValidationReason::NotBookable).into());
        }
        if vehicle.documents_expired(last_day) {
            return Err(ValidationError::new("vehicle_id", ValidationReason::Expired).into());
        }
        if !driver.status_allows_booking() {
            return Err(ValidationError::new("driver_id", ValidationReason::NotBookable).into());
        }
        if !driver.license_valid_on(last_day) {
            return Err(ValidationError::new("driver_id", ValidationReason::Expired).into());
        }
        if client.map_or(false, |c| !c.active) {
            return Err(ValidationError::new("client_id", ValidationReason::NotBookable).into());
        }
        Ok(())
    }

    /// Ejecuta una unidad de trabajo con el plazo configurado
    async fn within_deadline<T>(
        &self,
        operation: &str,
        work: impl Future<Output = SchedulingResult<T>>,
    ) -> SchedulingResult<T> {
        match tokio::time::timeout(self.config.transaction_timeout, work).await {
            Ok(result) => result,
            Err(_) => {
                log::error!(
                    "⏱️ {} excedió el plazo de {:?}, transacción abortada",
                    operation,
                    self.config.transaction_timeout
                );
                Err(StorageError::Timeout.into())
            }
        }
    }
}

fn validate_trip_fields(value: Decimal, origin: &str, destination: &str) -> Result<(), ValidationError> {
    validate_positive("value", value)?;
    validate_required("origin", origin)?;
    validate_required("destination", destination)?;
    Ok(())
}

fn apply_changes(trip: &mut Trip, changes: &TripChanges, now: DateTime<Utc>) {
    let window = changes.window_over(trip);
    trip.start_time = window.start;
    trip.end_time = window.end;
    if let Some(vehicle_id) = changes.vehicle_id {
        trip.vehicle_id = vehicle_id;
    }
    if let Some(driver_id) = changes.driver_id {
        trip.driver_id = driver_id;
    }
    if let Some(origin) = &changes.origin {
        trip.origin = origin.clone();
    }
    if let Some(destination) = &changes.destination {
        trip.destination = destination.clone();
    }
    if let Some(value) = changes.value {
        trip.value = value;
    }
    if let Some(notes) = &changes.notes {
        trip.notes = Some(notes.clone());
    }
    trip.updated_at = now;
}

async fn lock_trip(tx: &mut dyn ReservationTx, id: Uuid) -> SchedulingResult<Trip> {
    tx.get_trip(id)
        .await?
        .ok_or_else(|| SchedulingError::not_found(EntityKind::Trip, id))
}

/// Verifica cada recurso en orden; el primero ocupado aborta con `ResourceConflict`
async fn ensure_available(
    tx: &mut dyn ReservationTx,
    resources: &[ResourceRef],
    window: TimeWindow,
    exclude: Option<Uuid>,
) -> SchedulingResult<()> {
    for resource in resources {
        let availability = AvailabilityChecker::check_in_tx(tx, *resource, window, exclude).await?;
        if !availability.available {
            log::warn!(
                "⛔ Conflicto de {} {} en {}: {:?}",
                resource.kind,
                resource.id,
                window,
                availability.conflicting_trip_ids
            );
        }
        availability.into_conflict()?;
    }
    Ok(())
}

/// El viaje cambió entre la lectura previa y el lock; el llamador puede reintentar
fn concurrent_change(id: Uuid) -> SchedulingError {
    StorageError::SerializationFailure(format!("trip {} changed concurrently", id)).into()
}
