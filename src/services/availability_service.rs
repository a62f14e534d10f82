//! Verificación de disponibilidad
//!
//! La disponibilidad de un recurso se decide recorriendo sus viajes activos,
//! nunca a partir del indicador de estado del vehículo o del conductor.

use futures::future::try_join_all;
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

use crate::config::scheduling::SchedulingConfig;
use crate::models::driver::{Driver, DriverStatus};
use crate::models::resource::{EntityKind, ResourceKind, ResourceRef};
use crate::models::trip::{TimeWindow, Trip};
use crate::models::vehicle::{Vehicle, VehicleStatus};
use crate::repositories::{ReservationStore, ReservationTx, StorageResult, StoreSet};
use crate::utils::clock::Clock;
use crate::utils::errors::{SchedulingError, SchedulingResult};
use crate::utils::validation::validate_query_window;

/// Resultado de una verificación
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Availability {
    pub resource: ResourceRef,
    pub window: TimeWindow,
    pub available: bool,
    pub conflicting_trip_ids: Vec<Uuid>,
}

impl Availability {
    /// Convierte un resultado negativo en `ResourceConflict`
    pub fn into_conflict(self) -> SchedulingResult<()> {
        if self.available {
            return Ok(());
        }
        Err(SchedulingError::ResourceConflict {
            kind: self.resource.kind,
            conflicting_trip_ids: self.conflicting_trip_ids,
        })
    }
}

pub struct AvailabilityChecker;

impl AvailabilityChecker {
    /// Decisión pura sobre un conjunto de viajes candidatos
    pub fn evaluate<'a>(
        resource: ResourceRef,
        window: TimeWindow,
        exclude: Option<Uuid>,
        trips: impl IntoIterator<Item = &'a Trip>,
    ) -> Availability {
        let conflicting_trip_ids: Vec<Uuid> = trips
            .into_iter()
            .filter(|trip| trip.blocks(resource, &window, exclude))
            .map(|trip| trip.id)
            .collect();

        Availability {
            resource,
            window,
            available: conflicting_trip_ids.is_empty(),
            conflicting_trip_ids,
        }
    }

    /// Verificación dentro de una transacción abierta con el lock del recurso
    pub async fn check_in_tx(
        tx: &mut dyn ReservationTx,
        resource: ResourceRef,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Availability> {
        let candidates = tx.find_overlapping(resource, &window, exclude).await?;
        Ok(Self::evaluate(resource, window, exclude, &candidates))
    }

    /// Lectura informativa fuera de transacción
    pub async fn check(
        store: &dyn ReservationStore,
        resource: ResourceRef,
        window: TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Availability> {
        let candidates = store.find_overlapping(resource, &window, exclude).await?;
        Ok(Self::evaluate(resource, window, exclude, &candidates))
    }
}

/// Consultas de disponibilidad expuestas a la API
pub struct AvailabilityService {
    stores: StoreSet,
    clock: Arc<dyn Clock>,
    config: SchedulingConfig,
}

impl AvailabilityService {
    pub fn new(stores: StoreSet, clock: Arc<dyn Clock>, config: SchedulingConfig) -> Self {
        Self {
            stores,
            clock,
            config,
        }
    }

    fn validate_window(&self, window: &TimeWindow) -> SchedulingResult<()> {
        validate_query_window(window, self.clock.now(), self.config.max_query_span)?;
        Ok(())
    }

    async fn ensure_exists(&self, resource: ResourceRef) -> SchedulingResult<()> {
        let exists = match resource.kind {
            ResourceKind::Vehicle => self.stores.vehicles.get_by_id(resource.id).await?.is_some(),
            ResourceKind::Driver => self.stores.drivers.get_by_id(resource.id).await?.is_some(),
        };
        if !exists {
            return Err(SchedulingError::not_found(
                EntityKind::from(resource.kind),
                resource.id,
            ));
        }
        Ok(())
    }

    /// Disponibilidad de un recurso concreto en un intervalo
    pub async fn query(&self, resource: ResourceRef, window: TimeWindow) -> SchedulingResult<Availability> {
        self.validate_window(&window)?;
        self.ensure_exists(resource).await?;

        let availability =
            AvailabilityChecker::check(self.stores.reservations.as_ref(), resource, window, None).await?;
        log::debug!(
            "🔍 {} en {}: disponible={} conflictos={}",
            resource,
            window,
            availability.available,
            availability.conflicting_trip_ids.len()
        );
        Ok(availability)
    }

    /// Vehículos marcados como disponibles y sin viajes que solapen
    pub async fn available_vehicles(&self, window: TimeWindow) -> SchedulingResult<Vec<Vehicle>> {
        self.validate_window(&window)?;

        let candidates: Vec<Vehicle> = self
            .stores
            .vehicles
            .list()
            .await?
            .into_iter()
            .filter(|v| v.status == VehicleStatus::Available)
            .collect();
        let resources = candidates.iter().map(|v| ResourceRef::vehicle(v.id));
        let free = self.free_mask(resources, window).await?;

        Ok(candidates
            .into_iter()
            .zip(free)
            .filter_map(|(vehicle, free)| free.then_some(vehicle))
            .collect())
    }

    /// Conductores marcados como disponibles y sin viajes que solapen
    pub async fn available_drivers(&self, window: TimeWindow) -> SchedulingResult<Vec<Driver>> {
        self.validate_window(&window)?;

        let candidates: Vec<Driver> = self
            .stores
            .drivers
            .list()
            .await?
            .into_iter()
            .filter(|d| d.status == DriverStatus::Available)
            .collect();
        let resources = candidates.iter().map(|d| ResourceRef::driver(d.id));
        let free = self.free_mask(resources, window).await?;

        Ok(candidates
            .into_iter()
            .zip(free)
            .filter_map(|(driver, free)| free.then_some(driver))
            .collect())
    }

    async fn free_mask(
        &self,
        resources: impl Iterator<Item = ResourceRef>,
        window: TimeWindow,
    ) -> SchedulingResult<Vec<bool>> {
        let store = self.stores.reservations.as_ref();
        let checks = resources.map(|resource| AvailabilityChecker::check(store, resource, window, None));
        let results = try_join_all(checks).await?;
        Ok(results.into_iter().map(|a| a.available).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::trip::TripStatus;
    use chrono::{DateTime, TimeZone, Utc};
    use rust_decimal::Decimal;

    fn at(hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, hour, minute, second).unwrap()
    }

    fn trip(vehicle_id: Uuid, status: TripStatus) -> Trip {
        Trip {
            id: Uuid::new_v4(),
            vehicle_id,
            driver_id: Uuid::new_v4(),
            client_id: Uuid::new_v4(),
            origin: "Rodoviária".to_string(),
            destination: "Centro de Convenções".to_string(),
            start_time: at(8, 0, 0),
            end_time: at(12, 0, 0),
            value: Decimal::new(32000, 2),
            status,
            notes: None,
            created_at: at(0, 0, 0),
            updated_at: at(0, 0, 0),
        }
    }

    #[test]
    fn test_boundary_touch_conflicts() {
        let vehicle_id = Uuid::new_v4();
        let existing = trip(vehicle_id, TripStatus::Scheduled);
        let resource = ResourceRef::vehicle(vehicle_id);

        let touching = TimeWindow::new(at(12, 0, 0), at(14, 0, 0));
        let result = AvailabilityChecker::evaluate(resource, touching, None, [&existing]);
        assert!(!result.available);
        assert_eq!(result.conflicting_trip_ids, vec![existing.id]);

        let after = TimeWindow::new(at(12, 0, 1), at(14, 0, 0));
        assert!(AvailabilityChecker::evaluate(resource, after, None, [&existing]).available);
    }

    #[test]
    fn test_cancelled_and_excluded_trips_never_conflict() {
        let vehicle_id = Uuid::new_v4();
        let cancelled = trip(vehicle_id, TripStatus::Cancelled);
        let scheduled = trip(vehicle_id, TripStatus::Scheduled);
        let resource = ResourceRef::vehicle(vehicle_id);
        let window = TimeWindow::new(at(9, 0, 0), at(10, 0, 0));

        assert!(AvailabilityChecker::evaluate(resource, window, None, [&cancelled]).available);
        assert!(
            AvailabilityChecker::evaluate(resource, window, Some(scheduled.id), [&scheduled]).available
        );
    }

    #[test]
    fn test_completed_and_in_progress_trips_still_block() {
        let vehicle_id = Uuid::new_v4();
        let resource = ResourceRef::vehicle(vehicle_id);
        let window = TimeWindow::new(at(9, 0, 0), at(10, 0, 0));
        for status in [TripStatus::InProgress, TripStatus::Completed] {
            let existing = trip(vehicle_id, status);
            assert!(!AvailabilityChecker::evaluate(resource, window, None, [&existing]).available);
        }
    }

    #[test]
    fn test_into_conflict_carries_kind_and_ids() {
        let vehicle_id = Uuid::new_v4();
        let existing = trip(vehicle_id, TripStatus::Scheduled);
        let result = AvailabilityChecker::evaluate(
            ResourceRef::vehicle(vehicle_id),
            existing.window(),
            None,
            [&existing],
        );
        assert_eq!(
            result.into_conflict(),
            Err(SchedulingError::ResourceConflict {
                kind: ResourceKind::Vehicle,
                conflicting_trip_ids: vec![existing.id],
            })
        );
    }
}
