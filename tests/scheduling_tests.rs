//! Escenarios del coordinador sobre el almacén en memoria

use async_trait::async_trait;
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use uuid::Uuid;

use trip_scheduling::config::scheduling::{RetryPolicy, SchedulingConfig, StatusFlagPolicy};
use trip_scheduling::models::client::{Address, Client, ClientKind};
use trip_scheduling::models::driver::{Driver, DriverStatus, LicenseCategory};
use trip_scheduling::models::resource::{EntityKind, ResourceKind, ResourceRef};
use trip_scheduling::models::trip::{
    NewTrip, TimeWindow, Trip, TripChanges, TripFilter, TripStatus,
};
use trip_scheduling::models::vehicle::{Vehicle, VehicleStatus, VehicleType};
use trip_scheduling::repositories::{
    InMemoryStore, ReservationStore, ReservationTx, StorageResult, StoreSet,
};
use trip_scheduling::services::{AvailabilityService, RegistryService, SchedulingCoordinator};
use trip_scheduling::utils::clock::{Clock, FixedClock};
use trip_scheduling::utils::errors::{
    SchedulingError, StorageError, ValidationError, ValidationReason,
};
use trip_scheduling::utils::retry::retry_transient;

const NATIONAL_IDS: [&str; 4] = ["52998224725", "52601815906", "08301661305", "18609139034"];
const LICENSES: [&str; 4] = ["16934060837", "48525388803", "53933633881", "75004743995"];

fn at(day: u32, hour: u32, minute: u32, second: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, day, hour, minute, second).unwrap()
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

struct Fixture {
    store: Arc<InMemoryStore>,
    clock: Arc<FixedClock>,
    registry: RegistryService,
    availability: AvailabilityService,
    coordinator: Arc<SchedulingCoordinator>,
}

impl Fixture {
    fn new() -> Self {
        Self::with_config(SchedulingConfig::default())
    }

    fn with_config(config: SchedulingConfig) -> Self {
        let store = Arc::new(InMemoryStore::new());
        let clock = Arc::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 5, 1, 9, 0, 0).unwrap(),
        ));
        let stores = StoreSet::in_memory(store.clone());
        Self {
            store,
            registry: RegistryService::new(stores.clone(), clock.clone()),
            availability: AvailabilityService::new(stores.clone(), clock.clone(), config.clone()),
            coordinator: Arc::new(SchedulingCoordinator::new(stores, clock.clone(), config)),
            clock,
        }
    }

    async fn vehicle(&self, plate: &str, status: VehicleStatus) -> Vehicle {
        let created = Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap();
        let vehicle = Vehicle {
            id: Uuid::new_v4(),
            plate: plate.to_string(),
            brand: "Mercedes-Benz".to_string(),
            model: "Sprinter".to_string(),
            year: 2021,
            vehicle_type: VehicleType::Van,
            capacity: 15,
            status,
            chassis: None,
            color: Some("Branco".to_string()),
            notes: None,
            documents_valid: true,
            documents_expire_on: date(2026, 3, 31),
            last_maintenance_on: None,
            next_maintenance_on: None,
            created_at: created,
            updated_at: created,
        };
        self.registry.register_vehicle(vehicle).await.unwrap()
    }

    async fn driver(&self, index: usize) -> Driver {
        self.driver_with(index, DriverStatus::Available, date(2028, 1, 1)).await
    }

    async fn driver_with(&self, index: usize, status: DriverStatus, license_expires_on: NaiveDate) -> Driver {
        let mut driver = driver_record(NATIONAL_IDS[index], LICENSES[index]);
        driver.name = format!("Motorista {}", index + 1);
        driver.status = status;
        driver.license_expires_on = license_expires_on;
        self.registry.register_driver(driver).await.unwrap()
    }

    async fn client(&self) -> Client {
        let tax_id = Uuid::new_v4().simple().to_string();
        self.registry.register_client(client_record(&tax_id)).await.unwrap()
    }
}

fn driver_record(national_id: &str, license_number: &str) -> Driver {
    let created = Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap();
    Driver {
        id: Uuid::new_v4(),
        name: "Motorista".to_string(),
        national_id: national_id.to_string(),
        birth_date: date(1984, 7, 20),
        email: None,
        phone: "11987654321".to_string(),
        license_number: license_number.to_string(),
        license_category: LicenseCategory::D,
        license_expires_on: date(2028, 1, 1),
        status: DriverStatus::Available,
        overtime_minutes: 0,
        notes: None,
        created_at: created,
        updated_at: created,
    }
}

fn client_record(tax_id: &str) -> Client {
    let created = Utc.with_ymd_and_hms(2025, 1, 2, 8, 0, 0).unwrap();
    Client {
        id: Uuid::new_v4(),
        kind: ClientKind::Organization,
        name: "Turismo Litoral".to_string(),
        tax_id: tax_id.to_string(),
        birth_date: None,
        email: Some("reservas@litoral.com.br".to_string()),
        phone: "4833334444".to_string(),
        mobile: None,
        address: Address::default(),
        notes: None,
        credit_limit: Decimal::new(500000, 2),
        active: true,
        created_at: created,
        updated_at: created,
    }
}

fn new_trip(vehicle: &Vehicle, driver: &Driver, client: &Client, start: DateTime<Utc>, end: DateTime<Utc>) -> NewTrip {
    NewTrip {
        id: Uuid::new_v4(),
        vehicle_id: vehicle.id,
        driver_id: driver.id,
        client_id: client.id,
        origin: "Rodoviária".to_string(),
        destination: "Aeroporto".to_string(),
        window: TimeWindow::new(start, end),
        value: Decimal::new(35000, 2),
        notes: None,
        requested_status: None,
    }
}

fn validation(field: &str, reason: ValidationReason) -> SchedulingError {
    SchedulingError::Validation(ValidationError::new(field, reason))
}

#[tokio::test]
async fn test_touching_intervals_conflict_but_one_second_later_does_not() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let (d1, d2, d3) = (f.driver(0).await, f.driver(1).await, f.driver(2).await);
    let client = f.client().await;

    let first = f
        .coordinator
        .create_trip(new_trip(&vehicle, &d1, &client, at(1, 8, 0, 0), at(1, 12, 0, 0)))
        .await
        .unwrap();
    assert_eq!(first.status, TripStatus::Scheduled);

    let err = f
        .coordinator
        .create_trip(new_trip(&vehicle, &d2, &client, at(1, 12, 0, 0), at(1, 14, 0, 0)))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SchedulingError::ResourceConflict {
            kind: ResourceKind::Vehicle,
            conflicting_trip_ids: vec![first.id],
        }
    );

    let later = f
        .coordinator
        .create_trip(new_trip(&vehicle, &d3, &client, at(1, 12, 0, 1), at(1, 14, 0, 0)))
        .await;
    assert!(later.is_ok());
    assert_eq!(f.store.trip_count().await, 2);
}

#[tokio::test]
async fn test_shared_driver_is_reported_as_driver_conflict() {
    let f = Fixture::new();
    let v1 = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let v2 = f.vehicle("DEF5G67", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let first = f
        .coordinator
        .create_trip(new_trip(&v1, &driver, &client, at(2, 8, 0, 0), at(2, 12, 0, 0)))
        .await
        .unwrap();
    let err = f
        .coordinator
        .create_trip(new_trip(&v2, &driver, &client, at(2, 11, 0, 0), at(2, 15, 0, 0)))
        .await
        .unwrap_err();

    assert_eq!(
        err,
        SchedulingError::ResourceConflict {
            kind: ResourceKind::Driver,
            conflicting_trip_ids: vec![first.id],
        }
    );
}

#[tokio::test]
async fn test_cancellation_frees_the_interval() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let first = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(3, 8, 0, 0), at(3, 12, 0, 0)))
        .await
        .unwrap();
    let cancelled = f.coordinator.cancel_trip(first.id).await.unwrap();
    assert_eq!(cancelled.status, TripStatus::Cancelled);

    let replacement = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(3, 10, 0, 0), at(3, 11, 0, 0)))
        .await;
    assert!(replacement.is_ok());
}

#[tokio::test]
async fn test_lifecycle_rejects_illegal_events() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let trip = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(4, 8, 0, 0), at(4, 12, 0, 0)))
        .await
        .unwrap();

    assert_eq!(
        f.coordinator.complete_trip(trip.id).await.unwrap_err(),
        SchedulingError::IllegalTransition {
            from: TripStatus::Scheduled,
            to: TripStatus::Completed,
        }
    );

    assert_eq!(f.coordinator.start_trip(trip.id).await.unwrap().status, TripStatus::InProgress);
    assert_eq!(f.coordinator.complete_trip(trip.id).await.unwrap().status, TripStatus::Completed);

    assert_eq!(
        f.coordinator.cancel_trip(trip.id).await.unwrap_err(),
        SchedulingError::IllegalTransition {
            from: TripStatus::Completed,
            to: TripStatus::Cancelled,
        }
    );
    assert_eq!(
        f.coordinator.get_trip(trip.id).await.unwrap().status,
        TripStatus::Completed
    );
}

#[tokio::test]
async fn test_requested_status_is_ignored_on_create() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let mut request = new_trip(&vehicle, &driver, &client, at(5, 8, 0, 0), at(5, 9, 0, 0));
    request.requested_status = Some(TripStatus::Completed);

    let trip = f.coordinator.create_trip(request).await.unwrap();
    assert_eq!(trip.status, TripStatus::Scheduled);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_concurrent_bookings_for_same_vehicle_admit_exactly_one() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let (d1, d2) = (f.driver(0).await, f.driver(1).await);
    let client = f.client().await;

    let first = new_trip(&vehicle, &d1, &client, at(6, 8, 0, 0), at(6, 12, 0, 0));
    let second = new_trip(&vehicle, &d2, &client, at(6, 10, 0, 0), at(6, 14, 0, 0));

    let c1 = f.coordinator.clone();
    let c2 = f.coordinator.clone();
    let h1 = tokio::spawn(async move { c1.create_trip(first).await });
    let h2 = tokio::spawn(async move { c2.create_trip(second).await });
    let results = [h1.await.unwrap(), h2.await.unwrap()];

    let successes = results.iter().filter(|r| r.is_ok()).count();
    let conflicts = results
        .iter()
        .filter(|r| {
            matches!(
                r,
                Err(SchedulingError::ResourceConflict {
                    kind: ResourceKind::Vehicle,
                    ..
                })
            )
        })
        .count();
    assert_eq!(successes, 1);
    assert_eq!(conflicts, 1);
    assert_eq!(f.store.trip_count().await, 1);
}

#[tokio::test]
async fn test_reschedule_excludes_the_trip_itself() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let (d1, d2) = (f.driver(0).await, f.driver(1).await);
    let client = f.client().await;

    let trip = f
        .coordinator
        .create_trip(new_trip(&vehicle, &d1, &client, at(7, 8, 0, 0), at(7, 12, 0, 0)))
        .await
        .unwrap();
    let other = f
        .coordinator
        .create_trip(new_trip(&vehicle, &d2, &client, at(7, 15, 0, 0), at(7, 17, 0, 0)))
        .await
        .unwrap();

    let shifted = f
        .coordinator
        .update_trip(
            trip.id,
            TripChanges {
                start_time: Some(at(7, 9, 0, 0)),
                end_time: Some(at(7, 13, 0, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(shifted.window(), TimeWindow::new(at(7, 9, 0, 0), at(7, 13, 0, 0)));

    let err = f
        .coordinator
        .update_trip(
            trip.id,
            TripChanges {
                end_time: Some(at(7, 15, 0, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(
        err,
        SchedulingError::ResourceConflict {
            kind: ResourceKind::Vehicle,
            conflicting_trip_ids: vec![other.id],
        }
    );

    // El intento fallido no deja rastro
    let stored = f.coordinator.get_trip(trip.id).await.unwrap();
    assert_eq!(stored.window(), shifted.window());
}

#[tokio::test]
async fn test_started_trip_cannot_be_rescheduled_but_accepts_notes() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let trip = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(8, 8, 0, 0), at(8, 12, 0, 0)))
        .await
        .unwrap();
    f.coordinator.start_trip(trip.id).await.unwrap();

    let err = f
        .coordinator
        .update_trip(
            trip.id,
            TripChanges {
                end_time: Some(at(8, 13, 0, 0)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err, validation("status", ValidationReason::NotReschedulable));

    let noted = f
        .coordinator
        .update_trip(
            trip.id,
            TripChanges {
                notes: Some("Parada extra no hotel".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(noted.notes.as_deref(), Some("Parada extra no hotel"));
    assert_eq!(noted.status, TripStatus::InProgress);
}

#[tokio::test]
async fn test_accepted_trips_never_overlap_per_resource() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let drivers = [f.driver(0).await, f.driver(1).await, f.driver(2).await, f.driver(3).await];
    let client = f.client().await;

    for step in 0..20usize {
        let start = at(9, 0, 0, 0) + Duration::minutes(step as i64 * 50);
        let end = start + Duration::minutes(90);
        let driver = &drivers[step % drivers.len()];
        let _ = f
            .coordinator
            .create_trip(new_trip(&vehicle, driver, &client, start, end))
            .await;
    }

    let filter = TripFilter {
        vehicle_id: Some(vehicle.id),
        limit: Some(100),
        ..Default::default()
    };
    let accepted = f.coordinator.list_trips(&filter).await.unwrap();
    assert!(!accepted.is_empty());
    for (i, a) in accepted.iter().enumerate() {
        for b in accepted.iter().skip(i + 1) {
            assert!(!a.window().overlaps(&b.window()), "{} overlaps {}", a.window(), b.window());
        }
    }
}

#[tokio::test]
async fn test_status_flags_only_block_under_enforce_policy() {
    let advisory = Fixture::new();
    let vehicle = advisory.vehicle("ABC1234", VehicleStatus::Maintenance).await;
    let driver = advisory.driver(0).await;
    let client = advisory.client().await;
    let booked = advisory
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(10, 8, 0, 0), at(10, 9, 0, 0)))
        .await;
    assert!(booked.is_ok());

    let enforce = Fixture::with_config(SchedulingConfig {
        status_policy: StatusFlagPolicy::Enforce,
        ..Default::default()
    });
    let vehicle = enforce.vehicle("ABC1234", VehicleStatus::Maintenance).await;
    let driver = enforce.driver(0).await;
    let client = enforce.client().await;
    let err = enforce
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(10, 8, 0, 0), at(10, 9, 0, 0)))
        .await
        .unwrap_err();
    assert_eq!(err, validation("vehicle_id", ValidationReason::NotBookable));
    assert_eq!(enforce.store.trip_count().await, 0);
}

#[tokio::test]
async fn test_enforce_policy_checks_license_on_last_day() {
    let f = Fixture::with_config(SchedulingConfig {
        status_policy: StatusFlagPolicy::Enforce,
        ..Default::default()
    });
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver_with(0, DriverStatus::Available, date(2025, 6, 30)).await;
    let client = f.client().await;

    let on_expiry_day = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(30, 8, 0, 0), at(30, 18, 0, 0)))
        .await;
    assert!(on_expiry_day.is_ok());

    let next_day = Utc.with_ymd_and_hms(2025, 7, 1, 6, 0, 0).unwrap();
    let err = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(30, 20, 0, 0), next_day))
        .await
        .unwrap_err();
    assert_eq!(err, validation("driver_id", ValidationReason::Expired));
}

#[tokio::test]
async fn test_unknown_participants_are_not_found() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let mut request = new_trip(&vehicle, &driver, &client, at(11, 8, 0, 0), at(11, 9, 0, 0));
    let missing = Uuid::new_v4();
    request.driver_id = missing;
    assert_eq!(
        f.coordinator.create_trip(request).await.unwrap_err(),
        SchedulingError::NotFound {
            entity: EntityKind::Driver,
            id: missing,
        }
    );

    assert_eq!(
        f.coordinator.start_trip(missing).await.unwrap_err(),
        SchedulingError::NotFound {
            entity: EntityKind::Trip,
            id: missing,
        }
    );
}

#[tokio::test]
async fn test_invalid_trip_fields_are_rejected_before_booking() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let past = Utc.with_ymd_and_hms(2025, 4, 30, 8, 0, 0).unwrap();
    let err = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, past, at(1, 8, 0, 0)))
        .await
        .unwrap_err();
    assert_eq!(err, validation("start_time", ValidationReason::StartInPast));

    let err = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(12, 9, 0, 0), at(12, 9, 0, 0)))
        .await
        .unwrap_err();
    assert_eq!(err, validation("end_time", ValidationReason::EmptyInterval));

    let mut free = new_trip(&vehicle, &driver, &client, at(12, 9, 0, 0), at(12, 10, 0, 0));
    free.value = Decimal::ZERO;
    let err = f.coordinator.create_trip(free).await.unwrap_err();
    assert_eq!(err, validation("value", ValidationReason::NonPositive));

    assert_eq!(f.store.trip_count().await, 0);
}

#[tokio::test]
async fn test_transaction_deadline_aborts_with_retryable_timeout() {
    let f = Fixture::with_config(SchedulingConfig {
        transaction_timeout: std::time::Duration::from_millis(50),
        ..Default::default()
    });
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;
    let request = new_trip(&vehicle, &driver, &client, at(13, 8, 0, 0), at(13, 9, 0, 0));

    let held = f.store.begin(&[ResourceRef::vehicle(vehicle.id)]).await.unwrap();
    let err = f.coordinator.create_trip(request.clone()).await.unwrap_err();
    assert_eq!(err, SchedulingError::Storage(StorageError::Timeout));
    assert!(err.is_retryable());
    drop(held);

    assert!(f.coordinator.create_trip(request).await.is_ok());
}

#[tokio::test]
async fn test_lifecycle_events_sync_status_flags() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let trip = f
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(14, 8, 0, 0), at(14, 12, 0, 0)))
        .await
        .unwrap();

    f.clock.advance(Duration::minutes(45));
    f.coordinator.start_trip(trip.id).await.unwrap();
    let in_use = f.registry.get_vehicle(vehicle.id).await.unwrap();
    let on_trip = f.registry.get_driver(driver.id).await.unwrap();
    assert_eq!(in_use.status, VehicleStatus::InUse);
    assert_eq!(on_trip.status, DriverStatus::OnTrip);
    assert_eq!(in_use.updated_at, f.clock.now());
    assert_eq!(on_trip.updated_at, f.clock.now());

    f.clock.advance(Duration::minutes(10));
    f.coordinator.cancel_trip(trip.id).await.unwrap();
    let released = f.registry.get_vehicle(vehicle.id).await.unwrap();
    assert_eq!(released.status, VehicleStatus::Available);
    assert_eq!(released.updated_at, f.clock.now());
    assert_eq!(f.registry.get_driver(driver.id).await.unwrap().status, DriverStatus::Available);
}

#[tokio::test]
async fn test_availability_queries_report_conflicts() {
    let f = Fixture::new();
    let busy = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let free = f.vehicle("DEF5G67", VehicleStatus::Available).await;
    let parked = f.vehicle("GHI8901", VehicleStatus::Maintenance).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let trip = f
        .coordinator
        .create_trip(new_trip(&busy, &driver, &client, at(15, 8, 0, 0), at(15, 12, 0, 0)))
        .await
        .unwrap();

    let window = TimeWindow::new(at(15, 12, 0, 0), at(15, 13, 0, 0));
    let result = f.availability.query(ResourceRef::vehicle(busy.id), window).await.unwrap();
    assert!(!result.available);
    assert_eq!(result.conflicting_trip_ids, vec![trip.id]);

    let vehicles = f.availability.available_vehicles(window).await.unwrap();
    let ids: Vec<Uuid> = vehicles.iter().map(|v| v.id).collect();
    assert_eq!(ids, vec![free.id]);

    // El indicador administrativo no cuenta para la consulta individual
    let flagged = f.availability.query(ResourceRef::vehicle(parked.id), window).await.unwrap();
    assert!(flagged.available);
    assert!(flagged.conflicting_trip_ids.is_empty());

    let too_long = TimeWindow::new(at(15, 8, 0, 0), at(15, 8, 0, 0) + Duration::days(31));
    assert_eq!(
        f.availability.query(ResourceRef::vehicle(free.id), too_long).await.unwrap_err(),
        validation("end_time", ValidationReason::IntervalTooLong)
    );

    let missing = Uuid::new_v4();
    assert_eq!(
        f.availability.query(ResourceRef::driver(missing), window).await.unwrap_err(),
        SchedulingError::NotFound {
            entity: EntityKind::Driver,
            id: missing,
        }
    );
}

#[tokio::test]
async fn test_duplicate_registration_is_a_validation_error() {
    let f = Fixture::new();
    let first = f.vehicle("ABC1234", VehicleStatus::Available).await;

    let mut copy = first.clone();
    copy.id = Uuid::new_v4();
    let err = f.registry.register_vehicle(copy).await.unwrap_err();
    assert_eq!(err, validation("plate", ValidationReason::Duplicate));
}

#[tokio::test]
async fn test_formatted_documents_collide_with_plain_ones() {
    let f = Fixture::new();
    let stored = f
        .registry
        .register_driver(driver_record("529.982.247-25", "169.340.608-37"))
        .await
        .unwrap();
    assert_eq!(stored.national_id, "52998224725");
    assert_eq!(stored.license_number, "16934060837");

    let err = f
        .registry
        .register_driver(driver_record("52998224725", LICENSES[1]))
        .await
        .unwrap_err();
    assert_eq!(err, validation("national_id", ValidationReason::Duplicate));

    let err = f
        .registry
        .register_driver(driver_record("526.018.159-06", "16934060837"))
        .await
        .unwrap_err();
    assert_eq!(err, validation("license_number", ValidationReason::Duplicate));

    f.registry.register_client(client_record("11.222.333/0001-81")).await.unwrap();
    let err = f
        .registry
        .register_client(client_record("11222333000181"))
        .await
        .unwrap_err();
    assert_eq!(err, validation("tax_id", ValidationReason::Duplicate));
}

/// Confirma la primera transacción pero responde como si la conexión se hubiera caído
struct LostCommitReply {
    inner: Arc<InMemoryStore>,
    replied: Arc<AtomicBool>,
}

struct LostCommitReplyTx {
    inner: Box<dyn ReservationTx>,
    replied: Arc<AtomicBool>,
}

#[async_trait]
impl ReservationStore for LostCommitReply {
    async fn begin(&self, locks: &[ResourceRef]) -> StorageResult<Box<dyn ReservationTx>> {
        let inner = self.inner.begin(locks).await?;
        Ok(Box::new(LostCommitReplyTx {
            inner,
            replied: self.replied.clone(),
        }))
    }

    async fn get_trip(&self, id: Uuid) -> StorageResult<Option<Trip>> {
        self.inner.get_trip(id).await
    }

    async fn list_trips(&self, filter: &TripFilter) -> StorageResult<Vec<Trip>> {
        self.inner.list_trips(filter).await
    }

    async fn find_overlapping(
        &self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>> {
        ReservationStore::find_overlapping(self.inner.as_ref(), resource, window, exclude).await
    }
}

#[async_trait]
impl ReservationTx for LostCommitReplyTx {
    async fn get_trip(&mut self, id: Uuid) -> StorageResult<Option<Trip>> {
        self.inner.get_trip(id).await
    }

    async fn find_overlapping(
        &mut self,
        resource: ResourceRef,
        window: &TimeWindow,
        exclude: Option<Uuid>,
    ) -> StorageResult<Vec<Trip>> {
        self.inner.find_overlapping(resource, window, exclude).await
    }

    async fn create_trip(&mut self, trip: &Trip) -> StorageResult<()> {
        self.inner.create_trip(trip).await
    }

    async fn update_trip(&mut self, trip: &Trip) -> StorageResult<()> {
        self.inner.update_trip(trip).await
    }

    async fn commit(&mut self) -> StorageResult<()> {
        self.inner.commit().await?;
        if !self.replied.swap(true, Ordering::SeqCst) {
            return Err(StorageError::ConnectionLost("reply lost after commit".to_string()));
        }
        Ok(())
    }

    async fn rollback(&mut self) -> StorageResult<()> {
        self.inner.rollback().await
    }
}

#[tokio::test]
async fn test_retry_after_lost_commit_reply_returns_the_stored_trip() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let replied = Arc::new(AtomicBool::new(false));
    let stores = StoreSet {
        reservations: Arc::new(LostCommitReply {
            inner: f.store.clone(),
            replied: replied.clone(),
        }),
        vehicles: f.store.clone(),
        drivers: f.store.clone(),
        clients: f.store.clone(),
    };
    let coordinator = SchedulingCoordinator::new(stores, f.clock.clone(), SchedulingConfig::default());
    let policy = RetryPolicy {
        max_attempts: 3,
        base_delay: std::time::Duration::from_millis(1),
        max_delay: std::time::Duration::from_millis(4),
    };

    let request = new_trip(&vehicle, &driver, &client, at(16, 8, 0, 0), at(16, 12, 0, 0));
    let trip = retry_transient(&policy, "create_trip", || coordinator.create_trip(request.clone()))
        .await
        .unwrap();

    assert!(replied.load(Ordering::SeqCst));
    assert_eq!(trip.id, request.id);
    assert_eq!(trip.status, TripStatus::Scheduled);
    assert_eq!(f.store.trip_count().await, 1);
}

#[tokio::test]
async fn test_reused_trip_id_for_another_booking_is_rejected() {
    let f = Fixture::new();
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    let request = new_trip(&vehicle, &driver, &client, at(17, 8, 0, 0), at(17, 10, 0, 0));
    let first = f.coordinator.create_trip(request.clone()).await.unwrap();

    let replay = f.coordinator.create_trip(request.clone()).await.unwrap();
    assert_eq!(replay, first);

    let mut other = new_trip(&vehicle, &driver, &client, at(17, 14, 0, 0), at(17, 16, 0, 0));
    other.id = request.id;
    let err = f.coordinator.create_trip(other).await.unwrap_err();
    assert_eq!(err, validation("id", ValidationReason::Duplicate));
    assert_eq!(f.store.trip_count().await, 1);
}

#[tokio::test]
async fn test_maintenance_record_makes_vehicle_bookable_again() {
    let f = Fixture::with_config(SchedulingConfig {
        status_policy: StatusFlagPolicy::Enforce,
        ..Default::default()
    });
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Maintenance).await;
    let driver = f.driver(0).await;
    let client = f.client().await;
    let request = new_trip(&vehicle, &driver, &client, at(18, 8, 0, 0), at(18, 10, 0, 0));

    let err = f.coordinator.create_trip(request.clone()).await.unwrap_err();
    assert_eq!(err, validation("vehicle_id", ValidationReason::NotBookable));

    let serviced = f.registry.record_vehicle_maintenance(vehicle.id).await.unwrap();
    assert_eq!(serviced.status, VehicleStatus::Available);
    assert_eq!(serviced.last_maintenance_on, Some(date(2025, 5, 1)));
    assert_eq!(serviced.next_maintenance_on, Some(date(2025, 11, 1)));

    let stored = f.registry.get_vehicle(vehicle.id).await.unwrap();
    assert_eq!(stored, serviced);
    assert_eq!(stored.updated_at, f.clock.now());

    assert!(f.coordinator.create_trip(request).await.is_ok());

    let missing = Uuid::new_v4();
    assert_eq!(
        f.registry.record_vehicle_maintenance(missing).await.unwrap_err(),
        SchedulingError::NotFound {
            entity: EntityKind::Vehicle,
            id: missing,
        }
    );
}

#[tokio::test]
async fn test_inactive_client_only_blocks_under_enforce_policy() {
    let f = Fixture::with_config(SchedulingConfig {
        status_policy: StatusFlagPolicy::Enforce,
        ..Default::default()
    });
    let vehicle = f.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = f.driver(0).await;
    let client = f.client().await;

    f.clock.advance(Duration::hours(2));
    let deactivated = f.registry.set_client_active(client.id, false).await.unwrap();
    assert!(!deactivated.active);
    let stored = f.registry.get_client(client.id).await.unwrap();
    assert!(!stored.active);
    assert_eq!(stored.updated_at, f.clock.now());

    let request = new_trip(&vehicle, &driver, &client, at(19, 8, 0, 0), at(19, 10, 0, 0));
    let err = f.coordinator.create_trip(request.clone()).await.unwrap_err();
    assert_eq!(err, validation("client_id", ValidationReason::NotBookable));

    f.registry.set_client_active(client.id, true).await.unwrap();
    assert!(f.coordinator.create_trip(request).await.is_ok());

    let advisory = Fixture::new();
    let vehicle = advisory.vehicle("ABC1234", VehicleStatus::Available).await;
    let driver = advisory.driver(0).await;
    let client = advisory.client().await;
    advisory.registry.set_client_active(client.id, false).await.unwrap();
    let booked = advisory
        .coordinator
        .create_trip(new_trip(&vehicle, &driver, &client, at(19, 8, 0, 0), at(19, 10, 0, 0)))
        .await;
    assert!(booked.is_ok());
}
