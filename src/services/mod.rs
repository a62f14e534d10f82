//! Services module
//!
//! Lógica de negocio: validación, disponibilidad, ciclo de vida del viaje y
//! el coordinador que los combina en una unidad atómica.

pub mod availability_service;
pub mod registry_service;
pub mod scheduling_service;
pub mod trip_lifecycle;

pub use availability_service::{Availability, AvailabilityChecker, AvailabilityService};
pub use registry_service::RegistryService;
pub use scheduling_service::SchedulingCoordinator;
pub use trip_lifecycle::{TripEvent, TripLifecycle};
