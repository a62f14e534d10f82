//! Modelos del sistema
//!
//! Entidades de dominio del núcleo de planificación. Los nombres de columna
//! de PostgreSQL viven en los repositorios, no aquí.

pub mod client;
pub mod driver;
pub mod resource;
pub mod trip;
pub mod vehicle;

pub use client::{Address, Client, ClientKind};
pub use driver::{Driver, DriverStatus, LicenseCategory};
pub use resource::{EntityKind, ResourceKind, ResourceRef};
pub use trip::{NewTrip, TimeWindow, Trip, TripChanges, TripFilter, TripStatus};
pub use vehicle::{Vehicle, VehicleStatus, VehicleType};
