//! Configuración del proyecto
//!
//! Variables de entorno del proceso, pool de base de datos y parámetros
//! del núcleo de planificación.

pub mod database;
pub mod environment;
pub mod scheduling;

pub use database::DatabaseConfig;
pub use environment::EnvironmentConfig;
pub use scheduling::{RetryPolicy, SchedulingConfig, StatusFlagPolicy};
