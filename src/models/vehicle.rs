//! Modelo de Vehicle
//!
//! El estado del vehículo es un indicador administrativo grueso. La respuesta
//! autoritativa sobre si está libre en un intervalo la da el verificador de
//! disponibilidad recorriendo los viajes, no este campo.

use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::ValidationError;
use crate::utils::validation::{
    validate_capacity, validate_plate, validate_required, validate_vehicle_year,
};

/// Meses entre mantenimientos programados
pub const MAINTENANCE_INTERVAL_MONTHS: u32 = 6;

/// Tipo de vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleType {
    Van,
    Bus,
    Microbus,
}

impl VehicleType {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleType::Van => "VAN",
            VehicleType::Bus => "BUS",
            VehicleType::Microbus => "MICROBUS",
        }
    }
}

impl FromStr for VehicleType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "VAN" => Ok(VehicleType::Van),
            "BUS" => Ok(VehicleType::Bus),
            "MICROBUS" => Ok(VehicleType::Microbus),
            other => Err(format!("unknown vehicle type '{}'", other)),
        }
    }
}

/// Estado administrativo del vehículo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VehicleStatus {
    Available,
    InUse,
    Maintenance,
    Inactive,
}

impl VehicleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VehicleStatus::Available => "AVAILABLE",
            VehicleStatus::InUse => "IN_USE",
            VehicleStatus::Maintenance => "MAINTENANCE",
            VehicleStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for VehicleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VehicleStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(VehicleStatus::Available),
            "IN_USE" => Ok(VehicleStatus::InUse),
            "MAINTENANCE" => Ok(VehicleStatus::Maintenance),
            "INACTIVE" => Ok(VehicleStatus::Inactive),
            other => Err(format!("unknown vehicle status '{}'", other)),
        }
    }
}

/// Vehicle principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: Uuid,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub vehicle_type: VehicleType,
    pub capacity: i32,
    pub status: VehicleStatus,
    pub chassis: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub documents_valid: bool,
    pub documents_expire_on: NaiveDate,
    pub last_maintenance_on: Option<NaiveDate>,
    pub next_maintenance_on: Option<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Vehicle {
    /// Validación de registro
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_plate(&self.plate)?;
        validate_required("brand", &self.brand)?;
        validate_required("model", &self.model)?;
        validate_vehicle_year(self.year, today)?;
        validate_capacity(self.capacity)?;
        Ok(())
    }

    pub fn documents_expired(&self, today: NaiveDate) -> bool {
        !self.documents_valid || self.documents_expire_on < today
    }

    /// Indicador administrativo: no dice nada sobre intervalos concretos
    pub fn status_allows_booking(&self) -> bool {
        !matches!(self.status, VehicleStatus::Maintenance | VehicleStatus::Inactive)
    }

    pub fn set_status(&mut self, status: VehicleStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Registra un mantenimiento y programa el siguiente
    pub fn register_maintenance(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        self.last_maintenance_on = Some(today);
        self.next_maintenance_on = today.checked_add_months(Months::new(MAINTENANCE_INTERVAL_MONTHS));
        self.status = VehicleStatus::Available;
        self.updated_at = now;
    }
}
