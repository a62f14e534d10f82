//! Modelo de Driver

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::errors::ValidationError;
use crate::utils::validation::{
    validate_birth_date, validate_email, validate_license_expiry, validate_license_number,
    normalize_document, validate_national_id, validate_phone, validate_required,
};

/// Categoría de licencia de conducir
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LicenseCategory {
    A,
    B,
    C,
    D,
    E,
}

impl LicenseCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            LicenseCategory::A => "A",
            LicenseCategory::B => "B",
            LicenseCategory::C => "C",
            LicenseCategory::D => "D",
            LicenseCategory::E => "E",
        }
    }
}

impl FromStr for LicenseCategory {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "A" => Ok(LicenseCategory::A),
            "B" => Ok(LicenseCategory::B),
            "C" => Ok(LicenseCategory::C),
            "D" => Ok(LicenseCategory::D),
            "E" => Ok(LicenseCategory::E),
            other => Err(format!("unknown license category '{}'", other)),
        }
    }
}

/// Estado administrativo del conductor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DriverStatus {
    Available,
    OnTrip,
    OffDuty,
    Inactive,
}

impl DriverStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            DriverStatus::Available => "AVAILABLE",
            DriverStatus::OnTrip => "ON_TRIP",
            DriverStatus::OffDuty => "OFF_DUTY",
            DriverStatus::Inactive => "INACTIVE",
        }
    }
}

impl fmt::Display for DriverStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DriverStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "AVAILABLE" => Ok(DriverStatus::Available),
            "ON_TRIP" => Ok(DriverStatus::OnTrip),
            "OFF_DUTY" => Ok(DriverStatus::OffDuty),
            "INACTIVE" => Ok(DriverStatus::Inactive),
            other => Err(format!("unknown driver status '{}'", other)),
        }
    }
}

/// Driver principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub national_id: String,
    pub birth_date: NaiveDate,
    pub email: Option<String>,
    pub phone: String,
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expires_on: NaiveDate,
    pub status: DriverStatus,
    /// Banco de horas en minutos
    pub overtime_minutes: i32,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Driver {
    /// Validación de registro: documentos, contacto, edad y licencia vigente
    pub fn validate(&self, today: NaiveDate) -> Result<(), ValidationError> {
        validate_required("name", &self.name)?;
        validate_national_id(&self.national_id)?;
        validate_license_number(&self.license_number)?;
        validate_phone(&self.phone)?;
        if let Some(email) = &self.email {
            validate_email(email)?;
        }
        validate_birth_date(self.birth_date, today)?;
        validate_license_expiry(self.license_expires_on, today)?;
        Ok(())
    }

    /// La licencia cubre el día indicado (el día de vencimiento incluido)
    pub fn license_valid_on(&self, date: NaiveDate) -> bool {
        date <= self.license_expires_on
    }

    pub fn status_allows_booking(&self) -> bool {
        !matches!(self.status, DriverStatus::OffDuty | DriverStatus::Inactive)
    }

    pub fn set_status(&mut self, status: DriverStatus, now: DateTime<Utc>) {
        self.status = status;
        self.updated_at = now;
    }

    /// Guarda CPF y CNH en su forma canónica para que la unicidad no dependa del formato
    pub fn normalize_documents(&mut self) {
        self.national_id = normalize_document(&self.national_id);
        self.license_number = normalize_document(&self.license_number);
    }
}
