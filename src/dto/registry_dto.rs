use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::client::{Address, Client, ClientKind};
use crate::models::driver::{Driver, DriverStatus, LicenseCategory};
use crate::models::vehicle::{Vehicle, VehicleStatus, VehicleType};

// Request para registrar un vehículo
#[derive(Debug, Deserialize, Validate)]
pub struct CreateVehicleRequest {
    #[validate(length(equal = 7))]
    pub plate: String,

    #[validate(length(min = 1, max = 100))]
    pub brand: String,

    #[validate(length(min = 1, max = 100))]
    pub model: String,

    pub year: i32,
    pub vehicle_type: VehicleType,

    #[validate(range(min = 1, max = 100))]
    pub capacity: i32,

    pub chassis: Option<String>,
    pub color: Option<String>,
    pub notes: Option<String>,
    pub documents_valid: Option<bool>,
    pub documents_expire_on: NaiveDate,
}

impl CreateVehicleRequest {
    pub fn into_vehicle(self, id: Uuid, now: DateTime<Utc>) -> Vehicle {
        Vehicle {
            id,
            plate: self.plate.to_ascii_uppercase(),
            brand: self.brand,
            model: self.model,
            year: self.year,
            vehicle_type: self.vehicle_type,
            capacity: self.capacity,
            status: VehicleStatus::Available,
            chassis: self.chassis,
            color: self.color,
            notes: self.notes,
            documents_valid: self.documents_valid.unwrap_or(true),
            documents_expire_on: self.documents_expire_on,
            last_maintenance_on: None,
            next_maintenance_on: None,
            created_at: now,
            updated_at: now,
        }
    }
}

// Request para registrar un conductor
#[derive(Debug, Deserialize, Validate)]
pub struct CreateDriverRequest {
    #[validate(length(min = 2, max = 150))]
    pub name: String,

    pub national_id: String,
    pub birth_date: NaiveDate,

    #[validate(email)]
    pub email: Option<String>,

    pub phone: String,
    pub license_number: String,
    pub license_category: LicenseCategory,
    pub license_expires_on: NaiveDate,
    pub notes: Option<String>,
}

impl CreateDriverRequest {
    pub fn into_driver(self, id: Uuid, now: DateTime<Utc>) -> Driver {
        Driver {
            id,
            name: self.name,
            national_id: self.national_id,
            birth_date: self.birth_date,
            email: self.email,
            phone: self.phone,
            license_number: self.license_number,
            license_category: self.license_category,
            license_expires_on: self.license_expires_on,
            status: DriverStatus::Available,
            overtime_minutes: 0,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

// Request para registrar un cliente
#[derive(Debug, Deserialize, Validate)]
pub struct CreateClientRequest {
    pub kind: ClientKind,

    #[validate(length(min = 2, max = 150))]
    pub name: String,

    #[validate(length(min = 1, max = 18))]
    pub tax_id: String,
    pub birth_date: Option<NaiveDate>,

    #[validate(email)]
    pub email: Option<String>,

    pub phone: String,
    pub mobile: Option<String>,

    #[serde(default)]
    pub address: Address,

    pub notes: Option<String>,
    pub credit_limit: Option<Decimal>,
}

impl CreateClientRequest {
    pub fn into_client(self, id: Uuid, now: DateTime<Utc>) -> Client {
        Client {
            id,
            kind: self.kind,
            name: self.name,
            tax_id: self.tax_id,
            birth_date: self.birth_date,
            email: self.email,
            phone: self.phone,
            mobile: self.mobile,
            address: self.address,
            notes: self.notes,
            credit_limit: self.credit_limit.unwrap_or(Decimal::ZERO),
            active: true,
            created_at: now,
            updated_at: now,
        }
    }
}

// Request para activar o desactivar un cliente
#[derive(Debug, Deserialize)]
pub struct UpdateClientStatusRequest {
    pub active: bool,
}
