use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::driver::Driver;
use crate::models::trip::TimeWindow;
use crate::models::vehicle::Vehicle;

// Intervalo consultado (query string)
#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl AvailabilityQuery {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }
}

// Resumen de un vehículo libre
#[derive(Debug, Serialize)]
pub struct AvailableVehicleResponse {
    pub id: Uuid,
    pub plate: String,
    pub brand: String,
    pub model: String,
    pub capacity: i32,
}

impl From<Vehicle> for AvailableVehicleResponse {
    fn from(vehicle: Vehicle) -> Self {
        Self {
            id: vehicle.id,
            plate: vehicle.plate,
            brand: vehicle.brand,
            model: vehicle.model,
            capacity: vehicle.capacity,
        }
    }
}

// Resumen de un conductor libre
#[derive(Debug, Serialize)]
pub struct AvailableDriverResponse {
    pub id: Uuid,
    pub name: String,
    pub phone: String,
    pub license_category: String,
}

impl From<Driver> for AvailableDriverResponse {
    fn from(driver: Driver) -> Self {
        Self {
            id: driver.id,
            name: driver.name,
            phone: driver.phone,
            license_category: driver.license_category.as_str().to_string(),
        }
    }
}
