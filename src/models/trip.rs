//! Modelo de Trip
//!
//! Un viaje es la unidad de reserva: vincula un vehículo, un conductor y un
//! cliente durante el intervalo `[start_time, end_time]`.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::resource::{ResourceKind, ResourceRef};

/// Estado del viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

impl TripStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripStatus::Scheduled => "SCHEDULED",
            TripStatus::InProgress => "IN_PROGRESS",
            TripStatus::Completed => "COMPLETED",
            TripStatus::Cancelled => "CANCELLED",
        }
    }

    /// Una reserva activa es cualquier viaje no cancelado
    pub fn is_active(&self) -> bool {
        *self != TripStatus::Cancelled
    }
}

impl fmt::Display for TripStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TripStatus {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_uppercase().as_str() {
            "SCHEDULED" => Ok(TripStatus::Scheduled),
            "IN_PROGRESS" => Ok(TripStatus::InProgress),
            "COMPLETED" => Ok(TripStatus::Completed),
            "CANCELLED" => Ok(TripStatus::Cancelled),
            other => Err(format!("unknown trip status '{}'", other)),
        }
    }
}

/// Intervalo de tiempo `[start, end]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Solapamiento con límites inclusivos en ambos extremos.
    ///
    /// Tocar el otro intervalo en un único instante cuenta como solapamiento,
    /// igual que un intervalo que contiene estrictamente al otro.
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start <= other.end && other.start <= self.end
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}

/// Trip principal
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trip {
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub client_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub value: Decimal,
    pub status: TripStatus,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn window(&self) -> TimeWindow {
        TimeWindow::new(self.start_time, self.end_time)
    }

    pub fn resource_id(&self, kind: ResourceKind) -> Uuid {
        match kind {
            ResourceKind::Vehicle => self.vehicle_id,
            ResourceKind::Driver => self.driver_id,
        }
    }

    pub fn uses(&self, resource: ResourceRef) -> bool {
        self.resource_id(resource.kind) == resource.id
    }

    /// Indica si este viaje impide reservar `resource` durante `window`
    pub fn blocks(&self, resource: ResourceRef, window: &TimeWindow, exclude: Option<Uuid>) -> bool {
        if exclude == Some(self.id) {
            return false;
        }
        self.status.is_active() && self.uses(resource) && self.window().overlaps(window)
    }

    /// Misma reserva: recursos, cliente e intervalo coinciden
    pub fn same_booking(&self, other: &Trip) -> bool {
        self.vehicle_id == other.vehicle_id
            && self.driver_id == other.driver_id
            && self.client_id == other.client_id
            && self.window() == other.window()
    }
}

/// Datos para crear un viaje nuevo
#[derive(Debug, Clone)]
pub struct NewTrip {
    /// Fijado una sola vez por el llamador; un reintento con el mismo id no duplica
    pub id: Uuid,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub client_id: Uuid,
    pub origin: String,
    pub destination: String,
    pub window: TimeWindow,
    pub value: Decimal,
    pub notes: Option<String>,
    /// Estado sugerido por el llamador; siempre se ignora al crear
    pub requested_status: Option<TripStatus>,
}

/// Cambios parciales sobre un viaje existente
#[derive(Debug, Clone, Default)]
pub struct TripChanges {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub value: Option<Decimal>,
    pub notes: Option<String>,
}

impl TripChanges {
    /// Intervalo resultante de aplicar los cambios sobre `current`
    pub fn window_over(&self, current: &Trip) -> TimeWindow {
        TimeWindow::new(
            self.start_time.unwrap_or(current.start_time),
            self.end_time.unwrap_or(current.end_time),
        )
    }

    /// Verdadero si los cambios tocan el intervalo o los recursos asignados
    pub fn reschedules(&self, current: &Trip) -> bool {
        self.window_over(current) != current.window()
            || self.vehicle_id.map_or(false, |id| id != current.vehicle_id)
            || self.driver_id.map_or(false, |id| id != current.driver_id)
    }
}

pub const DEFAULT_PAGE_SIZE: i64 = 50;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Filtros para listado de viajes
#[derive(Debug, Clone, Default)]
pub struct TripFilter {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<TripStatus>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl TripFilter {
    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
    }

    pub fn offset(&self) -> i64 {
        self.offset.unwrap_or(0).max(0)
    }

    pub fn matches(&self, trip: &Trip) -> bool {
        self.vehicle_id.map_or(true, |id| trip.vehicle_id == id)
            && self.driver_id.map_or(true, |id| trip.driver_id == id)
            && self.client_id.map_or(true, |id| trip.client_id == id)
            && self.status.map_or(true, |status| trip.status == status)
    }
}
