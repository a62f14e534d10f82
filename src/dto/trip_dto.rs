use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use crate::models::trip::{NewTrip, TimeWindow, TripChanges, TripFilter, TripStatus};

// Request para reservar un viaje
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTripRequest {
    /// Opcional; permite reenviar la misma reserva sin duplicarla
    pub id: Option<Uuid>,
    pub vehicle_id: Uuid,
    pub driver_id: Uuid,
    pub client_id: Uuid,

    #[validate(length(min = 1, max = 255))]
    pub origin: String,

    #[validate(length(min = 1, max = 255))]
    pub destination: String,

    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub value: Decimal,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,

    /// Se acepta por compatibilidad y se ignora
    pub status: Option<TripStatus>,
}

impl From<CreateTripRequest> for NewTrip {
    fn from(request: CreateTripRequest) -> Self {
        NewTrip {
            id: request.id.unwrap_or_else(Uuid::new_v4),
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            client_id: request.client_id,
            origin: request.origin,
            destination: request.destination,
            window: TimeWindow::new(request.start_time, request.end_time),
            value: request.value,
            notes: request.notes,
            requested_status: request.status,
        }
    }
}

// Request para actualizar un viaje
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateTripRequest {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,

    #[validate(length(min = 1, max = 255))]
    pub origin: Option<String>,

    #[validate(length(min = 1, max = 255))]
    pub destination: Option<String>,

    pub start_time: Option<DateTime<Utc>>,
    pub end_time: Option<DateTime<Utc>>,
    pub value: Option<Decimal>,

    #[validate(length(max = 1000))]
    pub notes: Option<String>,
}

impl From<UpdateTripRequest> for TripChanges {
    fn from(request: UpdateTripRequest) -> Self {
        TripChanges {
            vehicle_id: request.vehicle_id,
            driver_id: request.driver_id,
            origin: request.origin,
            destination: request.destination,
            start_time: request.start_time,
            end_time: request.end_time,
            value: request.value,
            notes: request.notes,
        }
    }
}

// Filtros del listado (query string)
#[derive(Debug, Default, Deserialize)]
pub struct TripListQuery {
    pub vehicle_id: Option<Uuid>,
    pub driver_id: Option<Uuid>,
    pub client_id: Option<Uuid>,
    pub status: Option<TripStatus>,
    pub offset: Option<i64>,
    pub limit: Option<i64>,
}

impl From<TripListQuery> for TripFilter {
    fn from(query: TripListQuery) -> Self {
        TripFilter {
            vehicle_id: query.vehicle_id,
            driver_id: query.driver_id,
            client_id: query.client_id,
            status: query.status,
            offset: query.offset,
            limit: query.limit,
        }
    }
}
