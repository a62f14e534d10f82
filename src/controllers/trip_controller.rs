use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::config::scheduling::RetryPolicy;
use crate::dto::api_response::ApiResponse;
use crate::dto::trip_dto::{CreateTripRequest, TripListQuery, UpdateTripRequest};
use crate::models::trip::{NewTrip, Trip, TripChanges, TripFilter};
use crate::services::scheduling_service::SchedulingCoordinator;
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::retry::retry_transient;

pub struct TripController {
    coordinator: Arc<SchedulingCoordinator>,
    retry: RetryPolicy,
}

impl TripController {
    pub fn new(state: &AppState) -> Self {
        Self {
            coordinator: state.coordinator.clone(),
            retry: state.retry.clone(),
        }
    }

    pub async fn create(&self, request: CreateTripRequest) -> Result<ApiResponse<Trip>, AppError> {
        request.validate()?;
        let new_trip = NewTrip::from(request);

        let trip = retry_transient(&self.retry, "create_trip", || {
            self.coordinator.create_trip(new_trip.clone())
        })
        .await?;

        Ok(ApiResponse::success_with_message(
            trip,
            "Viaje reservado exitosamente".to_string(),
        ))
    }

    pub async fn update(
        &self,
        id: Uuid,
        request: UpdateTripRequest,
    ) -> Result<ApiResponse<Trip>, AppError> {
        request.validate()?;
        let changes = TripChanges::from(request);

        let trip = retry_transient(&self.retry, "update_trip", || {
            self.coordinator.update_trip(id, changes.clone())
        })
        .await?;

        Ok(ApiResponse::success_with_message(
            trip,
            "Viaje actualizado exitosamente".to_string(),
        ))
    }

    pub async fn cancel(&self, id: Uuid) -> Result<ApiResponse<Trip>, AppError> {
        let trip = retry_transient(&self.retry, "cancel_trip", || self.coordinator.cancel_trip(id)).await?;
        Ok(ApiResponse::success_with_message(trip, "Viaje cancelado".to_string()))
    }

    pub async fn start(&self, id: Uuid) -> Result<ApiResponse<Trip>, AppError> {
        let trip = retry_transient(&self.retry, "start_trip", || self.coordinator.start_trip(id)).await?;
        Ok(ApiResponse::success_with_message(trip, "Viaje iniciado".to_string()))
    }

    pub async fn complete(&self, id: Uuid) -> Result<ApiResponse<Trip>, AppError> {
        let trip =
            retry_transient(&self.retry, "complete_trip", || self.coordinator.complete_trip(id)).await?;
        Ok(ApiResponse::success_with_message(trip, "Viaje finalizado".to_string()))
    }

    pub async fn get_by_id(&self, id: Uuid) -> Result<Trip, AppError> {
        Ok(self.coordinator.get_trip(id).await?)
    }

    pub async fn list(&self, query: TripListQuery) -> Result<Vec<Trip>, AppError> {
        let filter = TripFilter::from(query);
        let trips = retry_transient(&self.retry, "list_trips", || self.coordinator.list_trips(&filter)).await?;
        Ok(trips)
    }
}
