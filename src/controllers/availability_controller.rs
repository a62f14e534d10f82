use std::sync::Arc;
use uuid::Uuid;

use crate::config::scheduling::RetryPolicy;
use crate::dto::availability_dto::{
    AvailabilityQuery, AvailableDriverResponse, AvailableVehicleResponse,
};
use crate::models::resource::ResourceRef;
use crate::services::availability_service::{Availability, AvailabilityService};
use crate::state::AppState;
use crate::utils::errors::AppError;
use crate::utils::retry::retry_transient;

pub struct AvailabilityController {
    service: Arc<AvailabilityService>,
    retry: RetryPolicy,
}

impl AvailabilityController {
    pub fn new(state: &AppState) -> Self {
        Self {
            service: state.availability.clone(),
            retry: state.retry.clone(),
        }
    }

    pub async fn check(
        &self,
        resource: ResourceRef,
        query: AvailabilityQuery,
    ) -> Result<Availability, AppError> {
        let window = query.window();
        let availability = retry_transient(&self.retry, "check_availability", || {
            self.service.query(resource, window)
        })
        .await?;
        Ok(availability)
    }

    pub async fn check_vehicle(&self, id: Uuid, query: AvailabilityQuery) -> Result<Availability, AppError> {
        self.check(ResourceRef::vehicle(id), query).await
    }

    pub async fn check_driver(&self, id: Uuid, query: AvailabilityQuery) -> Result<Availability, AppError> {
        self.check(ResourceRef::driver(id), query).await
    }

    pub async fn available_vehicles(
        &self,
        query: AvailabilityQuery,
    ) -> Result<Vec<AvailableVehicleResponse>, AppError> {
        let window = query.window();
        let vehicles = retry_transient(&self.retry, "available_vehicles", || {
            self.service.available_vehicles(window)
        })
        .await?;
        Ok(vehicles.into_iter().map(AvailableVehicleResponse::from).collect())
    }

    pub async fn available_drivers(
        &self,
        query: AvailabilityQuery,
    ) -> Result<Vec<AvailableDriverResponse>, AppError> {
        let window = query.window();
        let drivers = retry_transient(&self.retry, "available_drivers", || {
            self.service.available_drivers(window)
        })
        .await?;
        Ok(drivers.into_iter().map(AvailableDriverResponse::from).collect())
    }
}
