use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::dto::api_response::ApiResponse;
use crate::dto::registry_dto::{
    CreateClientRequest, CreateDriverRequest, CreateVehicleRequest, UpdateClientStatusRequest,
};
use crate::models::client::Client;
use crate::models::driver::Driver;
use crate::models::vehicle::Vehicle;
use crate::services::registry_service::RegistryService;
use crate::state::AppState;
use crate::utils::clock::Clock;
use crate::utils::errors::AppError;

pub struct RegistryController {
    registry: Arc<RegistryService>,
    clock: Arc<dyn Clock>,
}

impl RegistryController {
    pub fn new(state: &AppState) -> Self {
        Self {
            registry: state.registry.clone(),
            clock: state.clock.clone(),
        }
    }

    pub async fn create_vehicle(
        &self,
        request: CreateVehicleRequest,
    ) -> Result<ApiResponse<Vehicle>, AppError> {
        request.validate()?;
        let vehicle = request.into_vehicle(Uuid::new_v4(), self.clock.now());
        let vehicle = self.registry.register_vehicle(vehicle).await?;
        Ok(ApiResponse::success_with_message(
            vehicle,
            "Vehículo registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_vehicle(&self, id: Uuid) -> Result<Vehicle, AppError> {
        Ok(self.registry.get_vehicle(id).await?)
    }

    pub async fn record_maintenance(&self, id: Uuid) -> Result<ApiResponse<Vehicle>, AppError> {
        let vehicle = self.registry.record_vehicle_maintenance(id).await?;
        Ok(ApiResponse::success_with_message(
            vehicle,
            "Mantenimiento registrado".to_string(),
        ))
    }

    pub async fn list_vehicles(&self) -> Result<Vec<Vehicle>, AppError> {
        Ok(self.registry.list_vehicles().await?)
    }

    pub async fn create_driver(
        &self,
        request: CreateDriverRequest,
    ) -> Result<ApiResponse<Driver>, AppError> {
        request.validate()?;
        let driver = request.into_driver(Uuid::new_v4(), self.clock.now());
        let driver = self.registry.register_driver(driver).await?;
        Ok(ApiResponse::success_with_message(
            driver,
            "Conductor registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_driver(&self, id: Uuid) -> Result<Driver, AppError> {
        Ok(self.registry.get_driver(id).await?)
    }

    pub async fn list_drivers(&self) -> Result<Vec<Driver>, AppError> {
        Ok(self.registry.list_drivers().await?)
    }

    pub async fn create_client(
        &self,
        request: CreateClientRequest,
    ) -> Result<ApiResponse<Client>, AppError> {
        request.validate()?;
        let client = request.into_client(Uuid::new_v4(), self.clock.now());
        let client = self.registry.register_client(client).await?;
        Ok(ApiResponse::success_with_message(
            client,
            "Cliente registrado exitosamente".to_string(),
        ))
    }

    pub async fn get_client(&self, id: Uuid) -> Result<Client, AppError> {
        Ok(self.registry.get_client(id).await?)
    }

    pub async fn update_client_status(
        &self,
        id: Uuid,
        request: UpdateClientStatusRequest,
    ) -> Result<ApiResponse<Client>, AppError> {
        let client = self.registry.set_client_active(id, request.active).await?;
        Ok(ApiResponse::success(client))
    }
}
