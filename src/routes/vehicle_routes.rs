use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::availability_controller::AvailabilityController;
use crate::controllers::registry_controller::RegistryController;
use crate::dto::api_response::ApiResponse;
use crate::dto::availability_dto::AvailabilityQuery;
use crate::dto::registry_dto::CreateVehicleRequest;
use crate::models::vehicle::Vehicle;
use crate::services::availability_service::Availability;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_vehicle_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_vehicles).post(create_vehicle))
        .route("/:id", get(get_vehicle))
        .route("/:id/availability", get(vehicle_availability))
        .route("/:id/maintenance", post(record_maintenance))
}

async fn create_vehicle(
    State(state): State<AppState>,
    Json(request): Json<CreateVehicleRequest>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.create_vehicle(request).await?;
    Ok(Json(response))
}

async fn list_vehicles(State(state): State<AppState>) -> Result<Json<Vec<Vehicle>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.list_vehicles().await?;
    Ok(Json(response))
}

async fn get_vehicle(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vehicle>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.get_vehicle(id).await?;
    Ok(Json(response))
}

async fn record_maintenance(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vehicle>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.record_maintenance(id).await?;
    Ok(Json(response))
}

async fn vehicle_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, AppError> {
    let controller = AvailabilityController::new(&state);
    let response = controller.check_vehicle(id, query).await?;
    Ok(Json(response))
}
