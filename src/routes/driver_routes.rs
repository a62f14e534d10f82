use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::availability_controller::AvailabilityController;
use crate::controllers::registry_controller::RegistryController;
use crate::dto::api_response::ApiResponse;
use crate::dto::availability_dto::AvailabilityQuery;
use crate::dto::registry_dto::CreateDriverRequest;
use crate::models::driver::Driver;
use crate::services::availability_service::Availability;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_driver_router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_drivers).post(create_driver))
        .route("/:id", get(get_driver))
        .route("/:id/availability", get(driver_availability))
}

async fn create_driver(
    State(state): State<AppState>,
    Json(request): Json<CreateDriverRequest>,
) -> Result<Json<ApiResponse<Driver>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.create_driver(request).await?;
    Ok(Json(response))
}

async fn list_drivers(State(state): State<AppState>) -> Result<Json<Vec<Driver>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.list_drivers().await?;
    Ok(Json(response))
}

async fn get_driver(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Driver>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.get_driver(id).await?;
    Ok(Json(response))
}

async fn driver_availability(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Availability>, AppError> {
    let controller = AvailabilityController::new(&state);
    let response = controller.check_driver(id, query).await?;
    Ok(Json(response))
}
