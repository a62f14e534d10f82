use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};

use crate::controllers::availability_controller::AvailabilityController;
use crate::dto::availability_dto::{
    AvailabilityQuery, AvailableDriverResponse, AvailableVehicleResponse,
};
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_availability_router() -> Router<AppState> {
    Router::new()
        .route("/vehicles", get(available_vehicles))
        .route("/drivers", get(available_drivers))
}

async fn available_vehicles(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailableVehicleResponse>>, AppError> {
    let controller = AvailabilityController::new(&state);
    let response = controller.available_vehicles(query).await?;
    Ok(Json(response))
}

async fn available_drivers(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> Result<Json<Vec<AvailableDriverResponse>>, AppError> {
    let controller = AvailabilityController::new(&state);
    let response = controller.available_drivers(query).await?;
    Ok(Json(response))
}
