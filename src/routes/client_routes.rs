use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Json, Router,
};
use uuid::Uuid;

use crate::controllers::registry_controller::RegistryController;
use crate::dto::api_response::ApiResponse;
use crate::dto::registry_dto::{CreateClientRequest, UpdateClientStatusRequest};
use crate::models::client::Client;
use crate::state::AppState;
use crate::utils::errors::AppError;

pub fn create_client_router() -> Router<AppState> {
    Router::new()
        .route("/", post(create_client))
        .route("/:id", get(get_client))
        .route("/:id/status", put(update_client_status))
}

async fn create_client(
    State(state): State<AppState>,
    Json(request): Json<CreateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.create_client(request).await?;
    Ok(Json(response))
}

async fn get_client(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Client>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.get_client(id).await?;
    Ok(Json(response))
}

async fn update_client_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(request): Json<UpdateClientStatusRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let controller = RegistryController::new(&state);
    let response = controller.update_client_status(id, request).await?;
    Ok(Json(response))
}
