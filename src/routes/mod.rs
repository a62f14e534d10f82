//! Rutas HTTP
//!
//! Cada recurso expone su propio router; `create_api_router` los monta bajo `/api`.

pub mod availability_routes;
pub mod client_routes;
pub mod driver_routes;
pub mod trip_routes;
pub mod vehicle_routes;

use axum::{response::Json, routing::get, Router};
use serde_json::json;

use crate::state::AppState;

pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/api/trip", trip_routes::create_trip_router())
        .nest("/api/vehicle", vehicle_routes::create_vehicle_router())
        .nest("/api/driver", driver_routes::create_driver_router())
        .nest("/api/client", client_routes::create_client_router())
        .nest("/api/availability", availability_routes::create_availability_router())
}

async fn health() -> Json<serde_json::Value> {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}
