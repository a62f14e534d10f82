//! Programación de viajes de una flota de vehículos
//!
//! Valida, reserva y hace avanzar viajes que ocupan un vehículo y un
//! conductor durante un intervalo de tiempo, sin que dos viajes activos
//! compartan recurso en intervalos que se tocan.

pub mod config;
pub mod controllers;
pub mod database;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;
pub mod state;
pub mod utils;

use axum::Router;
use tower_http::trace::TraceLayer;

use crate::middleware::cors::cors_layer;
use crate::state::AppState;

/// Router completo con CORS y estado aplicados
pub fn build_app(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origins);
    routes::create_api_router()
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
