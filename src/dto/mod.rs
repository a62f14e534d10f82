//! Objetos de transferencia de la API HTTP

pub mod api_response;
pub mod availability_dto;
pub mod registry_dto;
pub mod trip_dto;

pub use api_response::ApiResponse;
