//! Sistema de manejo de errores
//!
//! Este módulo define los errores del núcleo de planificación
//! y su conversión a respuestas HTTP apropiadas.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::json;
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

use crate::models::resource::{EntityKind, ResourceKind};
use crate::models::trip::TripStatus;

/// Motivo concreto de un fallo de validación
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationReason {
    Required,
    InvalidFormat,
    InvalidChecksum,
    OutOfRange,
    NonPositive,
    EmptyInterval,
    StartInPast,
    IntervalTooLong,
    Expired,
    NotBookable,
    NotReschedulable,
    Duplicate,
}

impl fmt::Display for ValidationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ValidationReason::Required => "value is required",
            ValidationReason::InvalidFormat => "invalid format",
            ValidationReason::InvalidChecksum => "invalid check digits",
            ValidationReason::OutOfRange => "value out of range",
            ValidationReason::NonPositive => "value must be greater than zero",
            ValidationReason::EmptyInterval => "interval start must precede its end",
            ValidationReason::StartInPast => "interval cannot start in the past",
            ValidationReason::IntervalTooLong => "interval exceeds the maximum span",
            ValidationReason::Expired => "document is expired",
            ValidationReason::NotBookable => "resource is not bookable in its current status",
            ValidationReason::NotReschedulable => "trip can no longer be rescheduled",
            ValidationReason::Duplicate => "value is already registered",
        };
        f.write_str(text)
    }
}

/// Error de validación sobre un campo concreto
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("invalid `{field}`: {reason}")]
pub struct ValidationError {
    pub field: String,
    pub reason: ValidationReason,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, reason: ValidationReason) -> Self {
        Self {
            field: field.into(),
            reason,
        }
    }

    /// Reasigna el campo, útil cuando un validador genérico se aplica a otro campo
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = field.into();
        self
    }
}

/// Errores del colaborador de persistencia
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StorageError {
    #[error("storage operation timed out")]
    Timeout,

    #[error("storage connection lost: {0}")]
    ConnectionLost(String),

    #[error("transaction could not be serialized: {0}")]
    SerializationFailure(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("corrupted record: {0}")]
    Corrupted(String),

    /// Restricción de unicidad violada; lleva la columna afectada
    #[error("unique constraint violated on {0}")]
    UniqueViolation(String),
}

impl StorageError {
    /// Fallos transitorios que el llamador puede reintentar
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Timeout
                | StorageError::ConnectionLost(_)
                | StorageError::SerializationFailure(_)
        )
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(error: sqlx::Error) -> Self {
        match error {
            sqlx::Error::PoolTimedOut => StorageError::Timeout,
            sqlx::Error::Io(e) => StorageError::ConnectionLost(e.to_string()),
            sqlx::Error::PoolClosed => StorageError::ConnectionLost("pool closed".to_string()),
            sqlx::Error::WorkerCrashed => {
                StorageError::ConnectionLost("connection worker crashed".to_string())
            }
            sqlx::Error::Database(db) => match db.code().as_deref() {
                // serialization_failure / deadlock_detected
                Some("40001") | Some("40P01") => {
                    StorageError::SerializationFailure(db.message().to_string())
                }
                // lock_not_available / query_canceled
                Some("55P03") | Some("57014") => StorageError::Timeout,
                Some("23505") => StorageError::UniqueViolation(
                    db.constraint().unwrap_or("unique").to_string(),
                ),
                _ => StorageError::Database(db.message().to_string()),
            },
            sqlx::Error::ColumnDecode { .. } | sqlx::Error::Decode(_) => {
                StorageError::Corrupted(error.to_string())
            }
            other => StorageError::Database(other.to_string()),
        }
    }
}

/// Errores de las operaciones de planificación
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulingError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} already has an active reservation overlapping the requested interval")]
    ResourceConflict {
        kind: ResourceKind,
        conflicting_trip_ids: Vec<Uuid>,
    },

    #[error("{entity} with id '{id}' not found")]
    NotFound { entity: EntityKind, id: Uuid },

    #[error("illegal trip transition from {from} to {to}")]
    IllegalTransition { from: TripStatus, to: TripStatus },

    #[error(transparent)]
    Storage(StorageError),
}

impl From<StorageError> for SchedulingError {
    fn from(error: StorageError) -> Self {
        match error {
            StorageError::UniqueViolation(field) => {
                SchedulingError::Validation(ValidationError::new(field, ValidationReason::Duplicate))
            }
            other => SchedulingError::Storage(other),
        }
    }
}

impl SchedulingError {
    pub fn not_found(entity: EntityKind, id: Uuid) -> Self {
        SchedulingError::NotFound { entity, id }
    }

    /// Solo los fallos transitorios de almacenamiento admiten reintento
    pub fn is_retryable(&self) -> bool {
        matches!(self, SchedulingError::Storage(e) if e.is_transient())
    }

    /// Código estable para clientes de la API
    pub fn code(&self) -> &'static str {
        match self {
            SchedulingError::Validation(_) => "VALIDATION_ERROR",
            SchedulingError::ResourceConflict { .. } => "RESOURCE_CONFLICT",
            SchedulingError::NotFound { .. } => "NOT_FOUND",
            SchedulingError::IllegalTransition { .. } => "ILLEGAL_TRANSITION",
            SchedulingError::Storage(e) if e.is_transient() => "STORAGE_UNAVAILABLE",
            SchedulingError::Storage(_) => "STORAGE_ERROR",
        }
    }
}

/// Errores de la capa HTTP
#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Scheduling(#[from] SchedulingError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),
}

/// Respuesta de error para la API
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    code: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_response) = match self {
            AppError::Scheduling(e) => scheduling_response(e),

            AppError::Validation(e) => {
                log::warn!("⚠️ Validation error: {}", e);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorResponse {
                        error: "Validation Error".to_string(),
                        message: "The provided data is invalid".to_string(),
                        details: Some(json!(e)),
                        code: Some("VALIDATION_ERROR".to_string()),
                    },
                )
            }
        };

        (status, Json(error_response)).into_response()
    }
}

fn scheduling_response(error: SchedulingError) -> (StatusCode, ErrorResponse) {
    let code = Some(error.code().to_string());
    let message = error.to_string();

    match error {
        SchedulingError::Validation(v) => (
            StatusCode::BAD_REQUEST,
            ErrorResponse {
                error: "Validation Error".to_string(),
                message,
                details: Some(json!({ "field": v.field, "reason": v.reason })),
                code,
            },
        ),
        SchedulingError::ResourceConflict {
            kind,
            conflicting_trip_ids,
        } => (
            StatusCode::CONFLICT,
            ErrorResponse {
                error: "Resource Conflict".to_string(),
                message,
                details: Some(json!({
                    "resource": kind,
                    "conflicting_trip_ids": conflicting_trip_ids,
                })),
                code,
            },
        ),
        SchedulingError::NotFound { entity, id } => (
            StatusCode::NOT_FOUND,
            ErrorResponse {
                error: "Not Found".to_string(),
                message,
                details: Some(json!({ "entity": entity, "id": id })),
                code,
            },
        ),
        SchedulingError::IllegalTransition { from, to } => (
            StatusCode::CONFLICT,
            ErrorResponse {
                error: "Illegal Transition".to_string(),
                message,
                details: Some(json!({ "from": from, "to": to })),
                code,
            },
        ),
        SchedulingError::Storage(e) => {
            log::error!("❌ Storage error: {}", e);
            let status = if e.is_transient() {
                StatusCode::SERVICE_UNAVAILABLE
            } else {
                StatusCode::INTERNAL_SERVER_ERROR
            };
            (
                status,
                ErrorResponse {
                    error: "Storage Error".to_string(),
                    message: "The reservation store is not available".to_string(),
                    details: None,
                    code,
                },
            )
        }
    }
}

/// Resultado de las operaciones del núcleo
pub type SchedulingResult<T> = Result<T, SchedulingError>;
