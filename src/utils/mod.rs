//! Utilidades del sistema
//!
//! Manejo de errores, validación, reloj y reintentos.

pub mod clock;
pub mod errors;
pub mod retry;
pub mod validation;
