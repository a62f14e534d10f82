//! Utilidades de validación
//!
//! Validadores puros para documentos (dígitos verificadores módulo 11),
//! formatos y reglas de negocio. Ninguno lee el reloj del sistema: el
//! instante de referencia siempre llega como parámetro.

use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};
use lazy_static::lazy_static;
use num_traits::Zero;
use regex::Regex;

use crate::models::driver::LicenseCategory;
use crate::models::trip::TimeWindow;
use crate::utils::errors::{ValidationError, ValidationReason};

pub const DOCUMENT_LENGTH: usize = 11;
pub const MIN_DRIVER_AGE: i32 = 18;
pub const MAX_DRIVER_AGE: i32 = 70;
pub const MIN_VEHICLE_YEAR: i32 = 1900;
pub const MIN_CAPACITY: i32 = 1;
pub const MAX_CAPACITY: i32 = 100;
pub const DEFAULT_MAX_QUERY_SPAN_DAYS: i64 = 30;

lazy_static! {
    // Formato antiguo (ABC1234) y Mercosur (ABC1D23)
    static ref PLATE_REGEX: Regex = Regex::new(r"^[A-Z]{3}[0-9][A-Z0-9][0-9]{2}$").unwrap();
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap();
}

/// Forma canónica de un documento: sólo dígitos, sin separadores de formato.
/// Los caracteres no numéricos se conservan para que la validación los rechace.
pub fn normalize_document(value: &str) -> String {
    value
        .chars()
        .filter(|c| !matches!(c, '.' | '-' | '/') && !c.is_whitespace())
        .collect()
}

/// Extrae los 11 dígitos de un documento, admitiendo separadores de formato
fn document_digits(field: &str, value: &str) -> Result<Vec<u32>, ValidationError> {
    let mut digits = Vec::with_capacity(DOCUMENT_LENGTH);
    for c in value.chars() {
        match c {
            '.' | '-' | '/' => continue,
            c if c.is_whitespace() => continue,
            c => match c.to_digit(10) {
                Some(d) => digits.push(d),
                None => return Err(ValidationError::new(field, ValidationReason::InvalidFormat)),
            },
        }
    }

    if digits.len() != DOCUMENT_LENGTH {
        return Err(ValidationError::new(field, ValidationReason::InvalidFormat));
    }

    // 000.000.000-00, 111.111.111-11... cumplen la aritmética pero nunca son válidos
    if digits.iter().all(|d| *d == digits[0]) {
        return Err(ValidationError::new(field, ValidationReason::InvalidChecksum));
    }

    Ok(digits)
}

/// Dígito verificador módulo 11 con pesos descendentes desde `first_weight`
fn mod11_check_digit(digits: &[u32], first_weight: u32) -> u32 {
    let sum: u32 = digits
        .iter()
        .zip((1..=first_weight).rev())
        .map(|(digit, weight)| digit * weight)
        .sum();
    let remainder = sum % 11;
    if remainder < 2 {
        0
    } else {
        11 - remainder
    }
}

fn verify_document(
    field: &str,
    value: &str,
    first_weights: (u32, u32),
) -> Result<(), ValidationError> {
    let digits = document_digits(field, value)?;

    let first = mod11_check_digit(&digits[..9], first_weights.0);
    if first != digits[9] {
        return Err(ValidationError::new(field, ValidationReason::InvalidChecksum));
    }

    let second = mod11_check_digit(&digits[..10], first_weights.1);
    if second != digits[10] {
        return Err(ValidationError::new(field, ValidationReason::InvalidChecksum));
    }

    Ok(())
}

/// Validar documento nacional de identidad (pesos 10..2 y 11..2)
pub fn validate_national_id(value: &str) -> Result<(), ValidationError> {
    verify_document("national_id", value, (10, 11))
}

/// Validar número de licencia de conducir (pesos 9..1 y 10..1)
pub fn validate_license_number(value: &str) -> Result<(), ValidationError> {
    verify_document("license_number", value, (9, 10))
}

/// Validar que un string no esté vacío
pub fn validate_required(field: &str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, ValidationReason::Required));
    }
    Ok(())
}

/// Validar formato de matrícula de vehículo
pub fn validate_plate(value: &str) -> Result<(), ValidationError> {
    if !PLATE_REGEX.is_match(value) {
        return Err(ValidationError::new("plate", ValidationReason::InvalidFormat));
    }
    Ok(())
}

/// Validar formato de teléfono: 10 u 11 dígitos con prefijo de área
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    let digits = value.chars().filter(|c| c.is_ascii_digit()).count();
    if !(10..=11).contains(&digits) {
        return Err(ValidationError::new("phone", ValidationReason::InvalidFormat));
    }
    Ok(())
}

/// Validar formato de email
pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if !EMAIL_REGEX.is_match(value) {
        return Err(ValidationError::new("email", ValidationReason::InvalidFormat));
    }
    Ok(())
}

/// Validar que un valor sea positivo
pub fn validate_positive<T: PartialOrd + Zero>(field: &str, value: T) -> Result<(), ValidationError> {
    if value <= T::zero() {
        return Err(ValidationError::new(field, ValidationReason::NonPositive));
    }
    Ok(())
}

/// Validar capacidad de pasajeros
pub fn validate_capacity(capacity: i32) -> Result<(), ValidationError> {
    if !(MIN_CAPACITY..=MAX_CAPACITY).contains(&capacity) {
        return Err(ValidationError::new("capacity", ValidationReason::OutOfRange));
    }
    Ok(())
}

/// Validar año de fabricación: desde 1900 hasta el año siguiente al actual
pub fn validate_vehicle_year(year: i32, today: NaiveDate) -> Result<(), ValidationError> {
    if year < MIN_VEHICLE_YEAR || year > today.year() + 1 {
        return Err(ValidationError::new("year", ValidationReason::OutOfRange));
    }
    Ok(())
}

/// Validar categoría de licencia y convertirla
pub fn validate_license_category(value: &str) -> Result<LicenseCategory, ValidationError> {
    value
        .parse::<LicenseCategory>()
        .map_err(|_| ValidationError::new("license_category", ValidationReason::InvalidFormat))
}

/// Edad en años completos a la fecha `today`
pub fn age_on(birth_date: NaiveDate, today: NaiveDate) -> i32 {
    let mut age = today.year() - birth_date.year();
    if (today.month(), today.day()) < (birth_date.month(), birth_date.day()) {
        age -= 1;
    }
    age
}

/// Validar fecha de nacimiento: edad entre 18 y 70 años, ambos incluidos
pub fn validate_birth_date(birth_date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    let age = age_on(birth_date, today);
    if !(MIN_DRIVER_AGE..=MAX_DRIVER_AGE).contains(&age) {
        return Err(ValidationError::new("birth_date", ValidationReason::OutOfRange));
    }
    Ok(())
}

/// Validar que la licencia venza después de hoy
pub fn validate_license_expiry(expires_on: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if expires_on <= today {
        return Err(ValidationError::new("license_expires_on", ValidationReason::Expired));
    }
    Ok(())
}

/// Regla de intervalo para crear o reprogramar viajes: `start < end` y sin inicio pasado
pub fn validate_trip_window(window: &TimeWindow, now: DateTime<Utc>) -> Result<(), ValidationError> {
    if window.is_empty() {
        return Err(ValidationError::new("end_time", ValidationReason::EmptyInterval));
    }
    if window.start < now {
        return Err(ValidationError::new("start_time", ValidationReason::StartInPast));
    }
    Ok(())
}

/// Regla de intervalo para consultas de disponibilidad: además limita la duración
pub fn validate_query_window(
    window: &TimeWindow,
    now: DateTime<Utc>,
    max_span: Duration,
) -> Result<(), ValidationError> {
    validate_trip_window(window, now)?;
    if window.duration() > max_span {
        return Err(ValidationError::new("end_time", ValidationReason::IntervalTooLong));
    }
    Ok(())
}
