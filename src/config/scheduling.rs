//! Configuración del núcleo de planificación
//!
//! Se construye una vez al arrancar y se pasa explícitamente al coordinador.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::utils::validation::DEFAULT_MAX_QUERY_SPAN_DAYS;

/// Qué hacer con los indicadores de estado al reservar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFlagPolicy {
    /// Los indicadores nunca bloquean una reserva
    #[default]
    Advisory,
    /// Rechaza recursos en mantenimiento, inactivos o con documentos vencidos
    Enforce,
}

impl FromStr for StatusFlagPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(StatusFlagPolicy::Advisory),
            "enforce" => Ok(StatusFlagPolicy::Enforce),
            other => Err(format!("unknown status flag policy '{}'", other)),
        }
    }
}

/// Política de reintentos para fallos transitorios
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Intentos totales, incluido el primero
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(50),
            max_delay: Duration::from_secs(2),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SchedulingConfig {
    /// Plazo máximo de una unidad de trabajo transaccional
    pub transaction_timeout: Duration,
    /// Duración máxima de un intervalo en consultas de disponibilidad
    pub max_query_span: chrono::Duration,
    pub status_policy: StatusFlagPolicy,
    pub retry: RetryPolicy,
}

impl Default for SchedulingConfig {
    fn default() -> Self {
        Self {
            transaction_timeout: Duration::from_secs(5),
            max_query_span: chrono::Duration::days(DEFAULT_MAX_QUERY_SPAN_DAYS),
            status_policy: StatusFlagPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }
}

impl SchedulingConfig {
    /// Lee `SCHEDULING_*` del entorno; los valores ausentes o inválidos toman el default
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let transaction_timeout = parse_var::<u64>("SCHEDULING_TX_TIMEOUT_MS")
            .map(Duration::from_millis)
            .unwrap_or(defaults.transaction_timeout);
        let max_query_span = parse_var::<i64>("SCHEDULING_MAX_QUERY_DAYS")
            .filter(|days| *days > 0)
            .map(chrono::Duration::days)
            .unwrap_or(defaults.max_query_span);
        let status_policy =
            parse_var::<StatusFlagPolicy>("SCHEDULING_STATUS_POLICY").unwrap_or_default();
        let retry = RetryPolicy {
            max_attempts: parse_var::<u32>("SCHEDULING_RETRY_ATTEMPTS")
                .unwrap_or(defaults.retry.max_attempts),
            base_delay: parse_var::<u64>("SCHEDULING_RETRY_BASE_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.retry.base_delay),
            max_delay: defaults.retry.max_delay,
        };

        Self {
            transaction_timeout,
            max_query_span,
            status_policy,
            retry,
        }
    }
}

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    let raw = env::var(name).ok()?;
    match raw.parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            log::warn!("⚠️ Valor inválido para {}: '{}', usando default", name, raw);
            None
        }
    }
}
