//! Reintento acotado para fallos transitorios de almacenamiento
//!
//! Solo `SchedulingError::Storage` con un error transitorio se reintenta.
//! Conflictos, validaciones y transiciones ilegales se devuelven tal cual.

use rand::Rng;
use std::future::Future;
use std::time::Duration;

use crate::config::scheduling::RetryPolicy;
use crate::utils::errors::SchedulingResult;

/// Retardo exponencial para el intento `attempt` (1 = primer reintento), sin jitter
pub fn backoff_delay(policy: &RetryPolicy, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(16);
    policy
        .base_delay
        .saturating_mul(1u32 << exponent)
        .min(policy.max_delay)
}

fn with_jitter(delay: Duration) -> Duration {
    let millis = delay.as_millis() as u64;
    if millis == 0 {
        return delay;
    }
    let extra = rand::thread_rng().gen_range(0..=millis / 2);
    delay + Duration::from_millis(extra)
}

/// Ejecuta `operation` reintentando los fallos transitorios hasta `policy.max_attempts` veces en total
pub async fn retry_transient<T, F, Fut>(
    policy: &RetryPolicy,
    operation_name: &str,
    mut operation: F,
) -> SchedulingResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SchedulingResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let delay = with_jitter(backoff_delay(policy, attempt));
                log::warn!(
                    "🔁 {} falló ({}), reintento {}/{} en {:?}",
                    operation_name,
                    e,
                    attempt,
                    max_attempts - 1,
                    delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(e) => return Err(e),
        }
    }
}
