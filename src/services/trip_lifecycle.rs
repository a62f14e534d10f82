//! Máquina de estados del viaje
//!
//! ```text
//! SCHEDULED --start--> IN_PROGRESS --complete--> COMPLETED
//!     |                     |
//!     +------cancel---------+-----> CANCELLED
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::models::trip::TripStatus;
use crate::utils::errors::SchedulingError;

/// Eventos que cambian el estado de un viaje
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TripEvent {
    Start,
    Complete,
    Cancel,
}

impl TripEvent {
    /// Estado al que conduce el evento cuando es legal
    pub fn target(&self) -> TripStatus {
        match self {
            TripEvent::Start => TripStatus::InProgress,
            TripEvent::Complete => TripStatus::Completed,
            TripEvent::Cancel => TripStatus::Cancelled,
        }
    }
}

impl fmt::Display for TripEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TripEvent::Start => write!(f, "start"),
            TripEvent::Complete => write!(f, "complete"),
            TripEvent::Cancel => write!(f, "cancel"),
        }
    }
}

pub struct TripLifecycle;

impl TripLifecycle {
    /// Todo viaje nace programado, diga lo que diga el llamador
    pub const INITIAL: TripStatus = TripStatus::Scheduled;

    pub fn can_apply(from: TripStatus, event: TripEvent) -> bool {
        matches!(
            (from, event),
            (TripStatus::Scheduled, TripEvent::Start)
                | (TripStatus::InProgress, TripEvent::Complete)
                | (TripStatus::Scheduled, TripEvent::Cancel)
                | (TripStatus::InProgress, TripEvent::Cancel)
        )
    }

    pub fn transition(from: TripStatus, event: TripEvent) -> Result<TripStatus, SchedulingError> {
        if Self::can_apply(from, event) {
            Ok(event.target())
        } else {
            Err(SchedulingError::IllegalTransition {
                from,
                to: event.target(),
            })
        }
    }

    /// Solo un viaje aún no iniciado puede cambiar de horario o recursos
    pub fn allows_reschedule(status: TripStatus) -> bool {
        status == TripStatus::Scheduled
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_STATUSES: [TripStatus; 4] = [
        TripStatus::Scheduled,
        TripStatus::InProgress,
        TripStatus::Completed,
        TripStatus::Cancelled,
    ];

    #[test]
    fn test_legal_transitions() {
        assert_eq!(
            TripLifecycle::transition(TripStatus::Scheduled, TripEvent::Start),
            Ok(TripStatus::InProgress)
        );
        assert_eq!(
            TripLifecycle::transition(TripStatus::InProgress, TripEvent::Complete),
            Ok(TripStatus::Completed)
        );
        assert_eq!(
            TripLifecycle::transition(TripStatus::Scheduled, TripEvent::Cancel),
            Ok(TripStatus::Cancelled)
        );
        assert_eq!(
            TripLifecycle::transition(TripStatus::InProgress, TripEvent::Cancel),
            Ok(TripStatus::Cancelled)
        );
    }

    #[test]
    fn test_complete_on_scheduled_is_illegal() {
        assert_eq!(
            TripLifecycle::transition(TripStatus::Scheduled, TripEvent::Complete),
            Err(SchedulingError::IllegalTransition {
                from: TripStatus::Scheduled,
                to: TripStatus::Completed,
            })
        );
    }

    #[test]
    fn test_terminal_states_accept_no_event() {
        for from in [TripStatus::Completed, TripStatus::Cancelled] {
            for event in [TripEvent::Start, TripEvent::Complete, TripEvent::Cancel] {
                let err = TripLifecycle::transition(from, event).unwrap_err();
                assert_eq!(
                    err,
                    SchedulingError::IllegalTransition {
                        from,
                        to: event.target()
                    }
                );
            }
        }
    }

    #[test]
    fn test_reschedule_only_while_scheduled() {
        let allowed: Vec<TripStatus> = ALL_STATUSES
            .into_iter()
            .filter(|s| TripLifecycle::allows_reschedule(*s))
            .collect();
        assert_eq!(allowed, vec![TripStatus::Scheduled]);
    }

    #[test]
    fn test_start_twice_is_illegal() {
        assert!(!TripLifecycle::can_apply(TripStatus::InProgress, TripEvent::Start));
    }
}
