//! Shared application state
//!
//! Este módulo define el estado compartido de la aplicación que se pasa
//! a través del router de Axum.

use std::sync::Arc;

use crate::config::environment::EnvironmentConfig;
use crate::config::scheduling::{RetryPolicy, SchedulingConfig};
use crate::repositories::StoreSet;
use crate::services::{AvailabilityService, RegistryService, SchedulingCoordinator};
use crate::utils::clock::Clock;

#[derive(Clone)]
pub struct AppState {
    pub coordinator: Arc<SchedulingCoordinator>,
    pub availability: Arc<AvailabilityService>,
    pub registry: Arc<RegistryService>,
    pub clock: Arc<dyn Clock>,
    pub retry: RetryPolicy,
    pub config: EnvironmentConfig,
}

impl AppState {
    pub fn new(
        stores: StoreSet,
        clock: Arc<dyn Clock>,
        scheduling: SchedulingConfig,
        config: EnvironmentConfig,
    ) -> Self {
        let retry = scheduling.retry.clone();
        Self {
            coordinator: Arc::new(SchedulingCoordinator::new(
                stores.clone(),
                clock.clone(),
                scheduling.clone(),
            )),
            availability: Arc::new(AvailabilityService::new(
                stores.clone(),
                clock.clone(),
                scheduling,
            )),
            registry: Arc::new(RegistryService::new(stores, clock.clone())),
            clock,
            retry,
            config,
        }
    }
}
