//! Shared application state for the HTTP handlers.

use std::sync::Arc;

use crate::engine::ReloadCoordinator;

#[derive(Clone)]
pub struct AppState {
    coordinator: Arc<ReloadCoordinator>,
}

impl AppState {
    pub fn new(coordinator: Arc<ReloadCoordinator>) -> Self {
        Self { coordinator }
    }

    pub fn coordinator(&self) -> &ReloadCoordinator {
        &self.coordinator
    }
}
