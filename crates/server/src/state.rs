use std::sync::Arc;

use lotsweep_core::{Authenticator, Config, SanitizedConfig};

use crate::dispatcher::UpdateQueue;

/// Shared application state
pub struct AppState {
    config: Config,
    authenticator: Arc<dyn Authenticator>,
    updates: UpdateQueue,
}

impl AppState {
    pub fn new(
        config: Config,
        authenticator: Arc<dyn Authenticator>,
        updates: UpdateQueue,
    ) -> Self {
        Self {
            config,
            authenticator,
            updates,
        }
    }

    pub fn sanitized_config(&self) -> SanitizedConfig {
        SanitizedConfig::from(&self.config)
    }

    pub fn authenticator(&self) -> &dyn Authenticator {
        self.authenticator.as_ref()
    }

    /// Queue feeding the update dispatcher.
    pub fn updates(&self) -> &UpdateQueue {
        &self.updates
    }
}
