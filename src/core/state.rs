use std::sync::Arc;

use crate::core::config::Settings;
use crate::repositories::Storage;

/// Shared handle passed to every service call.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    settings: Settings,
    storage: Arc<dyn Storage>,
}

impl AppState {
    pub fn new(settings: Settings, storage: Arc<dyn Storage>) -> Self {
        Self { inner: Arc::new(InnerState { settings, storage }) }
    }

    pub fn settings(&self) -> &Settings {
        &self.inner.settings
    }

    pub fn storage(&self) -> &dyn Storage {
        self.inner.storage.as_ref()
    }
}
