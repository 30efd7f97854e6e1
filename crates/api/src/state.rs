use std::sync::Arc;

use site_content_core::events::bus::EventBus;
use site_content_core::store::ContentStore;

use crate::config::AppConfig;
use crate::fallback::FallbackSource;

/// Shared application state, passed to all handlers via Axum's `State` extractor.
/// Wrapped in `Arc` so cloning is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<InnerState>,
}

struct InnerState {
    store: ContentStore,
    config: AppConfig,
    fallback: Option<Arc<dyn FallbackSource>>,
}

impl AppState {
    pub fn new(
        store: ContentStore,
        config: AppConfig,
        fallback: Option<Arc<dyn FallbackSource>>,
    ) -> Self {
        Self {
            inner: Arc::new(InnerState {
                store,
                config,
                fallback,
            }),
        }
    }

    pub fn store(&self) -> &ContentStore {
        &self.inner.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    pub fn fallback(&self) -> Option<&dyn FallbackSource> {
        self.inner.fallback.as_deref()
    }

    pub fn event_bus(&self) -> &EventBus {
        self.inner.store.events()
    }
}
