use crate::cli::CommandLineArgs;
use crate::record_store::{RecordStore, StoreConfig};

use std::sync::Arc;

/// Shared application state passed to each request handler.
pub struct AppState {
    /// Record store.
    pub record_store: RecordStore,
}

impl AppState {
    /// Create and return an [AppState].
    pub fn new(args: &CommandLineArgs) -> Self {
        Self::with_store_config(StoreConfig::from(args))
    }

    /// Create and return an [AppState] reading datasets from the given location.
    pub fn with_store_config(config: StoreConfig) -> Self {
        Self {
            record_store: RecordStore::new(config),
        }
    }
}

/// AppState wrapped in an Atomic Reference Count (Arc) to allow multiple references.
pub type SharedAppState = Arc<AppState>;
