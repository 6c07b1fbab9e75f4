//! Application state for the web layer.

use std::sync::Arc;

use crate::estimate::{EstimateConfig, FileCorpus};
use crate::routedb::RouteDbHandle;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Refreshable route database snapshot
    pub routes: RouteDbHandle,

    /// Historical timing corpus on disk
    pub corpus: Arc<FileCorpus>,

    /// Estimation parameters
    pub estimate: Arc<EstimateConfig>,
}

impl AppState {
    pub fn new(routes: RouteDbHandle, corpus: FileCorpus, estimate: EstimateConfig) -> Self {
        Self {
            routes,
            corpus: Arc::new(corpus),
            estimate: Arc::new(estimate),
        }
    }
}
