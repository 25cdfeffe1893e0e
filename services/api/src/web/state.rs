//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use wikiquiz_core::ports::{DatabaseService, EnrichmentService, PageFetchService};

use crate::config::Config;

//=========================================================================================
// AppState (Shared Across All Requests)
//=========================================================================================

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<dyn DatabaseService>,
    pub fetcher: Arc<dyn PageFetchService>,
    pub enricher: Arc<dyn EnrichmentService>,
    pub config: Arc<Config>,
}
