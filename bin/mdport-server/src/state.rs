//! Shared application state injected into every Axum handler.

use std::sync::Arc;

use mdport_core::Pipeline;

use crate::config::Config;

/// State shared across all HTTP handlers.
///
/// Requests share nothing mutable: each conversion gets its own workspace
/// and passes its reference template explicitly.
#[derive(Clone, Debug)]
pub struct AppState {
    /// Server configuration (env-derived).
    pub config: Arc<Config>,
    /// Conversion pipeline bound to the configured tool.
    pub pipeline: Pipeline,
}
