use std::sync::Arc;

use crate::backend_client::AnalysisBackend;
use crate::export::Exporter;
use crate::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    /// PDF compositor. Stateless apart from its timestamp source.
    pub exporter: Exporter,
    /// Analysis API client. `HttpBackend` in production, stubbed in router tests.
    pub backend: Arc<dyn AnalysisBackend>,
    pub session: Arc<SessionStore>,
}
