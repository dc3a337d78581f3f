pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::export::handlers as export;
use crate::session::handlers as session;
use crate::state::AppState;

/// Resume uploads are PDFs or DOCX files; axum's 2 MB default is too tight.
const UPLOAD_BODY_LIMIT: usize = 10 * 1024 * 1024;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Export API
        .route(
            "/api/v1/export/report",
            get(export::handle_export_session_report).post(export::handle_export_report),
        )
        .route(
            "/api/v1/export/resume",
            get(export::handle_export_session_resume).post(export::handle_export_resume),
        )
        // Session, upload and chat
        .route("/api/v1/session", get(session::handle_get_session))
        .route("/api/v1/resume", get(session::handle_get_resume))
        .route(
            "/api/v1/resume/upload",
            post(session::handle_upload_resume).layer(DefaultBodyLimit::max(UPLOAD_BODY_LIMIT)),
        )
        .route("/api/v1/chat", post(session::handle_chat))
        // Analysis proxy
        .route("/api/v1/analysis/:kind", get(analysis::handle_get_analysis))
        .with_state(state)
}
