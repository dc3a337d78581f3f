//! Axum route handlers for PDF downloads.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::Value;

use crate::errors::AppError;
use crate::export::{DocumentArtifact, ExportError, Exporter};
use crate::models::analysis::AnalysisReport;
use crate::models::resume::ResumeDocument;
use crate::session::handlers::{resolve_user_id, resume_lookup};
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Default, Deserialize)]
pub struct ExportReportRequest {
    #[serde(default)]
    pub report: Option<AnalysisReport>,
    #[serde(default)]
    pub subject_name: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SessionExportQuery {
    pub user_id: Option<String>,
    pub subject_name: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// POST /api/v1/export/report
///
/// Renders a client-supplied analysis report. A `null` body or `null` report
/// is rejected before any layout happens.
pub async fn handle_export_report(
    State(state): State<AppState>,
    Json(request): Json<Option<ExportReportRequest>>,
) -> Result<Response, AppError> {
    let request = request.unwrap_or_default();
    let artifact = run_export(state.exporter, move |exporter| {
        exporter.analysis_report(request.report.as_ref(), request.subject_name.as_deref())
    })
    .await?;
    Ok(pdf_response(artifact))
}

/// POST /api/v1/export/resume
pub async fn handle_export_resume(
    State(state): State<AppState>,
    Json(resume): Json<Option<ResumeDocument>>,
) -> Result<Response, AppError> {
    let artifact = run_export(state.exporter, move |exporter| {
        exporter.resume_document(resume.as_ref())
    })
    .await?;
    Ok(pdf_response(artifact))
}

/// GET /api/v1/export/report
///
/// Fetches the analysis overview for the user (query or session) and renders
/// it. Without an explicit `subject_name` the stored profile's name is used.
pub async fn handle_export_session_report(
    State(state): State<AppState>,
    Query(query): Query<SessionExportQuery>,
) -> Result<Response, AppError> {
    let context = state.session.snapshot().await;
    let user_id = resolve_user_id(query.user_id.as_deref(), &context)?;

    let report = state.backend.overview(&user_id).await?;
    let subject_name = match query.subject_name {
        Some(name) => Some(name),
        // The name only decorates the document; a missing profile is not fatal.
        None => match resume_lookup(&context, Some(user_id.as_str())) {
            Ok(lookup) => state
                .backend
                .fetch_resume(lookup)
                .await
                .ok()
                .and_then(|profile| profile_name(&profile)),
            Err(_) => None,
        },
    };

    let artifact = run_export(state.exporter, move |exporter| {
        exporter.analysis_report(Some(&report), subject_name.as_deref())
    })
    .await?;
    Ok(pdf_response(artifact))
}

/// GET /api/v1/export/resume
///
/// Renders the session's stored resume.
pub async fn handle_export_session_resume(
    State(state): State<AppState>,
) -> Result<Response, AppError> {
    let context = state.session.snapshot().await;
    let profile = state
        .backend
        .fetch_resume(resume_lookup(&context, None)?)
        .await?;
    let resume = ResumeDocument::from_value(&profile);

    let artifact = run_export(state.exporter, move |exporter| {
        exporter.resume_document(Some(&resume))
    })
    .await?;
    Ok(pdf_response(artifact))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

/// Layout and encoding are CPU-bound; run them off the async workers.
async fn run_export<F>(exporter: Exporter, export: F) -> Result<DocumentArtifact, AppError>
where
    F: FnOnce(&Exporter) -> Result<DocumentArtifact, ExportError> + Send + 'static,
{
    let artifact = tokio::task::spawn_blocking(move || export(&exporter))
        .await
        .map_err(|e| anyhow::anyhow!("Export task failed: {e}"))??;
    Ok(artifact)
}

fn profile_name(profile: &Value) -> Option<String> {
    profile
        .get("name")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
}

fn pdf_response(artifact: DocumentArtifact) -> Response {
    let disposition = format!("attachment; filename=\"{}\"", artifact.file_name);
    (
        [
            (header::CONTENT_TYPE, DocumentArtifact::CONTENT_TYPE.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        artifact.bytes,
    )
        .into_response()
}
