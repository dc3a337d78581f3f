//! Axum route handlers for the session, upload and chat flows.

use axum::{
    extract::{Multipart, State},
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::backend_client::{ResumeLookup, UploadFile};
use crate::errors::AppError;
use crate::models::backend::{ChatReply, ChatRequest, UploadIdentifiers};
use crate::session::SessionContext;
use crate::state::AppState;

const UPLOAD_FIELD: &str = "file";
const DEFAULT_UPLOAD_NAME: &str = "resume.pdf";

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub session: SessionContext,
    pub result: Value,
}

// ────────────────────────────────────────────────────────────────────────────
// Session helpers shared with the export and analysis handlers
// ────────────────────────────────────────────────────────────────────────────

/// An explicit user id wins; otherwise the session's user is used.
pub(crate) fn resolve_user_id(
    explicit: Option<&str>,
    context: &SessionContext,
) -> Result<String, AppError> {
    explicit
        .filter(|id| !id.trim().is_empty())
        .map(str::to_string)
        .or_else(|| context.user_id.clone())
        .ok_or_else(missing_user)
}

/// Prefers the uploaded profile, which needs no user; otherwise the latest
/// resume of the explicit or session user.
pub(crate) fn resume_lookup<'a>(
    context: &'a SessionContext,
    explicit_user: Option<&'a str>,
) -> Result<ResumeLookup<'a>, AppError> {
    if let Some(profile_id) = context.profile_id.as_deref() {
        return Ok(ResumeLookup::Profile(profile_id));
    }
    explicit_user
        .filter(|id| !id.trim().is_empty())
        .or(context.user_id.as_deref())
        .map(ResumeLookup::User)
        .ok_or_else(missing_user)
}

fn missing_user() -> AppError {
    AppError::Validation("No user_id given and no resume uploaded in this session".to_string())
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

/// GET /api/v1/session
pub async fn handle_get_session(State(state): State<AppState>) -> Json<SessionContext> {
    Json(state.session.snapshot().await)
}

/// POST /api/v1/resume/upload
///
/// Forwards the multipart `file` field to the analysis backend and records the
/// identifiers it returns in the session.
pub async fn handle_upload_resume(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let file_name = field.file_name().unwrap_or(DEFAULT_UPLOAD_NAME).to_string();
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Invalid file: {e}")))?;
        upload = Some(UploadFile {
            file_name,
            content_type,
            bytes,
        });
        break;
    }

    let upload = upload
        .filter(|f| !f.bytes.is_empty())
        .ok_or_else(|| AppError::Validation("A non-empty 'file' field is required".to_string()))?;

    info!("Uploading resume {} ({} bytes)", upload.file_name, upload.bytes.len());
    let result = state.backend.upload_resume(upload).await?;
    let ids = UploadIdentifiers::from_body(&result);
    let session = state.session.record_upload(&ids).await?;

    Ok(Json(UploadResponse { session, result }))
}

/// GET /api/v1/resume
///
/// The session's parsed resume as stored by the analysis backend.
pub async fn handle_get_resume(State(state): State<AppState>) -> Result<Json<Value>, AppError> {
    let context = state.session.snapshot().await;
    let resume = state
        .backend
        .fetch_resume(resume_lookup(&context, None)?)
        .await?;
    Ok(Json(resume))
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(request): Json<ChatMessage>,
) -> Result<Json<ChatReply>, AppError> {
    let message = request.message.trim();
    if message.is_empty() {
        return Err(AppError::Validation("message cannot be empty".to_string()));
    }

    let context = state.session.ensure_session_id().await?;
    let chat = ChatRequest {
        message,
        user_id: context.user_id.as_deref(),
        session_id: context.session_id.as_deref(),
        include_sources: true,
        context: json!({}),
    };

    let reply = state.backend.chat(&chat).await?;
    Ok(Json(reply))
}
