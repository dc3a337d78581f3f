use axum::{
    extract::{Path, Query, State},
    Json,
};
use serde_json::Value;

use crate::analysis::{AnalysisKind, AnalysisQuery};
use crate::errors::AppError;
use crate::session::handlers::resolve_user_id;
use crate::state::AppState;

/// GET /api/v1/analysis/:kind
///
/// The backend body is returned as-is.
pub async fn handle_get_analysis(
    State(state): State<AppState>,
    Path(kind): Path<String>,
    Query(query): Query<AnalysisQuery>,
) -> Result<Json<Value>, AppError> {
    let kind: AnalysisKind = kind.parse().map_err(AppError::NotFound)?;
    let context = state.session.snapshot().await;
    let user_id = resolve_user_id(query.user_id.as_deref(), &context)?;

    let pairs = kind.query_pairs(&user_id, &query);
    let body = state.backend.analysis(kind, &pairs).await?;
    Ok(Json(body))
}
