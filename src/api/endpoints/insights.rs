//! Insight endpoint.
//!
//! `POST /api/insights/:kind`: one JSON object in, one `InsightOutcome`
//! out. The upstream call is blocking and runs on the blocking pool.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::Json;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::insight::{InsightKind, InsightOutcome, InsightRequest};

pub async fn generate(
    State(ctx): State<ApiContext>,
    Path(kind): Path<String>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<InsightOutcome>, ApiError> {
    let kind: InsightKind = kind.parse().map_err(ApiError::NotFound)?;
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;

    let proxy = ctx.proxy.clone();
    let outcome = tokio::task::spawn_blocking(move || proxy.get_insight(kind, &request))
        .await
        .map_err(|e| ApiError::Internal(format!("Insight task failed: {e}")))??;

    Ok(Json(outcome))
}
