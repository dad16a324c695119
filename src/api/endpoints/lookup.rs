//! Medicine verification lookup endpoint.

use axum::extract::{Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::lookup::LookupResult;

#[derive(Deserialize)]
pub struct LookupQuery {
    pub query: Option<String>,
}

/// `GET /api/medicines/lookup?query=` — classify a free-text query.
///
/// The pipeline expects a trimmed, lowercased query; normalization
/// happens here at the boundary, and a missing/blank query is rejected
/// before the pipeline runs.
pub async fn lookup(
    State(ctx): State<ApiContext>,
    Query(params): Query<LookupQuery>,
) -> Result<Json<LookupResult>, ApiError> {
    let query = params
        .query
        .as_deref()
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .ok_or_else(|| ApiError::BadRequest("query parameter is required".into()))?
        .to_lowercase();

    tracing::info!(query, "medicine lookup");

    let conn = ctx.db()?;
    let result = ctx.pipeline.lookup(&conn, &query)?;
    Ok(Json(result))
}
