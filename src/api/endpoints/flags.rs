//! Flagging endpoints: report a suspicious medicine, list flags for a
//! manufacturer, resolve a flag.
//!
//! Actor identity (customer/manufacturer ids) is supplied by the
//! external auth layer in the request payloads; role checks happen
//! there, ownership checks happen in the workflow.

use axum::extract::{Path, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::flags;
use crate::models::FlagDetail;

#[derive(Deserialize)]
pub struct FlagRequest {
    pub medicine_id: Uuid,
    pub customer_id: Uuid,
    pub reason: Option<String>,
}

#[derive(Serialize)]
pub struct FlagResponse {
    pub flag_id: Uuid,
}

/// `POST /api/flags` — report a suspicious medicine.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<FlagRequest>,
) -> Result<Json<FlagResponse>, ApiError> {
    let conn = ctx.db()?;
    let flag_id = flags::flag_medicine(&conn, req.medicine_id, req.customer_id, req.reason)?;
    Ok(Json(FlagResponse { flag_id }))
}

/// `GET /api/manufacturers/:id/flags` — flags on the caller's medicines.
pub async fn list_for_manufacturer(
    State(ctx): State<ApiContext>,
    Path(manufacturer_id): Path<Uuid>,
) -> Result<Json<Vec<FlagDetail>>, ApiError> {
    let conn = ctx.db()?;
    let details = flags::flags_for_manufacturer(&conn, manufacturer_id)?;
    Ok(Json(details))
}

#[derive(Deserialize)]
pub struct ResolveRequest {
    pub manufacturer_id: Uuid,
}

#[derive(Serialize)]
pub struct ResolveResponse {
    pub resolved: bool,
}

/// `POST /api/flags/:id/resolve` — terminal action, deletes the flag.
pub async fn resolve(
    State(ctx): State<ApiContext>,
    Path(flag_id): Path<Uuid>,
    Json(req): Json<ResolveRequest>,
) -> Result<Json<ResolveResponse>, ApiError> {
    let conn = ctx.db()?;
    flags::resolve_flag(&conn, flag_id, req.manufacturer_id)?;
    Ok(Json(ResolveResponse { resolved: true }))
}
