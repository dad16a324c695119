//! Manufacturer registry endpoints: create, list, update, delete.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::api::error::ApiError;
use crate::api::types::ApiContext;
use crate::models::{Medicine, MedicineUpdate, NewMedicine};
use crate::registry;

#[derive(Deserialize)]
pub struct CreateRequest {
    pub manufacturer_id: Uuid,
    #[serde(flatten)]
    pub medicine: NewMedicine,
}

/// `POST /api/medicines` — register a new medicine.
pub async fn create(
    State(ctx): State<ApiContext>,
    Json(req): Json<CreateRequest>,
) -> Result<Json<Medicine>, ApiError> {
    let conn = ctx.db()?;
    let medicine = registry::create_medicine(&conn, req.manufacturer_id, req.medicine)?;
    Ok(Json(medicine))
}

/// `GET /api/manufacturers/:id/medicines` — the caller's entries.
pub async fn list_for_manufacturer(
    State(ctx): State<ApiContext>,
    Path(manufacturer_id): Path<Uuid>,
) -> Result<Json<Vec<Medicine>>, ApiError> {
    let conn = ctx.db()?;
    let medicines = registry::medicines_for_manufacturer(&conn, manufacturer_id)?;
    Ok(Json(medicines))
}

#[derive(Deserialize)]
pub struct UpdateRequest {
    pub manufacturer_id: Uuid,
    #[serde(flatten)]
    pub update: MedicineUpdate,
}

/// `PUT /api/medicines/:id` — update descriptive fields only.
pub async fn update(
    State(ctx): State<ApiContext>,
    Path(medicine_id): Path<Uuid>,
    Json(req): Json<UpdateRequest>,
) -> Result<Json<Medicine>, ApiError> {
    let conn = ctx.db()?;
    let medicine = registry::update_medicine(&conn, medicine_id, req.manufacturer_id, req.update)?;
    Ok(Json(medicine))
}

#[derive(Deserialize)]
pub struct DeleteQuery {
    pub manufacturer_id: Uuid,
}

#[derive(Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
}

/// `DELETE /api/medicines/:id?manufacturer_id=` — owner-only; flags
/// cascade.
pub async fn delete(
    State(ctx): State<ApiContext>,
    Path(medicine_id): Path<Uuid>,
    Query(query): Query<DeleteQuery>,
) -> Result<Json<DeleteResponse>, ApiError> {
    let conn = ctx.db()?;
    registry::delete_medicine(&conn, medicine_id, query.manufacturer_id)?;
    Ok(Json(DeleteResponse { deleted: true }))
}
