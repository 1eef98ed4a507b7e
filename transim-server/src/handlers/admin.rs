//! Create-or-update endpoints. Every successful edit reloads the engine.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use serde_json::{Value, json};
use transim_core::prelude::{RouteDraft, StopDraft, VehicleDraft};

use crate::error::ApiError;
use crate::state::AppState;

fn saved(id: u32) -> Json<Value> {
    Json(json!({ "success": true, "id": id }))
}

pub async fn upsert_stop(
    State(state): State<AppState>,
    payload: Result<Json<StopDraft>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(draft) = payload?;
    let id = state.edit_network(|store| store.upsert_stop(draft))?;
    tracing::info!(stop = id, "Stop saved");
    Ok(saved(id))
}

pub async fn upsert_route(
    State(state): State<AppState>,
    payload: Result<Json<RouteDraft>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(draft) = payload?;
    let id = state.edit_network(|store| store.upsert_route(draft))?;
    tracing::info!(route = id, "Route saved");
    Ok(saved(id))
}

pub async fn upsert_vehicle(
    State(state): State<AppState>,
    payload: Result<Json<VehicleDraft>, JsonRejection>,
) -> Result<Json<Value>, ApiError> {
    let Json(draft) = payload?;
    let id = state.edit_network(|store| store.upsert_vehicle(draft))?;
    tracing::info!(vehicle = id, "Vehicle saved");
    Ok(saved(id))
}
