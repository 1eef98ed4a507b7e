//! Live positions and run control of the simulation engine

use axum::Json;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};
use transim_core::prelude::{LivePosition, VehicleId};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn live_positions(State(state): State<AppState>) -> Json<Vec<LivePosition>> {
    let mut positions = state.engine().live_positions();
    positions.sort_unstable_by_key(|position| position.vehicle_id);
    Json(positions)
}

pub async fn live_position(
    State(state): State<AppState>,
    id: Result<Path<VehicleId>, PathRejection>,
) -> Result<Json<LivePosition>, ApiError> {
    let Path(id) = id?;
    state
        .engine()
        .live_position(id)
        .map(Json)
        .ok_or_else(|| ApiError::not_found(format!("Vehicle {id} is not being simulated")))
}

#[derive(Debug, Deserialize)]
pub struct ControlRequest {
    pub action: String,
}

#[derive(Debug, Serialize)]
pub struct SimulationStatus {
    pub running: bool,
    pub paused: bool,
    pub tick_count: u64,
    pub vehicles: usize,
}

#[derive(Debug, Serialize)]
pub struct ControlResponse {
    pub success: bool,
    #[serde(flatten)]
    pub status: SimulationStatus,
}

impl SimulationStatus {
    fn of(state: &AppState) -> Self {
        let engine = state.engine();
        SimulationStatus {
            running: engine.is_running(),
            paused: engine.is_paused(),
            tick_count: engine.tick_count(),
            vehicles: engine.vehicle_count(),
        }
    }
}

/// `start`/`resume` set vehicles in motion, `stop`/`pause` freeze them.
/// The tick thread itself keeps running either way.
pub async fn control(
    State(state): State<AppState>,
    payload: Result<Json<ControlRequest>, JsonRejection>,
) -> Result<Json<ControlResponse>, ApiError> {
    let Json(request) = payload?;
    match request.action.as_str() {
        "start" | "resume" => state.engine().resume(),
        "stop" | "pause" => state.engine().pause(),
        other => {
            return Err(ApiError::bad_request(format!(
                "Unknown action '{other}', expected start, stop, pause or resume"
            )));
        }
    }
    tracing::info!(action = %request.action, "Simulation control");
    Ok(Json(ControlResponse {
        success: true,
        status: SimulationStatus::of(&state),
    }))
}

pub async fn status(State(state): State<AppState>) -> Json<SimulationStatus> {
    Json(SimulationStatus::of(&state))
}
