//! Static network listings straight from the store

use axum::Json;
use axum::extract::State;
use transim_core::prelude::{Route, Stop, Vehicle};

use crate::state::AppState;

pub async fn list_stops(State(state): State<AppState>) -> Json<Vec<Stop>> {
    Json(state.store().stops())
}

pub async fn list_routes(State(state): State<AppState>) -> Json<Vec<Route>> {
    Json(state.store().routes())
}

pub async fn list_vehicles(State(state): State<AppState>) -> Json<Vec<Vehicle>> {
    Json(state.store().vehicles())
}
