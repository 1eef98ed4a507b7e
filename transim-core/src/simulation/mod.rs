//! Fixed-tick simulation of vehicles looping along their routes
//!
//! [`SimulationEngine`] owns one [`VehicleState`] per simulated vehicle and a
//! [`LivePositionStore`] projection of them. A background thread advances
//! every vehicle once per tick while holding the engine lock, so readers only
//! ever see whole ticks.

mod config;
mod engine;
mod live;
mod route_path;
mod state;

pub use config::EngineConfig;
pub use engine::SimulationEngine;
pub use live::{LivePosition, LivePositionStore};
pub use route_path::{Direction, RoutePath};
pub use state::{
    ARRIVAL_THRESHOLD, MotionPhase, PLANE_UNIT_SCALE, StateError, VehicleState, units_per_second,
};
