//! Core of the transit simulator: network records, the in-memory network
//! store, per-class kinematics and the fixed-tick simulation engine that
//! publishes live vehicle positions.

pub mod error;
pub mod loading;
pub mod model;
pub mod prelude;
pub mod simulation;

pub use error::Error;

/// Identifier of a stop in the network store
pub type StopId = u32;
/// Identifier of a route in the network store
pub type RouteId = u32;
/// Identifier of a vehicle in the network store
pub type VehicleId = u32;

pub use loading::{NetworkConfig, create_network, load_network, sample_network, save_network};
pub use model::{
    NetworkSource, NetworkStore, Route, RouteDraft, Stop, StopDraft, TransportClass, Vehicle,
    VehicleDraft, VehicleKinematics,
};
pub use simulation::{
    Direction, EngineConfig, LivePosition, LivePositionStore, MotionPhase, RoutePath,
    SimulationEngine, VehicleState,
};
