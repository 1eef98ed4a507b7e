// Re-export key components
pub use crate::loading::{
    NetworkConfig, create_network, load_network, sample_network, save_network,
};
pub use crate::model::{
    NetworkSource, NetworkStore, Route, RouteDraft, Stop, StopDraft, TransportClass, Vehicle,
    VehicleDraft, VehicleKinematics,
};
pub use crate::simulation::{EngineConfig, LivePosition, SimulationEngine};

// Core identifier types
pub use crate::Error;
pub use crate::RouteId;
pub use crate::StopId;
pub use crate::VehicleId;
