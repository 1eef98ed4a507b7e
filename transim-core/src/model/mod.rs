//! Data model of the simulated transit network
//!
//! Contains the stop/route/vehicle records, the storage collaborator the
//! simulation reads from and the per-class kinematics table.

pub mod kinematics;
pub mod network;

pub use kinematics::VehicleKinematics;
pub use network::source::NetworkSource;
pub use network::store::NetworkStore;
pub use network::types::{
    Route, RouteDraft, Stop, StopDraft, TransportClass, Vehicle, VehicleDraft,
};
