//! Stops, routes and vehicles of the network

pub mod source;
pub mod store;
pub mod types;

pub use source::NetworkSource;
pub use store::NetworkStore;
pub use types::{Route, RouteDraft, Stop, StopDraft, TransportClass, Vehicle, VehicleDraft};
