use thiserror::Error;

use crate::{RouteId, StopId, VehicleId};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Unknown stop: {0}")]
    UnknownStop(StopId),
    #[error("Unknown route: {0}")]
    UnknownRoute(RouteId),
    #[error("Unknown vehicle: {0}")]
    UnknownVehicle(VehicleId),
    #[error("Unknown transport class: {0}")]
    UnknownTransportClass(String),
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
    #[error("Failed to spawn simulation thread: {0}")]
    SpawnError(std::io::Error),
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::InvalidData(err.to_string())
    }
}
