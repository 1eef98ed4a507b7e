use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{TransportClass, VehicleId};

/// Published position of a simulated vehicle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LivePosition {
    pub vehicle_id: VehicleId,
    pub x: f64,
    pub y: f64,
    pub current_stop_index: usize,
    pub next_stop_index: usize,
    pub route_name: String,
    #[serde(rename = "type")]
    pub class: TransportClass,
    /// Fraction of the current leg already covered, 0.0 to 1.0
    pub progress: f64,
}

/// Latest [`LivePosition`] per vehicle, overwritten in place every tick.
///
/// Not synchronized on its own: the engine keeps it behind the same lock as
/// the vehicle states so that readers observe whole ticks only.
#[derive(Debug, Clone, Default)]
pub struct LivePositionStore {
    entries: HashMap<VehicleId, LivePosition>,
}

impl LivePositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces any previous entry of the same vehicle
    pub fn publish(&mut self, position: LivePosition) {
        self.entries.insert(position.vehicle_id, position);
    }

    pub fn get(&self, vehicle_id: VehicleId) -> Option<&LivePosition> {
        self.entries.get(&vehicle_id)
    }

    /// Copy of every entry, in no particular order
    pub fn snapshot(&self) -> Vec<LivePosition> {
        self.entries.values().cloned().collect()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
