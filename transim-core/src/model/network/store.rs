//! In-memory network storage with create-or-update semantics

use std::collections::BTreeMap;

use geo::Point;
use log::debug;
use serde::{Deserialize, Serialize};

use super::source::NetworkSource;
use super::types::{Route, RouteDraft, Stop, StopDraft, Vehicle, VehicleDraft};
use crate::{Error, RouteId, StopId, VehicleId};

/// Stops, routes and vehicles keyed by id.
///
/// Ids are assigned like an auto-increment column: one past the largest id
/// ever stored, starting at 1. Id 0 is never stored.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(try_from = "NetworkSnapshot", into = "NetworkSnapshot")]
pub struct NetworkStore {
    stops: BTreeMap<StopId, Stop>,
    routes: BTreeMap<RouteId, Route>,
    vehicles: BTreeMap<VehicleId, Vehicle>,
    next_stop_id: StopId,
    next_route_id: RouteId,
    next_vehicle_id: VehicleId,
}

/// Flat, file-friendly form of a [`NetworkStore`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkSnapshot {
    pub stops: Vec<Stop>,
    pub routes: Vec<Route>,
    pub vehicles: Vec<Vehicle>,
}

impl TryFrom<NetworkSnapshot> for NetworkStore {
    type Error = Error;

    /// # Errors
    ///
    /// Returns [`Error::InvalidData`] for id 0 or an id that leaves no room
    /// for the next auto-increment id
    fn try_from(snapshot: NetworkSnapshot) -> Result<Self, Error> {
        let mut store = NetworkStore::new();
        for stop in snapshot.stops {
            store.next_stop_id = next_after("stop", stop.id, store.next_stop_id)?;
            store.stops.insert(stop.id, stop);
        }
        for route in snapshot.routes {
            store.next_route_id = next_after("route", route.id, store.next_route_id)?;
            store.routes.insert(route.id, route);
        }
        for vehicle in snapshot.vehicles {
            store.next_vehicle_id = next_after("vehicle", vehicle.id, store.next_vehicle_id)?;
            store.vehicles.insert(vehicle.id, vehicle);
        }
        Ok(store)
    }
}

/// Counter value after storing `id`
fn next_after(kind: &str, id: u32, counter: u32) -> Result<u32, Error> {
    if id == 0 {
        return Err(Error::InvalidData(format!("{kind} id 0 is reserved")));
    }
    let after = id
        .checked_add(1)
        .ok_or_else(|| Error::InvalidData(format!("{kind} id {id} is out of range")))?;
    Ok(counter.max(after))
}

impl From<NetworkStore> for NetworkSnapshot {
    fn from(store: NetworkStore) -> Self {
        NetworkSnapshot {
            stops: store.stops.into_values().collect(),
            routes: store.routes.into_values().collect(),
            vehicles: store.vehicles.into_values().collect(),
        }
    }
}

/// Resolves the create-or-update id of a draft
fn existing_id(id: Option<u32>) -> Option<u32> {
    id.filter(|&id| id > 0)
}

impl NetworkStore {
    pub fn new() -> Self {
        NetworkStore {
            next_stop_id: 1,
            next_route_id: 1,
            next_vehicle_id: 1,
            ..Default::default()
        }
    }

    pub fn stops(&self) -> Vec<Stop> {
        self.stops.values().cloned().collect()
    }

    pub fn routes(&self) -> Vec<Route> {
        self.routes.values().cloned().collect()
    }

    pub fn vehicles(&self) -> Vec<Vehicle> {
        self.vehicles.values().cloned().collect()
    }

    pub fn stop(&self, id: StopId) -> Option<&Stop> {
        self.stops.get(&id)
    }

    pub fn route(&self, id: RouteId) -> Option<&Route> {
        self.routes.get(&id)
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.get(&id)
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }

    pub fn route_count(&self) -> usize {
        self.routes.len()
    }

    pub fn vehicle_count(&self) -> usize {
        self.vehicles.len()
    }

    /// Inserts a new stop or updates an existing one
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownStop`] when updating an id that is not stored
    /// and [`Error::InvalidData`] when no id is left to assign
    pub fn upsert_stop(&mut self, draft: StopDraft) -> Result<StopId, Error> {
        let id = match existing_id(draft.id) {
            Some(id) if self.stops.contains_key(&id) => id,
            Some(id) => return Err(Error::UnknownStop(id)),
            None => take_next("stop", &mut self.next_stop_id)?,
        };
        debug!("Storing stop {id} ({})", draft.name);
        self.stops.insert(
            id,
            Stop {
                id,
                name: draft.name,
                x: draft.x,
                y: draft.y,
            },
        );
        Ok(id)
    }

    /// Inserts a new route or replaces an existing one, keeping the route
    /// label of its vehicles in sync
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownRoute`] when updating an id that is not stored
    /// and [`Error::InvalidData`] when no id is left to assign
    pub fn upsert_route(&mut self, draft: RouteDraft) -> Result<RouteId, Error> {
        let id = match existing_id(draft.id) {
            Some(id) if self.routes.contains_key(&id) => id,
            Some(id) => return Err(Error::UnknownRoute(id)),
            None => take_next("route", &mut self.next_route_id)?,
        };
        debug!(
            "Storing route {id} ({}) with {} stops",
            draft.name,
            draft.stop_ids.len()
        );

        for vehicle in self.vehicles.values_mut().filter(|v| v.route_id == id) {
            vehicle.route_name.clone_from(&draft.name);
        }

        self.routes.insert(
            id,
            Route {
                id,
                name: draft.name,
                class: draft.class,
                stop_ids: draft.stop_ids,
            },
        );
        Ok(id)
    }

    /// Inserts a new vehicle or updates an existing one. An empty route label
    /// is filled from the assigned route.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownVehicle`] when updating an id that is not stored
    /// and [`Error::InvalidData`] when no id is left to assign
    pub fn upsert_vehicle(&mut self, draft: VehicleDraft) -> Result<VehicleId, Error> {
        let id = match existing_id(draft.id) {
            Some(id) if self.vehicles.contains_key(&id) => id,
            Some(id) => return Err(Error::UnknownVehicle(id)),
            None => take_next("vehicle", &mut self.next_vehicle_id)?,
        };

        let route_name = if draft.route_name.is_empty() {
            self.routes
                .get(&draft.route_id)
                .map(|route| route.name.clone())
                .unwrap_or_default()
        } else {
            draft.route_name
        };

        debug!("Storing vehicle {id} on route {}", draft.route_id);
        self.vehicles.insert(
            id,
            Vehicle {
                id,
                route_id: draft.route_id,
                class: draft.class,
                avg_speed: draft.avg_speed,
                route_name,
            },
        );
        Ok(id)
    }
}

fn take_next(kind: &str, counter: &mut u32) -> Result<u32, Error> {
    let id = (*counter).max(1);
    *counter = id
        .checked_add(1)
        .ok_or_else(|| Error::InvalidData(format!("no {kind} ids left")))?;
    Ok(id)
}

impl NetworkSource for NetworkStore {
    fn list_vehicles(&self) -> Vec<Vehicle> {
        self.vehicles()
    }

    fn route_stop_sequence(&self, route_id: RouteId) -> Vec<StopId> {
        self.routes
            .get(&route_id)
            .map(|route| route.stop_ids.clone())
            .unwrap_or_default()
    }

    fn stop_coordinates(&self, stop_id: StopId) -> Option<Point<f64>> {
        self.stops.get(&stop_id).map(Stop::location)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransportClass;

    fn stop(name: &str, x: f64, y: f64) -> StopDraft {
        StopDraft {
            id: None,
            name: name.to_string(),
            x,
            y,
        }
    }

    #[test]
    fn inserts_assign_increasing_ids() {
        let mut store = NetworkStore::new();
        let a = store.upsert_stop(stop("A", 0.0, 0.0)).unwrap();
        let b = store.upsert_stop(stop("B", 1.0, 0.0)).unwrap();
        assert_eq!((a, b), (1, 2));

        let zero_id = StopDraft {
            id: Some(0),
            ..stop("C", 2.0, 0.0)
        };
        assert_eq!(store.upsert_stop(zero_id).unwrap(), 3);
    }

    #[test]
    fn update_keeps_id_and_rejects_unknown() {
        let mut store = NetworkStore::new();
        let id = store.upsert_stop(stop("A", 0.0, 0.0)).unwrap();
        store
            .upsert_stop(StopDraft {
                id: Some(id),
                ..stop("A'", 5.0, 5.0)
            })
            .unwrap();
        assert_eq!(store.stop(id).unwrap().name, "A'");
        assert_eq!(store.stop_count(), 1);

        let missing = store.upsert_stop(StopDraft {
            id: Some(42),
            ..stop("X", 0.0, 0.0)
        });
        assert!(matches!(missing, Err(Error::UnknownStop(42))));
    }

    #[test]
    fn renaming_route_relabels_its_vehicles() {
        let mut store = NetworkStore::new();
        let route = store
            .upsert_route(RouteDraft {
                id: None,
                name: "Old".to_string(),
                class: TransportClass::Bus,
                stop_ids: vec![],
            })
            .unwrap();
        let vehicle = store
            .upsert_vehicle(VehicleDraft {
                id: None,
                route_id: route,
                class: TransportClass::Bus,
                avg_speed: 30.0,
                route_name: String::new(),
            })
            .unwrap();
        assert_eq!(store.vehicle(vehicle).unwrap().route_name, "Old");

        store
            .upsert_route(RouteDraft {
                id: Some(route),
                name: "New".to_string(),
                class: TransportClass::Bus,
                stop_ids: vec![],
            })
            .unwrap();
        assert_eq!(store.vehicle(vehicle).unwrap().route_name, "New");
    }

    #[test]
    fn unknown_route_has_empty_sequence() {
        let store = NetworkStore::new();
        assert!(store.route_stop_sequence(7).is_empty());
        assert!(store.stop_coordinates(7).is_none());
    }

    #[test]
    fn snapshot_restores_id_counters() {
        let mut store = NetworkStore::new();
        store.upsert_stop(stop("A", 0.0, 0.0)).unwrap();
        store.upsert_stop(stop("B", 0.0, 0.0)).unwrap();

        let json = serde_json::to_string(&store).unwrap();
        let mut restored: NetworkStore = serde_json::from_str(&json).unwrap();
        assert_eq!(restored.stop_count(), 2);
        assert_eq!(restored.upsert_stop(stop("C", 0.0, 0.0)).unwrap(), 3);
    }

    fn snapshot_with_stop(id: StopId) -> NetworkSnapshot {
        NetworkSnapshot {
            stops: vec![Stop {
                id,
                name: "Edge".to_string(),
                x: 0.0,
                y: 0.0,
            }],
            ..NetworkSnapshot::default()
        }
    }

    #[test]
    fn snapshot_rejects_reserved_and_overflowing_ids() {
        let zero = NetworkStore::try_from(snapshot_with_stop(0));
        assert!(matches!(zero, Err(Error::InvalidData(_))));

        let max = NetworkStore::try_from(snapshot_with_stop(u32::MAX));
        assert!(matches!(max, Err(Error::InvalidData(_))));

        let mut last = NetworkStore::try_from(snapshot_with_stop(u32::MAX - 1)).unwrap();
        let refused = last.upsert_stop(stop("Beyond", 0.0, 0.0));
        assert!(matches!(refused, Err(Error::InvalidData(_))));
        assert_eq!(last.stop_count(), 1);
    }
}
