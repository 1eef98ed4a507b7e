use geo::Point;

use super::types::Vehicle;
use crate::{RouteId, StopId};

/// Read-only view of the network consulted when (re)building vehicle state.
///
/// The engine only calls it during initialization and reloads, never from the
/// tick loop.
pub trait NetworkSource {
    /// Every vehicle record, in no particular order
    fn list_vehicles(&self) -> Vec<Vehicle>;

    /// Ordered stop ids of a route, empty if the route is unknown
    fn route_stop_sequence(&self, route_id: RouteId) -> Vec<StopId>;

    /// Plane coordinates of a stop, `None` if the stop is unknown
    fn stop_coordinates(&self, stop_id: StopId) -> Option<Point<f64>>;
}

impl<T: NetworkSource + ?Sized> NetworkSource for &T {
    fn list_vehicles(&self) -> Vec<Vehicle> {
        (**self).list_vehicles()
    }

    fn route_stop_sequence(&self, route_id: RouteId) -> Vec<StopId> {
        (**self).route_stop_sequence(route_id)
    }

    fn stop_coordinates(&self, stop_id: StopId) -> Option<Point<f64>> {
        (**self).stop_coordinates(stop_id)
    }
}
