use geo::Point;

use crate::{NetworkSource, RouteId, StopId};

/// Traversal direction along a route loop.
///
/// Only [`Direction::Forward`] is ever used by the engine today. The backward
/// wraparound is kept for a future reversal policy and has not been validated
/// against real runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    #[default]
    Forward,
    Backward,
}

impl Direction {
    /// Index of the neighbouring stop in this direction on a loop of `len` stops
    pub fn step(self, idx: usize, len: usize) -> usize {
        if len == 0 {
            return 0;
        }
        match self {
            Direction::Forward => (idx + 1) % len,
            Direction::Backward => (idx + len - 1) % len,
        }
    }
}

/// Ordered stops of a route with coordinates resolved once from the source.
///
/// Stops the source could not resolve are kept as `None` so that the
/// inconsistency surfaces on the vehicle that reaches them.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutePath {
    route_id: RouteId,
    stops: Vec<(StopId, Option<Point<f64>>)>,
}

impl RoutePath {
    pub fn resolve<S: NetworkSource + ?Sized>(source: &S, route_id: RouteId) -> Self {
        let stops = source
            .route_stop_sequence(route_id)
            .into_iter()
            .map(|stop| (stop, source.stop_coordinates(stop)))
            .collect();
        RoutePath { route_id, stops }
    }

    pub fn route_id(&self) -> RouteId {
        self.route_id
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop_id(&self, idx: usize) -> Option<StopId> {
        self.stops.get(idx).map(|(stop, _)| *stop)
    }

    pub fn location(&self, idx: usize) -> Option<Point<f64>> {
        self.stops.get(idx).and_then(|(_, location)| *location)
    }

    /// Stops whose coordinates could not be resolved
    pub fn unresolved(&self) -> impl Iterator<Item = StopId> + '_ {
        self.stops
            .iter()
            .filter(|(_, location)| location.is_none())
            .map(|(stop, _)| *stop)
    }
}

impl FromIterator<(StopId, Point<f64>)> for RoutePath {
    /// Builds a path that does not belong to a stored route, mostly for tests
    fn from_iter<I: IntoIterator<Item = (StopId, Point<f64>)>>(iter: I) -> Self {
        RoutePath {
            route_id: 0,
            stops: iter
                .into_iter()
                .map(|(stop, location)| (stop, Some(location)))
                .collect(),
        }
    }
}
