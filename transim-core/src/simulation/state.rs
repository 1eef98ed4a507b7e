//! Per-vehicle motion state machine

use std::sync::Arc;

use geo::Point;
use thiserror::Error;

use super::live::LivePosition;
use super::route_path::{Direction, RoutePath};
use crate::{RouteId, StopId, TransportClass, Vehicle, VehicleId, VehicleKinematics};

/// Distance, in plane units, under which a vehicle counts as arrived
pub const ARRIVAL_THRESHOLD: f64 = 0.5;

/// Fixed divisor turning meters per second into plane units per second
/// (one plane unit is taken as roughly 100 m).
pub const PLANE_UNIT_SCALE: f64 = 0.1;

/// Converts km/h into plane units per second
pub fn units_per_second(speed_kmh: f64) -> f64 {
    (speed_kmh / 3.6) / PLANE_UNIT_SCALE
}

fn distance(a: Point<f64>, b: Point<f64>) -> f64 {
    let d = b - a;
    d.x().hypot(d.y())
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Route {0} has no stops")]
    EmptyRoute(RouteId),
    #[error("Stop {0} has no coordinates")]
    UnresolvedStop(StopId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MotionPhase {
    /// Stationary at a stop until the dwell countdown runs out
    Dwelling,
    /// Moving towards the target stop
    Traveling,
}

/// Motion state of one simulated vehicle.
///
/// Transport class, speed and route label are cached here at initialization
/// so that ticking never goes back to storage.
#[derive(Debug, Clone)]
pub struct VehicleState {
    vehicle_id: VehicleId,
    class: TransportClass,
    kinematics: VehicleKinematics,
    avg_speed: f64,
    route_name: String,
    path: Arc<RoutePath>,

    position: Point<f64>,
    target: Point<f64>,
    current_stop_idx: usize,
    progress: f64,
    direction: Direction,
    dwell_remaining: f64,
    /// Length of the current leg, fixed when the leg starts
    leg_length: f64,
    stalled: bool,
}

impl VehicleState {
    /// Places a vehicle on the first stop of its route, heading for the second
    /// one (or staying put on a single-stop route).
    ///
    /// # Errors
    ///
    /// [`StateError::EmptyRoute`] if the route has no stops and
    /// [`StateError::UnresolvedStop`] if either of the first two stops has no
    /// coordinates.
    pub fn initialize(vehicle: &Vehicle, path: Arc<RoutePath>) -> Result<Self, StateError> {
        if path.is_empty() {
            return Err(StateError::EmptyRoute(vehicle.route_id));
        }

        let direction = Direction::Forward;
        let target_idx = direction.step(0, path.len());
        let position = path
            .location(0)
            .ok_or(StateError::UnresolvedStop(path.stop_id(0).unwrap_or_default()))?;
        let target = path.location(target_idx).ok_or(StateError::UnresolvedStop(
            path.stop_id(target_idx).unwrap_or_default(),
        ))?;

        Ok(VehicleState {
            vehicle_id: vehicle.id,
            class: vehicle.class,
            kinematics: vehicle.class.kinematics(),
            avg_speed: vehicle.avg_speed,
            route_name: vehicle.route_name.clone(),
            path,
            position,
            target,
            current_stop_idx: 0,
            progress: 0.0,
            direction,
            dwell_remaining: 0.0,
            leg_length: distance(position, target),
            stalled: false,
        })
    }

    /// Advances the vehicle by `delta_time` simulated seconds.
    ///
    /// # Errors
    ///
    /// [`StateError::UnresolvedStop`] when the stop after the one just reached
    /// has no coordinates. The state is left untouched in that case.
    pub fn advance(&mut self, delta_time: f64) -> Result<(), StateError> {
        if self.dwell_remaining > 0.0 {
            self.dwell_remaining -= delta_time;
            if self.dwell_remaining <= 0.0 {
                self.dwell_remaining = 0.0;
            }
            return Ok(());
        }

        let displacement = self.target - self.position;
        let remaining = distance(self.position, self.target);

        if remaining < ARRIVAL_THRESHOLD {
            return self.arrive();
        }

        let step = (units_per_second(self.effective_speed()) * delta_time).max(0.0);
        let ratio = (step / remaining).min(1.0);
        self.position = self.position + displacement * ratio;

        if self.leg_length > 0.0 {
            let traveled = self.leg_length - distance(self.position, self.target);
            self.progress = (traveled / self.leg_length).clamp(0.0, 1.0);
        }
        Ok(())
    }

    fn arrive(&mut self) -> Result<(), StateError> {
        let len = self.path.len();
        let arrived_idx = self.direction.step(self.current_stop_idx, len);
        let next_idx = self.direction.step(arrived_idx, len);
        let next_target = self.path.location(next_idx).ok_or(StateError::UnresolvedStop(
            self.path.stop_id(next_idx).unwrap_or_default(),
        ))?;

        log::trace!(
            "{} vehicle {} arrived at stop index {arrived_idx}",
            self.class.icon(),
            self.vehicle_id
        );

        self.position = self.target;
        self.progress = 0.0;
        self.dwell_remaining = self.kinematics.dwell_secs;
        self.current_stop_idx = arrived_idx;
        self.target = next_target;
        self.leg_length = distance(self.position, self.target);
        self.stalled = false;
        Ok(())
    }

    /// Flags the vehicle as stuck, returning `true` the first time
    pub fn mark_stalled(&mut self) -> bool {
        !std::mem::replace(&mut self.stalled, true)
    }

    /// Same route geometry, class and speed: the motion can carry over
    pub fn same_plan(&self, other: &VehicleState) -> bool {
        self.class == other.class
            && self.avg_speed.to_bits() == other.avg_speed.to_bits()
            && (Arc::ptr_eq(&self.path, &other.path) || *self.path == *other.path)
    }

    /// Copies display labels from a freshly initialized state
    pub fn refresh_labels(&mut self, fresh: &VehicleState) {
        self.route_name.clone_from(&fresh.route_name);
    }

    pub fn phase(&self) -> MotionPhase {
        if self.dwell_remaining > 0.0 {
            MotionPhase::Dwelling
        } else {
            MotionPhase::Traveling
        }
    }

    /// Index the vehicle is heading to after the current stop
    pub fn next_stop_idx(&self) -> usize {
        self.direction.step(self.current_stop_idx, self.path.len())
    }

    pub fn live_position(&self) -> LivePosition {
        LivePosition {
            vehicle_id: self.vehicle_id,
            x: self.position.x(),
            y: self.position.y(),
            current_stop_index: self.current_stop_idx,
            next_stop_index: self.next_stop_idx(),
            route_name: self.route_name.clone(),
            class: self.class,
            progress: self.progress,
        }
    }

    /// Speed after the class multiplier, km/h
    pub fn effective_speed(&self) -> f64 {
        self.kinematics.effective_speed(self.avg_speed)
    }

    pub fn vehicle_id(&self) -> VehicleId {
        self.vehicle_id
    }

    pub fn class(&self) -> TransportClass {
        self.class
    }

    pub fn route_name(&self) -> &str {
        &self.route_name
    }

    pub fn path(&self) -> &RoutePath {
        &self.path
    }

    pub fn position(&self) -> Point<f64> {
        self.position
    }

    pub fn target(&self) -> Point<f64> {
        self.target
    }

    pub fn current_stop_idx(&self) -> usize {
        self.current_stop_idx
    }

    pub fn progress(&self) -> f64 {
        self.progress
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn dwell_remaining(&self) -> f64 {
        self.dwell_remaining
    }
}
