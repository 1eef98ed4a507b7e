//! Simulation engine and its background tick loop

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::thread::{self, JoinHandle};
use std::time::Instant;

use hashbrown::HashMap;
use log::{debug, error, info, trace, warn};

use super::config::EngineConfig;
use super::live::{LivePosition, LivePositionStore};
use super::route_path::RoutePath;
use super::state::{StateError, VehicleState};
use crate::{Error, NetworkSource, RouteId, VehicleId};

/// Everything the tick loop mutates, guarded by one lock
#[derive(Debug, Default)]
struct World {
    vehicles: BTreeMap<VehicleId, VehicleState>,
    live: LivePositionStore,
    ticks: u64,
}

impl World {
    fn tick(&mut self, delta_time: f64) {
        let World {
            vehicles,
            live,
            ticks,
        } = self;

        for state in vehicles.values_mut() {
            match state.advance(delta_time) {
                Ok(()) => live.publish(state.live_position()),
                Err(err) => {
                    if state.mark_stalled() {
                        error!(
                            "Vehicle {} on route {} stalled: {err}",
                            state.vehicle_id(),
                            state.path().route_id()
                        );
                    }
                }
            }
        }
        *ticks += 1;
    }
}

#[derive(Debug)]
struct Shared {
    world: RwLock<World>,
    running: AtomicBool,
    paused: AtomicBool,
    config: EngineConfig,
}

impl Shared {
    fn read(&self) -> RwLockReadGuard<'_, World> {
        self.world.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, World> {
        self.world.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Owns every [`VehicleState`] and publishes their live positions.
///
/// Lifecycle: build with [`SimulationEngine::with_source`], then
/// [`start`](Self::start) the tick thread and [`resume`](Self::resume) motion
/// (engines start paused by default). Dropping the engine stops the thread.
#[derive(Debug)]
pub struct SimulationEngine {
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl SimulationEngine {
    /// Engine without vehicles, see [`reload`](Self::reload)
    pub fn new(config: EngineConfig) -> Self {
        let paused = config.start_paused;
        SimulationEngine {
            shared: Arc::new(Shared {
                world: RwLock::new(World::default()),
                running: AtomicBool::new(false),
                paused: AtomicBool::new(paused),
                config,
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn with_source<S: NetworkSource + ?Sized>(source: &S, config: EngineConfig) -> Self {
        let engine = Self::new(config);
        engine.reload(source);
        engine
    }

    pub fn config(&self) -> &EngineConfig {
        &self.shared.config
    }

    /// Rebuilds vehicle states from the source and returns how many vehicles
    /// are simulated.
    ///
    /// Vehicles whose route has no stops are left out on purpose and never
    /// show up in live positions. Vehicles whose route geometry, class and
    /// speed did not change keep their current motion. The swap happens under
    /// the tick lock, so it never interleaves with a tick.
    pub fn reload<S: NetworkSource + ?Sized>(&self, source: &S) -> usize {
        let fresh = build_states(source);

        let mut world = self.shared.write();
        let mut previous = std::mem::take(&mut world.vehicles);
        let mut preserved = 0;

        let vehicles: BTreeMap<VehicleId, VehicleState> = fresh
            .into_iter()
            .map(|(id, state)| match previous.remove(&id) {
                Some(mut old) if old.same_plan(&state) => {
                    old.refresh_labels(&state);
                    preserved += 1;
                    (id, old)
                }
                _ => (id, state),
            })
            .collect();

        world.live.clear();
        for state in vehicles.values() {
            world.live.publish(state.live_position());
        }
        world.vehicles = vehicles;

        let count = world.vehicles.len();
        info!(
            "Simulation loaded {count} vehicles ({preserved} kept their motion, {} removed)",
            previous.len()
        );
        count
    }

    /// Spawns the tick thread. Does nothing if it is already running.
    ///
    /// # Errors
    ///
    /// Returns [`Error::SpawnError`] if the OS refuses to create the thread
    pub fn start(&self) -> Result<(), Error> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Ok(());
        }

        let shared = Arc::clone(&self.shared);
        let handle = thread::Builder::new()
            .name("simulation-tick".to_string())
            .spawn(move || run_loop(&shared))
            .map_err(|err| {
                self.shared.running.store(false, Ordering::Release);
                Error::SpawnError(err)
            })?;
        *worker = Some(handle);

        info!(
            "Simulation started ({} ms ticks, {}s step, paused: {})",
            self.shared.config.tick_interval_ms,
            self.shared.config.delta_time,
            self.is_paused()
        );
        Ok(())
    }

    /// Halts the tick thread and waits for it to exit. Does nothing if it is
    /// not running.
    pub fn stop(&self) {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if !self.shared.running.swap(false, Ordering::AcqRel) {
            return;
        }

        if let Some(handle) = worker.take() {
            if handle.join().is_err() {
                error!("Simulation thread panicked");
            }
        }
        info!("Simulation stopped after {} ticks", self.tick_count());
    }

    pub fn pause(&self) {
        if !self.shared.paused.swap(true, Ordering::AcqRel) {
            debug!("Simulation paused");
        }
    }

    pub fn resume(&self) {
        if self.shared.paused.swap(false, Ordering::AcqRel) {
            debug!("Simulation resumed");
        }
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    pub fn is_paused(&self) -> bool {
        self.shared.paused.load(Ordering::Acquire)
    }

    /// Runs one tick on the calling thread, ignoring the pause flag
    pub fn tick(&self) {
        self.shared.write().tick(self.shared.config.delta_time);
    }

    pub fn tick_count(&self) -> u64 {
        self.shared.read().ticks
    }

    pub fn vehicle_count(&self) -> usize {
        self.shared.read().vehicles.len()
    }

    /// Every live position as of the last completed tick
    pub fn live_positions(&self) -> Vec<LivePosition> {
        self.shared.read().live.snapshot()
    }

    /// Live position of one vehicle, `None` if it is not simulated
    pub fn live_position(&self, vehicle_id: VehicleId) -> Option<LivePosition> {
        self.shared.read().live.get(vehicle_id).cloned()
    }

    pub fn vehicle_state(&self, vehicle_id: VehicleId) -> Option<VehicleState> {
        self.shared.read().vehicles.get(&vehicle_id).cloned()
    }
}

impl Drop for SimulationEngine {
    fn drop(&mut self) {
        self.stop();
    }
}

fn build_states<S: NetworkSource + ?Sized>(source: &S) -> BTreeMap<VehicleId, VehicleState> {
    let mut paths: HashMap<RouteId, Arc<RoutePath>> = HashMap::new();
    let mut states = BTreeMap::new();

    for vehicle in source.list_vehicles() {
        let path = Arc::clone(
            paths
                .entry(vehicle.route_id)
                .or_insert_with(|| Arc::new(RoutePath::resolve(source, vehicle.route_id))),
        );

        match VehicleState::initialize(&vehicle, path) {
            Ok(state) => {
                states.insert(vehicle.id, state);
            }
            Err(StateError::EmptyRoute(route)) => {
                debug!(
                    "Vehicle {} not simulated: route {route} has no stops",
                    vehicle.id
                );
            }
            Err(err) => warn!("Vehicle {} not simulated: {err}", vehicle.id),
        }
    }

    for path in paths.values() {
        let missing: Vec<_> = path.unresolved().collect();
        if !missing.is_empty() {
            warn!(
                "Route {} references stops without coordinates: {missing:?}",
                path.route_id()
            );
        }
    }

    states
}

fn run_loop(shared: &Shared) {
    let interval = shared.config.tick_interval();
    let pause_poll = shared.config.pause_poll();
    let delta_time = shared.config.delta_time;

    while shared.running.load(Ordering::Acquire) {
        if shared.paused.load(Ordering::Acquire) {
            thread::sleep(pause_poll);
            continue;
        }

        let started = Instant::now();
        shared.write().tick(delta_time);
        let elapsed = started.elapsed();

        // A slow tick is followed immediately by the next one, no catch-up
        match interval.checked_sub(elapsed) {
            Some(rest) => thread::sleep(rest),
            None => trace!("Tick took {elapsed:?}, over the {interval:?} budget"),
        }
    }
    debug!("Simulation loop exited");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{RouteDraft, TransportClass, sample_network};

    fn fast_config() -> EngineConfig {
        EngineConfig {
            tick_interval_ms: 1,
            pause_poll_ms: 1,
            ..EngineConfig::default()
        }
    }

    #[test]
    fn starts_stopped_and_paused() {
        let engine = SimulationEngine::with_source(&sample_network(), fast_config());
        assert!(!engine.is_running());
        assert!(engine.is_paused());
        assert_eq!(engine.vehicle_count(), 8);
        assert_eq!(engine.live_positions().len(), 8);
    }

    #[test]
    fn start_and_stop_are_idempotent() {
        let engine = SimulationEngine::with_source(&sample_network(), fast_config());
        engine.stop();
        engine.start().unwrap();
        engine.start().unwrap();
        assert!(engine.is_running());
        engine.stop();
        engine.stop();
        assert!(!engine.is_running());

        engine.start().unwrap();
        assert!(engine.is_running());
    }

    #[test]
    fn manual_tick_counts() {
        let engine = SimulationEngine::with_source(&sample_network(), fast_config());
        engine.tick();
        engine.tick();
        assert_eq!(engine.tick_count(), 2);
    }

    #[test]
    fn reload_keeps_motion_of_unchanged_vehicles() {
        let mut store = sample_network();
        let engine = SimulationEngine::with_source(&store, fast_config());
        for _ in 0..3 {
            engine.tick();
        }
        let moved_v1 = engine.live_position(1).unwrap();
        let moved_v3 = engine.live_position(3).unwrap();

        // Re-route the tram line (route 2, vehicle 3) and rename it
        store
            .upsert_route(RouteDraft {
                id: Some(2),
                name: "Tram 2".to_string(),
                class: TransportClass::Tram,
                stop_ids: vec![7, 1],
            })
            .unwrap();
        assert_eq!(engine.reload(&store), 8);

        assert_eq!(engine.live_position(1).unwrap(), moved_v1);
        let reset_v3 = engine.live_position(3).unwrap();
        assert_ne!(reset_v3, moved_v3);
        assert_eq!((reset_v3.x, reset_v3.y), (40.0, 50.0));
        assert_eq!(reset_v3.route_name, "Tram 2");
    }

    #[test]
    fn reload_drops_vehicles_whose_route_lost_its_stops() {
        let mut store = sample_network();
        let engine = SimulationEngine::with_source(&store, fast_config());
        store
            .upsert_route(RouteDraft {
                id: Some(5),
                name: "Route 5".to_string(),
                class: TransportClass::Tram,
                stop_ids: vec![],
            })
            .unwrap();

        assert_eq!(engine.reload(&store), 7);
        assert!(engine.live_position(6).is_none());
        assert!(engine.vehicle_state(6).is_none());
    }
}
