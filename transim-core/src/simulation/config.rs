use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Wall-clock budget of one tick
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 100;
/// Simulated seconds per tick, independent of measured wall time
pub const DEFAULT_DELTA_TIME: f64 = 0.1;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub tick_interval_ms: u64,
    pub delta_time: f64,
    /// Sleep between flag checks while paused
    pub pause_poll_ms: u64,
    /// A started engine stays frozen until resumed
    pub start_paused: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            delta_time: DEFAULT_DELTA_TIME,
            pause_poll_ms: DEFAULT_TICK_INTERVAL_MS,
            start_paused: true,
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn pause_poll(&self) -> Duration {
        Duration::from_millis(self.pause_poll_ms)
    }
}
