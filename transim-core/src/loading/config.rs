use std::path::PathBuf;

use serde::Deserialize;

/// Where the network comes from at startup
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// JSON snapshot with `stops`, `routes` and `vehicles`.
    /// The sample network is used when unset.
    pub path: Option<PathBuf>,
}
