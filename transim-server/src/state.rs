use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use transim_core::prelude::{Error, NetworkStore, SimulationEngine, save_network};

/// Shared handles passed to every request handler
#[derive(Debug, Clone)]
pub struct AppState {
    store: Arc<RwLock<NetworkStore>>,
    engine: Arc<SimulationEngine>,
    network_file: Option<Arc<PathBuf>>,
}

impl AppState {
    pub fn new(store: NetworkStore, engine: Arc<SimulationEngine>) -> Self {
        AppState {
            store: Arc::new(RwLock::new(store)),
            engine,
            network_file: None,
        }
    }

    /// Writes the network back to `path` after every successful edit
    pub fn with_network_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.network_file = Some(Arc::new(path.into()));
        self
    }

    pub fn network_file(&self) -> Option<&Path> {
        self.network_file.as_deref().map(PathBuf::as_path)
    }

    pub fn engine(&self) -> &SimulationEngine {
        &self.engine
    }

    pub fn store(&self) -> RwLockReadGuard<'_, NetworkStore> {
        self.store.read().unwrap_or_else(PoisonError::into_inner)
    }

    /// Applies an edit to the store and, if it succeeded, rebuilds the
    /// affected vehicle states and saves the network file when one is set.
    ///
    /// A failed save is logged and does not undo the edit.
    pub fn edit_network<T>(
        &self,
        edit: impl FnOnce(&mut NetworkStore) -> Result<T, Error>,
    ) -> Result<T, Error> {
        let mut store: RwLockWriteGuard<'_, NetworkStore> =
            self.store.write().unwrap_or_else(PoisonError::into_inner);
        let result = edit(&mut store)?;
        self.engine.reload(&*store);
        if let Some(path) = self.network_file()
            && let Err(err) = save_network(path, &store)
        {
            tracing::warn!(path = %path.display(), "Failed to save network: {err}");
        }
        Ok(result)
    }
}
