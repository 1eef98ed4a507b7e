use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use log::{debug, info, warn};

use super::config::NetworkConfig;
use super::sample::sample_network;
use crate::model::network::store::NetworkSnapshot;
use crate::{Error, NetworkStore};

/// Creates the network store described by the configuration
///
/// # Errors
///
/// Returns an error if the configured snapshot cannot be read or parsed
pub fn create_network(config: &NetworkConfig) -> Result<NetworkStore, Error> {
    let store = match &config.path {
        Some(path) => load_network(path)?,
        None => {
            info!("No network file configured, using the sample network");
            sample_network()
        }
    };

    info!(
        "Network ready: {} stops, {} routes, {} vehicles",
        store.stop_count(),
        store.route_count(),
        store.vehicle_count()
    );
    validate_references(&store);
    Ok(store)
}

/// Reads a JSON network snapshot from disk
///
/// # Errors
///
/// Returns [`Error::IoError`] if the file cannot be opened and
/// [`Error::InvalidData`] if it is not a valid snapshot
pub fn load_network(path: &Path) -> Result<NetworkStore, Error> {
    if !path.exists() {
        return Err(Error::IoError(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("Network file not found: {}", path.display()),
        )));
    }

    info!("Loading network from {}", path.display());
    let reader = BufReader::new(File::open(path)?);
    let snapshot: NetworkSnapshot = serde_json::from_reader(reader)?;
    NetworkStore::try_from(snapshot)
}

/// Writes the store as a JSON snapshot readable by [`load_network`].
///
/// The snapshot goes to a sibling temporary file first and is then renamed
/// over `path`, so a failed write leaves the previous file intact.
///
/// # Errors
///
/// Returns [`Error::IoError`] if the file cannot be written
pub fn save_network(path: &Path, store: &NetworkStore) -> Result<(), Error> {
    let staging = path.with_extension("json.tmp");
    {
        let mut writer = BufWriter::new(File::create(&staging)?);
        serde_json::to_writer_pretty(&mut writer, store)?;
        writer.flush()?;
    }
    fs::rename(&staging, path)?;
    debug!(
        "Saved network to {} ({} stops, {} routes, {} vehicles)",
        path.display(),
        store.stop_count(),
        store.route_count(),
        store.vehicle_count()
    );
    Ok(())
}

/// Reports dangling references. They are not fatal: vehicles on routes
/// without stops are simply not simulated.
fn validate_references(store: &NetworkStore) {
    for route in store.routes() {
        let missing = route
            .stop_ids
            .iter()
            .filter(|&&stop| store.stop(stop).is_none())
            .count();
        if missing > 0 {
            warn!(
                "Route {} ({}) references {missing} unknown stop(s)",
                route.id, route.name
            );
        }
    }

    for vehicle in store.vehicles() {
        if store.route(vehicle.route_id).is_none() {
            warn!(
                "Vehicle {} is assigned to unknown route {}",
                vehicle.id, vehicle.route_id
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StopDraft;

    #[test]
    fn missing_file_is_io_error() {
        let result = load_network(Path::new("/definitely/not/here.json"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn loads_snapshot_from_disk() {
        let path = std::env::temp_dir().join(format!("transim-net-{}.json", std::process::id()));
        let mut file = File::create(&path).unwrap();
        write!(
            file,
            r#"{{
                "stops": [{{"id": 1, "name": "A", "x": 0.0, "y": 0.0}},
                          {{"id": 2, "name": "B", "x": 10.0, "y": 0.0}}],
                "routes": [{{"id": 1, "name": "Line", "type": "tram", "stop_ids": [1, 2]}}],
                "vehicles": [{{"id": 1, "route_id": 1, "type": "tram", "avg_speed": 20.0, "route_name": "Line"}}]
            }}"#
        )
        .unwrap();

        let store = create_network(&NetworkConfig {
            path: Some(path.clone()),
        })
        .unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(store.stop_count(), 2);
        assert_eq!(store.route(1).unwrap().stop_ids, vec![1, 2]);
        assert_eq!(store.vehicle(1).unwrap().route_name, "Line");
    }

    #[test]
    fn malformed_snapshot_is_invalid_data() {
        let path =
            std::env::temp_dir().join(format!("transim-bad-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        let result = load_network(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn out_of_range_id_is_invalid_data() {
        let path =
            std::env::temp_dir().join(format!("transim-maxid-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"stops": [{"id": 4294967295, "name": "Edge", "x": 0.0, "y": 0.0}]}"#,
        )
        .unwrap();
        let result = load_network(&path);
        std::fs::remove_file(&path).unwrap();
        assert!(matches!(result, Err(Error::InvalidData(_))));
    }

    #[test]
    fn saved_network_loads_back_with_edits() {
        let path =
            std::env::temp_dir().join(format!("transim-save-{}.json", std::process::id()));
        let mut store = sample_network();
        let depot = store
            .upsert_stop(StopDraft {
                id: None,
                name: "Depot".to_string(),
                x: 90.0,
                y: 10.0,
            })
            .unwrap();

        save_network(&path, &store).unwrap();
        let mut restored = load_network(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(depot, 9);
        assert_eq!(restored.stop_count(), 9);
        assert_eq!(restored.stop(depot).unwrap().name, "Depot");
        assert_eq!(restored.vehicles(), store.vehicles());
        let next = restored
            .upsert_stop(StopDraft {
                id: None,
                name: "Yard".to_string(),
                x: 0.0,
                y: 0.0,
            })
            .unwrap();
        assert_eq!(next, 10);
    }
}
