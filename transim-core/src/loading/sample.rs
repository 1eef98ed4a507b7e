use log::error;

use crate::model::network::store::NetworkSnapshot;
use crate::{NetworkStore, Route, Stop, TransportClass, Vehicle};

const STOPS: [(&str, f64, f64); 8] = [
    ("Central Square", 50.0, 50.0),
    ("Library", 60.0, 45.0),
    ("City Park", 70.0, 55.0),
    ("Old Town", 45.0, 60.0),
    ("Shopping Mall", 55.0, 65.0),
    ("University", 65.0, 40.0),
    ("Hospital", 40.0, 50.0),
    ("Train Station", 50.0, 35.0),
];

const ROUTES: [(&str, TransportClass, &[u32]); 5] = [
    ("Route 1", TransportClass::Bus, &[1, 2, 3, 5, 1]),
    ("Route 2", TransportClass::Tram, &[1, 4, 7, 1]),
    ("Route 3", TransportClass::Trolleybus, &[2, 6, 3, 8, 2]),
    ("Route 4", TransportClass::Bus, &[5, 3, 6, 1, 5]),
    ("Route 5", TransportClass::Tram, &[8, 1, 4, 5, 8]),
];

// (route, class, km/h)
const VEHICLES: [(u32, TransportClass, f64); 8] = [
    (1, TransportClass::Bus, 40.0),
    (1, TransportClass::Bus, 35.0),
    (2, TransportClass::Tram, 30.0),
    (3, TransportClass::Trolleybus, 32.0),
    (4, TransportClass::Bus, 38.0),
    (5, TransportClass::Tram, 28.0),
    (4, TransportClass::Bus, 42.0),
    (3, TransportClass::Trolleybus, 30.0),
];

/// Small demo city: 8 stops, 5 looping routes and 8 vehicles
pub fn sample_network() -> NetworkStore {
    let stops = (1..)
        .zip(STOPS)
        .map(|(id, (name, x, y))| Stop {
            id,
            name: name.to_string(),
            x,
            y,
        })
        .collect();

    let routes = (1..)
        .zip(ROUTES)
        .map(|(id, (name, class, stop_ids))| Route {
            id,
            name: name.to_string(),
            class,
            stop_ids: stop_ids.to_vec(),
        })
        .collect();

    let vehicles = (1..)
        .zip(VEHICLES)
        .map(|(id, (route_id, class, avg_speed))| Vehicle {
            id,
            route_id,
            class,
            avg_speed,
            route_name: ROUTES[route_id as usize - 1].0.to_string(),
        })
        .collect();

    let snapshot = NetworkSnapshot {
        stops,
        routes,
        vehicles,
    };
    NetworkStore::try_from(snapshot).unwrap_or_else(|err| {
        error!("Sample network rejected: {err}");
        NetworkStore::new()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NetworkSource;

    #[test]
    fn sample_is_consistent() {
        let store = sample_network();
        assert_eq!(store.stop_count(), 8);
        assert_eq!(store.route_count(), 5);
        assert_eq!(store.vehicle_count(), 8);

        for vehicle in store.vehicles() {
            let route = store.route(vehicle.route_id).unwrap();
            assert_eq!(vehicle.route_name, route.name);
            for stop in store.route_stop_sequence(route.id) {
                assert!(store.stop_coordinates(stop).is_some());
            }
        }
    }
}
