use std::fmt;
use std::str::FromStr;

use geo::Point;
use serde::{Deserialize, Serialize};

use crate::{Error, RouteId, StopId, VehicleId};

/// Kind of vehicle operating a route.
///
/// Parsing from storage labels is lenient: anything that is not a known
/// label behaves like a bus. Use [`FromStr`] for strict parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum TransportClass {
    #[default]
    Bus,
    Tram,
    Trolleybus,
}

impl TransportClass {
    pub const ALL: [TransportClass; 3] = [
        TransportClass::Bus,
        TransportClass::Tram,
        TransportClass::Trolleybus,
    ];

    /// Lenient conversion, unknown labels fall back to [`TransportClass::Bus`]
    pub fn from_label(label: &str) -> Self {
        label.parse().unwrap_or_default()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            TransportClass::Bus => "bus",
            TransportClass::Tram => "tram",
            TransportClass::Trolleybus => "trolleybus",
        }
    }

    /// Glyph used in log lines
    pub fn icon(self) -> &'static str {
        match self {
            TransportClass::Bus => "🚌",
            TransportClass::Tram => "🚊",
            TransportClass::Trolleybus => "🚎",
        }
    }
}

impl FromStr for TransportClass {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "bus" => Ok(TransportClass::Bus),
            "tram" => Ok(TransportClass::Tram),
            "trolleybus" => Ok(TransportClass::Trolleybus),
            _ => Err(Error::UnknownTransportClass(s.to_string())),
        }
    }
}

impl From<String> for TransportClass {
    fn from(label: String) -> Self {
        TransportClass::from_label(&label)
    }
}

impl fmt::Display for TransportClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stop on the abstract plane (one unit is roughly 100 meters)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stop {
    pub id: StopId,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

impl Stop {
    pub fn location(&self) -> Point<f64> {
        Point::new(self.x, self.y)
    }
}

/// A closed loop of stops served by one transport class.
///
/// The last stop implicitly connects back to the first one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub id: RouteId,
    pub name: String,
    #[serde(rename = "type")]
    pub class: TransportClass,
    #[serde(default)]
    pub stop_ids: Vec<StopId>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    pub id: VehicleId,
    pub route_id: RouteId,
    #[serde(rename = "type")]
    pub class: TransportClass,
    /// Nominal average speed, km/h
    pub avg_speed: f64,
    /// Display label mirroring the name of the assigned route
    #[serde(default)]
    pub route_name: String,
}

/// Create-or-update payload for a stop. Missing or zero id inserts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StopDraft {
    #[serde(default)]
    pub id: Option<StopId>,
    pub name: String,
    pub x: f64,
    pub y: f64,
}

/// Create-or-update payload for a route. Missing or zero id inserts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteDraft {
    #[serde(default)]
    pub id: Option<RouteId>,
    pub name: String,
    #[serde(rename = "type")]
    pub class: TransportClass,
    #[serde(default)]
    pub stop_ids: Vec<StopId>,
}

/// Create-or-update payload for a vehicle. Missing or zero id inserts.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VehicleDraft {
    #[serde(default)]
    pub id: Option<VehicleId>,
    pub route_id: RouteId,
    #[serde(rename = "type")]
    pub class: TransportClass,
    pub avg_speed: f64,
    #[serde(default)]
    pub route_name: String,
}
