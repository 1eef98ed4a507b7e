//! Per-class motion parameters

use super::TransportClass;

/// Dwell time and speed multiplier of a transport class
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VehicleKinematics {
    /// Seconds spent stationary after arriving at a stop
    pub dwell_secs: f64,
    /// Multiplier applied to the nominal average speed
    pub speed_factor: f64,
}

const BUS: VehicleKinematics = VehicleKinematics {
    dwell_secs: 5.0,
    speed_factor: 1.0,
};

const TRAM: VehicleKinematics = VehicleKinematics {
    dwell_secs: 8.0,
    speed_factor: 0.8,
};

const TROLLEYBUS: VehicleKinematics = VehicleKinematics {
    dwell_secs: 6.0,
    speed_factor: 0.9,
};

impl VehicleKinematics {
    pub const fn for_class(class: TransportClass) -> Self {
        match class {
            TransportClass::Bus => BUS,
            TransportClass::Tram => TRAM,
            TransportClass::Trolleybus => TROLLEYBUS,
        }
    }

    /// Effective speed in km/h for a vehicle with the given nominal speed
    pub fn effective_speed(&self, nominal_kmh: f64) -> f64 {
        nominal_kmh * self.speed_factor
    }
}

impl TransportClass {
    pub const fn kinematics(self) -> VehicleKinematics {
        VehicleKinematics::for_class(self)
    }
}
