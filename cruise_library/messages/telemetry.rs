//! Speed telemetry and unit conversion
//!
//! The controller works in the simulator's native speed unit, where 32768
//! equals 100 m/s. Operators think in km/h.

use super::events::PlayerId;
use serde::{Deserialize, Serialize};

/// One speed reading for one vehicle, in the transport's native unit
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpeedSample {
    pub target: PlayerId,
    pub speed: f64,
}

impl SpeedSample {
    pub fn new(target: PlayerId, speed: f64) -> Self {
        Self { target, speed }
    }
}

/// Conversions between km/h and internal speed units
pub struct SpeedUnits;

impl SpeedUnits {
    /// Internal units per metre per second
    pub const UNITS_PER_MPS: f64 = 327.68;
    pub const KMH_PER_MPS: f64 = 3.6;

    /// Operator km/h to internal units
    pub fn kmh_to_internal(kmh: f64) -> f64 {
        (kmh / Self::KMH_PER_MPS) * Self::UNITS_PER_MPS
    }

    pub fn internal_to_kmh(internal: f64) -> f64 {
        (internal / Self::UNITS_PER_MPS) * Self::KMH_PER_MPS
    }

    /// Whole km/h for the on-screen readout, rounded half away from zero
    pub fn readout_kmh(internal: f64) -> i64 {
        Self::internal_to_kmh(internal).round() as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_hundred_mps_is_full_scale() {
        assert_relative_eq!(SpeedUnits::kmh_to_internal(360.0), 32768.0, epsilon = 1e-9);
    }

    #[test]
    fn test_conversion_is_reversible() {
        let internal = SpeedUnits::kmh_to_internal(87.0);
        assert_relative_eq!(SpeedUnits::internal_to_kmh(internal), 87.0, epsilon = 1e-9);
    }

    #[test]
    fn test_readout_rounds_to_whole_kmh() {
        // 2730.67 units is 30.0 km/h; 2776 units is 30.498 km/h
        assert_eq!(SpeedUnits::readout_kmh(2776.0), 30);
        assert_eq!(SpeedUnits::readout_kmh(2777.0), 31);
        assert_eq!(SpeedUnits::readout_kmh(0.0), 0);
    }
}
