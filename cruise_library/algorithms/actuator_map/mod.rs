//! Control signal to throttle/brake mapping
//!
//! The controller output is normalized against a calibrated magnitude,
//! clamped to [-1, 1] and scaled to the full 16-bit range of one axis.
//! Positive drives the throttle, negative the brake, zero (or NaN) coasts.
//! Scaling rounds half away from zero.
//!
//! ```rust
//! use cruise_library::{ActuatorMapper, PlayerId};
//!
//! let mapper = ActuatorMapper::new(840.0).unwrap();
//! let cmd = mapper.map(-7.425, PlayerId(2));
//! assert_eq!((cmd.throttle, cmd.brake), (0, 579));
//! ```

use crate::messages::{ActuatorCommand, PlayerId, AXIS_MAX};
use cruise_core::error::{CruiseError, CruiseResult};

/// Default calibrated magnitude of the control signal
pub const DEFAULT_MAX_MAGNITUDE: f64 = 840.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorMapper {
    max_magnitude: f64,
}

impl ActuatorMapper {
    /// `max_magnitude` must be finite and positive
    pub fn new(max_magnitude: f64) -> CruiseResult<Self> {
        if !max_magnitude.is_finite() || max_magnitude <= 0.0 {
            return Err(CruiseError::InvalidConfig(format!(
                "actuator max magnitude must be finite and > 0, got {}",
                max_magnitude
            )));
        }
        Ok(Self { max_magnitude })
    }

    pub fn max_magnitude(&self) -> f64 {
        self.max_magnitude
    }

    /// Signal scaled to [-1, 1]; NaN maps to 0
    pub fn normalize(&self, signal: f64) -> f64 {
        if signal.is_nan() {
            return 0.0;
        }
        (signal / self.max_magnitude).clamp(-1.0, 1.0)
    }

    pub fn map(&self, signal: f64, target: PlayerId) -> ActuatorCommand {
        let normalized = self.normalize(signal);

        if normalized > 0.0 {
            ActuatorCommand::throttle(target, scale(normalized))
        } else if normalized < 0.0 {
            ActuatorCommand::brake(target, scale(-normalized))
        } else {
            ActuatorCommand::coast(target)
        }
    }
}

impl Default for ActuatorMapper {
    fn default() -> Self {
        Self {
            max_magnitude: DEFAULT_MAX_MAGNITUDE,
        }
    }
}

// magnitude is in [0, 1]
fn scale(magnitude: f64) -> u16 {
    (magnitude * AXIS_MAX as f64).round() as u16
}
