//! PID (Proportional-Integral-Derivative) Controller
//!
//! Feedback controller for the longitudinal speed axis.
//!
//! The controller keeps its integral and previous error between calls, so one
//! instance must live for the whole session of the target it regulates.
//! Creating a fresh instance per sample throws that history away and leaves
//! only `kp*e + ki*e*dt + kd*e/dt`.
//!
//! No output clamping or anti-windup is applied here; saturation happens in
//! the actuator mapper.
//!
//! # Example
//!
//! ```rust
//! use cruise_library::algorithms::pid::PidController;
//! use cruise_library::Gains;
//!
//! let mut pid = PidController::new(Gains::new(0.5, 0.1, 0.1));
//!
//! let output = pid.compute(100.0, 90.0, 0.05).unwrap();
//! assert!((output - 25.05).abs() < 1e-9);
//! ```

use crate::messages::Gains;
use cruise_core::error::{CruiseError, CruiseResult};

/// Persisted controller state
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    pub previous_error: f64,
    pub integral: f64,
}

/// PID Controller
#[derive(Debug, Clone)]
pub struct PidController {
    gains: Gains,
    state: ControllerState,
}

impl PidController {
    /// Create a controller with zeroed state
    pub fn new(gains: Gains) -> Self {
        Self {
            gains,
            state: ControllerState::default(),
        }
    }

    /// Compute control output
    ///
    /// # Arguments
    /// * `setpoint` - Desired speed, internal units
    /// * `measured` - Observed speed, internal units
    /// * `dt` - Time step (seconds), finite and > 0
    ///
    /// # Errors
    /// `InvalidTimestep` when `dt` is not usable. State is left untouched.
    pub fn compute(&mut self, setpoint: f64, measured: f64, dt: f64) -> CruiseResult<f64> {
        if !dt.is_finite() || dt <= 0.0 {
            return Err(CruiseError::InvalidTimestep(dt));
        }

        let error = setpoint - measured;

        self.state.integral += error * dt;
        let derivative = (error - self.state.previous_error) / dt;
        self.state.previous_error = error;

        let Gains { kp, ki, kd } = self.gains;
        Ok(kp * error + ki * self.state.integral + kd * derivative)
    }

    pub fn gains(&self) -> Gains {
        self.gains
    }

    /// Snapshot of (previous_error, integral)
    pub fn state(&self) -> ControllerState {
        self.state
    }

    /// Zero the persisted state
    pub fn reset(&mut self) {
        self.state = ControllerState::default();
    }
}
