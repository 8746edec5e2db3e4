//! Message types for the cruise speed regulator
//!
//! Messages are organized by direction and domain:
//! - Events: What the transport delivers to the control node
//! - Telemetry: Speed samples and unit conversions
//! - Control: Gains, actuator commands, target registration
//! - UI: Button draws for the on-screen readouts and setpoint entry
//!
//! All message types are re-exported at the crate root for convenience.

pub mod control;
pub mod events;
pub mod telemetry;
pub mod ui;

pub use control::{Actuation, ActuatorCommand, Gains, TargetRegistration, AXIS_MAX};
pub use events::{PlayerId, VehicleEvent};
pub use telemetry::{SpeedSample, SpeedUnits};
pub use ui::{ButtonRect, ButtonStyle, UiDraw};
