//! # Cruise Library
//!
//! Messages, algorithms and nodes for closed-loop speed control.
//!
//! ## Structure
//!
//! ```text
//! cruise_library/
//! ── messages/       # Events in, actuator commands and UI draws out
//! ── algorithms/     # PID controller, actuator command mapping
//! ── nodes/          # SpeedControlNode
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use cruise_core::Dispatcher;
//! use cruise_library::{
//!     Actuation, PlayerId, SpeedControlConfig, SpeedControlNode, SpeedSample, VehicleEvent,
//! };
//!
//! let node = SpeedControlNode::new(SpeedControlConfig::default()).unwrap();
//! let actuation = node.actuation_hub().clone();
//! let mut dispatcher = Dispatcher::new(node);
//!
//! dispatcher.dispatch(VehicleEvent::Connected {
//!     product: "S3".into(),
//!     version: "0.7F".into(),
//! }).unwrap();
//! dispatcher.dispatch(VehicleEvent::Telemetry(vec![SpeedSample::new(PlayerId(2), 0.0)])).unwrap();
//! dispatcher.dispatch(VehicleEvent::ControlTick { target: PlayerId(2) }).unwrap();
//!
//! let commands: Vec<_> = actuation
//!     .drain()
//!     .into_iter()
//!     .filter(|a| matches!(a, Actuation::Command(_)))
//!     .collect();
//! assert_eq!(commands.len(), 1);
//! ```

pub mod algorithms;
pub mod messages;
pub mod nodes;

// Re-export message types at the crate root for convenience
pub use messages::*;

pub use algorithms::actuator_map::ActuatorMapper;
pub use algorithms::pid::{ControllerState, PidController};
pub use nodes::{SetpointStore, SpeedControlConfig, SpeedControlNode, TelemetryCache};
