//! Cruise Library Nodes
//!
//! - `SpeedControlNode` - Closes the loop between speed telemetry and the
//!   throttle/brake actuators of one tracked vehicle

pub mod speed_control;

pub use speed_control::{SetpointStore, SpeedControlConfig, SpeedControlNode, TelemetryCache};
