//! Inbound events
//!
//! The transport translates whatever it receives into these, and the
//! dispatcher feeds them to the speed control node one at a time.

use super::telemetry::SpeedSample;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a vehicle in the simulation (the InSim PLID)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PlayerId(pub u8);

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u8> for PlayerId {
    fn from(id: u8) -> Self {
        PlayerId(id)
    }
}

/// Everything the control node reacts to
#[derive(Debug, Clone, PartialEq)]
pub enum VehicleEvent {
    /// Session established with the simulator
    Connected { product: String, version: String },
    /// A vehicle joined the session
    PlayerJoined { target: PlayerId, name: String },
    /// Speed samples for every vehicle the simulator reported, native units
    Telemetry(Vec<SpeedSample>),
    /// Operator submitted text in a button
    TextSubmitted { click_id: u8, text: String },
    /// Compute and emit one actuator command now
    ControlTick { target: PlayerId },
    /// Session lost; no actuation until the next `Connected`
    Disconnected,
}
