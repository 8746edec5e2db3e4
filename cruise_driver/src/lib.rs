//! InSim transport for the cruise speed regulator
//!
//! Connects to a Live for Speed host, turns its packets into
//! `VehicleEvent`s for the speed control node and writes the node's
//! actuator commands and button draws back as packets.

pub mod config;
pub mod insim;
pub mod reconnect;

pub use config::{CruiseConfig, Overrides};
pub use insim::{Session, SessionEnd};
pub use reconnect::{ReconnectContext, ReconnectStrategy};
