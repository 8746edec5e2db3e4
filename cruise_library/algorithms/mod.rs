//! Pure computational algorithms for speed control
//!
//! No I/O in here. Nodes own instances and feed them samples.
//!
//! # Available Algorithms
//!
//! - **pid**: Stateful PID feedback controller
//! - **actuator_map**: Control signal to throttle/brake mapping

pub mod actuator_map;
pub mod pid;
