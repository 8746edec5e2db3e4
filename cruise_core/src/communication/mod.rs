//! # Communication layer
//!
//! Nodes publish their outputs on named [`Hub`]s. The transport drains the
//! hubs after every dispatched event and turns the messages into wire
//! packets, so publication order is preserved end to end.
//!
//! ```rust
//! use cruise_core::communication::Hub;
//!
//! let hub: Hub<u16> = Hub::new("throttle");
//! hub.send(42);
//! assert_eq!(hub.drain(), vec![42]);
//! ```

pub mod hub;

pub use hub::{Hub, HubMetrics};
