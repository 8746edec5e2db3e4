//! # Cruise Core
//!
//! The runtime underneath the cruise speed regulator.
//!
//! Everything here is single-threaded and event driven. The transport feeds
//! events in, one at a time, and every handler runs to completion before the
//! next event is looked at:
//!
//! - **Nodes**: Stateful units that react to events and publish results
//! - **Communication**: In-process hubs carrying outbound messages
//! - **Scheduling**: The dispatcher that owns a node and runs its handlers
//! - **Errors**: The shared error taxonomy
//!
//! ## Quick Start
//!
//! ```rust
//! use cruise_core::{CruiseResult, Dispatcher, Hub, Node, NodeInfo};
//!
//! struct Echo {
//!     output: Hub<String>,
//! }
//!
//! impl Node for Echo {
//!     type Event = String;
//!
//!     fn name(&self) -> &'static str { "echo" }
//!
//!     fn on_event(&mut self, event: String, _ctx: &mut NodeInfo) -> CruiseResult<()> {
//!         self.output.send(event);
//!         Ok(())
//!     }
//! }
//!
//! let output = Hub::new("echo");
//! let mut dispatcher = Dispatcher::new(Echo { output: output.clone() });
//! dispatcher.dispatch("hello".to_string()).unwrap();
//! assert_eq!(output.recv().as_deref(), Some("hello"));
//! ```

pub mod communication;
pub mod core;
pub mod error;
pub mod scheduling;

// Re-export commonly used types for easy access
pub use communication::Hub;
pub use self::core::{Node, NodeInfo, NodeMetrics, NodeState};
pub use error::{CruiseError, CruiseResult};
pub use scheduling::Dispatcher;
