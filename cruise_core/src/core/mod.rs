//! # Core types and traits
//!
//! - **Node**: The trait every event handler implements
//! - **NodeInfo**: Runtime context handed to a node while it handles an event
//!
//! ## Node Lifecycle
//!
//! 1. **Construction** - Node is created with configuration
//! 2. **Initialization** - `init()` is called once, before the first event
//! 3. **Execution** - `on_event()` is called for every inbound event, in order
//! 4. **Shutdown** - `shutdown()` is called when the process winds down

pub mod node;

pub use node::{Node, NodeInfo, NodeMetrics, NodeState};
