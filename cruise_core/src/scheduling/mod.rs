//! Event dispatching
//!
//! The dispatcher is the only place node handlers are invoked from. It runs
//! each handler to completion, keeps the node's bookkeeping current and
//! converts panics into a fatal [`CruiseError::NodeCrashed`](crate::CruiseError).

pub mod dispatcher;

pub use dispatcher::Dispatcher;
