use crate::core::{Node, NodeInfo, NodeState};
use crate::error::{CruiseError, CruiseResult};
use std::panic::{catch_unwind, AssertUnwindSafe};

/// Single-threaded, run-to-completion event dispatcher for one node
pub struct Dispatcher<N: Node> {
    node: N,
    info: NodeInfo,
}

impl<N: Node> Dispatcher<N> {
    pub fn new(node: N) -> Self {
        let info = NodeInfo::new(node.name());
        Self { node, info }
    }

    /// Run the node's `init` hook. Called lazily by the first `dispatch`.
    pub fn init(&mut self) -> CruiseResult<()> {
        self.info.set_state(NodeState::Initializing);
        match self.node.init(&mut self.info) {
            Ok(()) => {
                if self.info.state() == &NodeState::Initializing {
                    self.info.set_state(NodeState::Idle);
                }
                Ok(())
            }
            Err(e) => {
                self.info
                    .transition_to_crashed(format!("Failed to initialize: {}", e));
                Err(e)
            }
        }
    }

    /// Hand one event to the node and wait for the handler to finish.
    ///
    /// Recoverable handler errors are passed to `Node::on_error`, counted and
    /// swallowed. Anything else, including a panic, is returned and leaves
    /// the node in `NodeState::Crashed`.
    pub fn dispatch(&mut self, event: N::Event) -> CruiseResult<()> {
        if let NodeState::Crashed(msg) = self.info.state() {
            return Err(CruiseError::NodeCrashed(
                self.info.name().to_string(),
                msg.clone(),
            ));
        }
        if self.info.state() == &NodeState::Uninitialized {
            self.init()?;
        }

        self.info.start_event();
        let node = &mut self.node;
        let info = &mut self.info;
        let outcome = catch_unwind(AssertUnwindSafe(|| node.on_event(event, info)));

        match outcome {
            Ok(Ok(())) => {
                self.info.record_event();
                Ok(())
            }
            Ok(Err(e)) if e.is_recoverable() => {
                self.info.record_event_failure(&e);
                self.node.on_error(&e, &mut self.info);
                Ok(())
            }
            Ok(Err(e)) => {
                self.info.record_event_failure(&e);
                self.info.transition_to_crashed(e.to_string());
                Err(e)
            }
            Err(panic) => {
                let msg = panic_message(panic.as_ref());
                self.info.transition_to_crashed(format!("panicked: {}", msg));
                Err(CruiseError::NodeCrashed(self.info.name().to_string(), msg))
            }
        }
    }

    /// Run the node's `shutdown` hook
    pub fn shutdown(&mut self) -> CruiseResult<()> {
        self.info.set_state(NodeState::Stopping);
        let result = self.node.shutdown(&mut self.info);
        self.info.set_state(NodeState::Stopped);
        result
    }

    pub fn node(&self) -> &N {
        &self.node
    }

    pub fn info(&self) -> &NodeInfo {
        &self.info
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic".to_string()
    }
}
