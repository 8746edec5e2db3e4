use crate::error::{CruiseError, CruiseResult};
use std::collections::HashMap;
use std::fmt;
use std::time::Instant;
use tracing::{debug, error, info, warn};

const HISTORY_LIMIT: usize = 100;

/// Node states for monitoring and lifecycle management
#[derive(Debug, Clone, PartialEq)]
pub enum NodeState {
    Uninitialized,
    Initializing,
    /// Initialized, but not driving anything (no live session)
    Idle,
    Running,
    Stopping,
    Stopped,
    Crashed(String),
}

impl fmt::Display for NodeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeState::Uninitialized => write!(f, "Uninitialized"),
            NodeState::Initializing => write!(f, "Initializing"),
            NodeState::Idle => write!(f, "Idle"),
            NodeState::Running => write!(f, "Running"),
            NodeState::Stopping => write!(f, "Stopping"),
            NodeState::Stopped => write!(f, "Stopped"),
            NodeState::Crashed(msg) => write!(f, "Crashed: {}", msg),
        }
    }
}

/// Event handling counters for a node
#[derive(Debug, Clone, Default)]
pub struct NodeMetrics {
    pub total_events: u64,
    pub successful_events: u64,
    pub failed_events: u64,
    pub last_event_duration_us: u64,
    pub max_event_duration_us: u64,
    pub messages_sent: u64,
    pub errors_count: u64,
    pub warnings_count: u64,
}

/// Context and bookkeeping for a running node
pub struct NodeInfo {
    name: String,

    state: NodeState,
    previous_state: NodeState,

    metrics: NodeMetrics,

    event_start_time: Option<Instant>,

    error_history: Vec<(Instant, String)>,
    warning_history: Vec<(Instant, String)>,

    // topic -> message count
    published_topics: HashMap<String, u64>,
}

impl NodeInfo {
    pub fn new(node_name: impl Into<String>) -> Self {
        Self {
            name: node_name.into(),
            state: NodeState::Uninitialized,
            previous_state: NodeState::Uninitialized,
            metrics: NodeMetrics::default(),
            event_start_time: None,
            error_history: Vec::new(),
            warning_history: Vec::new(),
            published_topics: HashMap::new(),
        }
    }

    // State Management Methods
    pub fn state(&self) -> &NodeState {
        &self.state
    }

    pub fn previous_state(&self) -> &NodeState {
        &self.previous_state
    }

    pub fn set_state(&mut self, new_state: NodeState) {
        if self.state != new_state {
            debug!(node = %self.name, from = %self.state, to = %new_state, "state change");
            self.previous_state = std::mem::replace(&mut self.state, new_state);
        }
    }

    pub fn transition_to_crashed(&mut self, crash_msg: String) {
        self.log_error(&crash_msg);
        self.set_state(NodeState::Crashed(crash_msg));
    }

    // Event Management
    pub fn start_event(&mut self) {
        self.event_start_time = Some(Instant::now());
    }

    pub fn record_event(&mut self) {
        self.metrics.total_events += 1;
        self.metrics.successful_events += 1;
        self.finish_event_timing();
    }

    pub fn record_event_failure(&mut self, error: &CruiseError) {
        self.metrics.total_events += 1;
        self.metrics.failed_events += 1;
        self.finish_event_timing();
        self.log_error(&error.to_string());
    }

    fn finish_event_timing(&mut self) {
        if let Some(start_time) = self.event_start_time.take() {
            let duration_us = start_time.elapsed().as_micros() as u64;
            self.metrics.last_event_duration_us = duration_us;
            self.metrics.max_event_duration_us = self.metrics.max_event_duration_us.max(duration_us);
        }
    }

    /// Count a message published on `topic`
    pub fn record_publish(&mut self, topic: &str) {
        *self.published_topics.entry(topic.to_string()).or_insert(0) += 1;
        self.metrics.messages_sent += 1;
    }

    // Logging Methods
    pub fn log_info(&self, message: &str) {
        info!(node = %self.name, "{}", message);
    }

    pub fn log_warning(&mut self, message: &str) {
        warn!(node = %self.name, "{}", message);

        self.warning_history.push((Instant::now(), message.to_string()));
        if self.warning_history.len() > HISTORY_LIMIT {
            self.warning_history.remove(0);
        }
        self.metrics.warnings_count += 1;
    }

    pub fn log_error(&mut self, message: &str) {
        error!(node = %self.name, "{}", message);

        self.error_history.push((Instant::now(), message.to_string()));
        if self.error_history.len() > HISTORY_LIMIT {
            self.error_history.remove(0);
        }
        self.metrics.errors_count += 1;
    }

    pub fn log_debug(&self, message: &str) {
        debug!(node = %self.name, "{}", message);
    }

    // Getters
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn metrics(&self) -> &NodeMetrics {
        &self.metrics
    }

    pub fn published_topics(&self) -> &HashMap<String, u64> {
        &self.published_topics
    }

    pub fn last_error(&self) -> Option<&str> {
        self.error_history.last().map(|(_, msg)| msg.as_str())
    }

    pub fn last_warning(&self) -> Option<&str> {
        self.warning_history.last().map(|(_, msg)| msg.as_str())
    }
}

/// A stateful event handler driven by the [`Dispatcher`](crate::Dispatcher)
///
/// Handlers run to completion on the dispatcher's thread; a node never sees
/// two events at once, so its state needs no locking.
pub trait Node: Send {
    /// Event type this node reacts to
    type Event;

    /// Get the node's name (must be unique)
    fn name(&self) -> &'static str;

    /// Initialize the node (called once, before the first event)
    fn init(&mut self, ctx: &mut NodeInfo) -> CruiseResult<()> {
        ctx.log_info("Node initialized successfully");
        Ok(())
    }

    /// Handle one inbound event
    fn on_event(&mut self, event: Self::Event, ctx: &mut NodeInfo) -> CruiseResult<()>;

    /// Shutdown the node (called once at cleanup)
    fn shutdown(&mut self, ctx: &mut NodeInfo) -> CruiseResult<()> {
        ctx.log_info("Node shutdown successfully");
        Ok(())
    }

    /// Handle an error returned from `on_event` (optional override)
    fn on_error(&mut self, error: &CruiseError, ctx: &mut NodeInfo) {
        ctx.log_warning(&format!("Event dropped: {}", error));
    }
}
