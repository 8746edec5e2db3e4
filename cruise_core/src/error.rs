//! Error taxonomy shared by every cruise crate

use thiserror::Error;

/// Errors raised by the control loop and its collaborators
#[derive(Debug, Error)]
pub enum CruiseError {
    /// A controller was stepped with a non-positive or non-finite timestep.
    /// Fatal to the current tick only.
    #[error("Invalid timestep {0}s: dt must be finite and greater than zero")]
    InvalidTimestep(f64),

    /// Operator entered a setpoint that is not a base-10 integer
    #[error("Setpoint '{0}' is not a base-10 integer")]
    SetpointParse(String),

    /// Event names a target other than the tracked one
    #[error("Target {0} is not tracked")]
    UnknownTarget(u8),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Malformed or truncated wire data
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// A node panicked inside a handler
    #[error("Node '{0}' crashed: {1}")]
    NodeCrashed(String, String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for cruise operations
pub type CruiseResult<T> = Result<T, CruiseError>;

impl CruiseError {
    /// Whether the error only invalidates the event that raised it.
    ///
    /// Tick-local errors are logged and the loop carries on; everything else
    /// should bring the session down.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            CruiseError::InvalidTimestep(_)
                | CruiseError::SetpointParse(_)
                | CruiseError::UnknownTarget(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tick_local_errors_are_recoverable() {
        assert!(CruiseError::InvalidTimestep(0.0).is_recoverable());
        assert!(CruiseError::SetpointParse("abc".into()).is_recoverable());
        assert!(CruiseError::UnknownTarget(7).is_recoverable());
    }

    #[test]
    fn test_session_errors_are_fatal() {
        assert!(!CruiseError::Protocol("short frame".into()).is_recoverable());
        assert!(!CruiseError::NodeCrashed("n".into(), "boom".into()).is_recoverable());
    }

    #[test]
    fn test_display_names_offending_value() {
        let err = CruiseError::SetpointParse("abc".into());
        assert_eq!(err.to_string(), "Setpoint 'abc' is not a base-10 integer");

        let err = CruiseError::InvalidTimestep(0.0);
        assert!(err.to_string().contains("0s"));
    }
}
