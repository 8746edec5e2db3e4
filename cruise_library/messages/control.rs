//! Control message types
//!
//! Gains for the speed controller and the commands that leave the node on
//! the actuation hub.

use super::events::PlayerId;
use serde::{Deserialize, Serialize};

/// Full scale of a throttle or brake axis
pub const AXIS_MAX: u16 = u16::MAX;

/// PID gains for the speed controller
///
/// Fixed for the lifetime of a controller. Loaded from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Gains {
    /// Proportional gain
    pub kp: f64,
    /// Integral gain
    pub ki: f64,
    /// Derivative gain
    pub kd: f64,
}

impl Gains {
    pub fn new(kp: f64, ki: f64, kd: f64) -> Self {
        Self { kp, ki, kd }
    }

    /// P-only gains
    pub fn proportional(kp: f64) -> Self {
        Self::new(kp, 0.0, 0.0)
    }

    /// Check if gains are usable
    pub fn is_valid(&self) -> bool {
        self.kp.is_finite() && self.ki.is_finite() && self.kd.is_finite()
    }
}

impl Default for Gains {
    fn default() -> Self {
        Self::new(0.5, 0.1, 0.1)
    }
}

/// Throttle/brake pair for one target
///
/// At most one axis is nonzero. Both zero means coast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct ActuatorCommand {
    pub target: PlayerId,
    /// 0..=65535
    pub throttle: u16,
    /// 0..=65535
    pub brake: u16,
}

impl ActuatorCommand {
    pub fn throttle(target: PlayerId, throttle: u16) -> Self {
        Self {
            target,
            throttle,
            brake: 0,
        }
    }

    pub fn brake(target: PlayerId, brake: u16) -> Self {
        Self {
            target,
            throttle: 0,
            brake,
        }
    }

    /// Release both axes
    pub fn coast(target: PlayerId) -> Self {
        Self {
            target,
            throttle: 0,
            brake: 0,
        }
    }

    pub fn is_coast(&self) -> bool {
        self.throttle == 0 && self.brake == 0
    }

    /// Throttle and brake are never applied together
    pub fn is_valid(&self) -> bool {
        self.throttle == 0 || self.brake == 0
    }
}

/// One-time setup for a tracked target at session start
///
/// Asks the simulator to report AI info for the target at the control
/// period, switches the ignition on, enables automatic gears and centres
/// the steering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetRegistration {
    pub target: PlayerId,
    /// Report period in hundredths of a second
    pub repeat_hundredths: u8,
}

impl TargetRegistration {
    /// Registration for a control period given in milliseconds.
    ///
    /// The period is expressed in hundredths and clamped to 1..=255.
    pub fn new(target: PlayerId, interval_ms: u64) -> Self {
        let hundredths = (interval_ms / 10).clamp(1, u8::MAX as u64) as u8;
        Self {
            target,
            repeat_hundredths: hundredths,
        }
    }
}

/// Everything published on the actuation hub
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actuation {
    Register(TargetRegistration),
    Command(ActuatorCommand),
}

impl Actuation {
    pub fn target(&self) -> PlayerId {
        match self {
            Actuation::Register(r) => r.target,
            Actuation::Command(c) => c.target,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_gains() {
        let gains = Gains::default();
        assert_eq!(gains, Gains::new(0.5, 0.1, 0.1));
        assert!(gains.is_valid());
        assert!(!Gains::new(f64::NAN, 0.0, 0.0).is_valid());
        assert!(!Gains::proportional(f64::INFINITY).is_valid());
    }

    #[test]
    fn test_command_constructors() {
        let target = PlayerId(2);
        assert!(ActuatorCommand::coast(target).is_coast());
        assert!(ActuatorCommand::throttle(target, 100).is_valid());
        assert!(ActuatorCommand::brake(target, AXIS_MAX).is_valid());

        let both = ActuatorCommand {
            target,
            throttle: 1,
            brake: 1,
        };
        assert!(!both.is_valid());
    }

    #[test]
    fn test_registration_period() {
        assert_eq!(TargetRegistration::new(PlayerId(2), 50).repeat_hundredths, 5);
        assert_eq!(TargetRegistration::new(PlayerId(2), 5).repeat_hundredths, 1);
        assert_eq!(TargetRegistration::new(PlayerId(2), 10_000).repeat_hundredths, 255);
    }

    #[test]
    fn test_actuation_target() {
        let register = Actuation::Register(TargetRegistration::new(PlayerId(4), 50));
        let command = Actuation::Command(ActuatorCommand::coast(PlayerId(7)));
        assert_eq!(register.target(), PlayerId(4));
        assert_eq!(command.target(), PlayerId(7));
    }
}
