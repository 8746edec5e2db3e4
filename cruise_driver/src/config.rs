//! Runtime configuration
//!
//! Loaded from `cruise.toml`. Every field has a default, so a missing file
//! or a partial file is fine. Values are resolved in this order:
//! 1. Command line flags (highest)
//! 2. Environment variables `HOST`, `PORT`, `ADMIN`
//! 3. Config file
//! 4. Built-in defaults (lowest)

use crate::insim::packet::InitRequest;
use crate::reconnect::ReconnectStrategy;
use anyhow::{bail, Context, Result};
use cruise_library::{Gains, PlayerId, SpeedControlConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_CONFIG_FILE: &str = "cruise.toml";

// InSim names are 16 bytes including the terminating NUL
const MAX_NAME_LEN: usize = 15;

const MIN_INTERVAL_MS: u64 = 10;
const MAX_INTERVAL_MS: u64 = 2550;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct CruiseConfig {
    pub insim: InsimConfig,
    pub control: ControlConfig,
    pub reconnect: ReconnectConfig,
}

/// Connection to the simulator host
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsimConfig {
    pub host: String,
    pub port: u16,
    /// Admin password of the host, empty for none
    pub admin: String,
    /// Name shown to the host
    pub app_name: String,
    /// Telemetry and control period
    pub interval_ms: u64,
}

impl Default for InsimConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 29999,
            admin: String::new(),
            app_name: "AI".to_string(),
            interval_ms: 50,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlConfig {
    /// Player id of the regulated car
    pub target: u8,
    pub kp: f64,
    pub ki: f64,
    pub kd: f64,
    /// Controller output mapped to full throttle or brake
    pub max_output: f64,
    pub telemetry_scale: f64,
}

impl Default for ControlConfig {
    fn default() -> Self {
        let gains = Gains::default();
        Self {
            target: 2,
            kp: gains.kp,
            ki: gains.ki,
            kd: gains.kd,
            max_output: 840.0,
            telemetry_scale: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub enabled: bool,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
    pub multiplier: f64,
    /// 0 retries forever
    pub max_retries: usize,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_backoff_ms: 500,
            max_backoff_ms: 30_000,
            multiplier: 2.0,
            max_retries: 0,
        }
    }
}

impl ReconnectConfig {
    pub fn strategy(&self) -> ReconnectStrategy {
        ReconnectStrategy {
            initial_backoff: Duration::from_millis(self.initial_backoff_ms),
            max_backoff: Duration::from_millis(self.max_backoff_ms),
            multiplier: self.multiplier,
            max_retries: self.max_retries,
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Overrides {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub target: Option<u8>,
}

impl CruiseConfig {
    /// Load a config file, or the defaults if it does not exist
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {:?}", path))?;
        Self::from_toml(&content).with_context(|| format!("Failed to parse config {:?}", path))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply the process environment and the command line
    pub fn resolve(&mut self, overrides: &Overrides) -> Result<()> {
        self.resolve_with(overrides, |key| std::env::var(key).ok())
    }

    pub fn resolve_with<F>(&mut self, overrides: &Overrides, env: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_port = match env("PORT") {
            Some(raw) => Some(
                raw.trim()
                    .parse::<u16>()
                    .with_context(|| format!("PORT is not a valid port: '{}'", raw))?,
            ),
            None => None,
        };

        self.insim.host = resolve_runtime_value(
            overrides.host.clone(),
            env("HOST"),
            self.insim.host.clone(),
        );
        self.insim.port = resolve_runtime_value(overrides.port, env_port, self.insim.port);
        self.insim.admin = resolve_runtime_value(None, env("ADMIN"), self.insim.admin.clone());
        self.control.target = resolve_runtime_value(overrides.target, None, self.control.target);
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let insim = &self.insim;
        if insim.host.trim().is_empty() {
            bail!("insim.host must not be empty");
        }
        // The host repeats AI info in whole hundredths, 1..=255
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&insim.interval_ms)
            || insim.interval_ms % 10 != 0
        {
            bail!(
                "insim.interval_ms must be a multiple of 10 between {} and {}, got {}",
                MIN_INTERVAL_MS,
                MAX_INTERVAL_MS,
                insim.interval_ms
            );
        }
        if insim.app_name.len() > MAX_NAME_LEN {
            bail!("insim.app_name must be at most {} bytes", MAX_NAME_LEN);
        }
        if insim.admin.len() > MAX_NAME_LEN {
            bail!("insim.admin must be at most {} bytes", MAX_NAME_LEN);
        }

        let control = &self.control;
        if !self.gains().is_valid() {
            bail!("control gains must be finite numbers");
        }
        if !control.max_output.is_finite() || control.max_output <= 0.0 {
            bail!(
                "control.max_output must be a positive number, got {}",
                control.max_output
            );
        }
        if !control.telemetry_scale.is_finite() {
            bail!("control.telemetry_scale must be a finite number");
        }

        let reconnect = &self.reconnect;
        if !reconnect.multiplier.is_finite() || reconnect.multiplier < 1.0 {
            bail!("reconnect.multiplier must be at least 1.0");
        }
        if reconnect.initial_backoff_ms > reconnect.max_backoff_ms {
            bail!("reconnect.initial_backoff_ms must not exceed reconnect.max_backoff_ms");
        }
        Ok(())
    }

    pub fn gains(&self) -> Gains {
        Gains::new(self.control.kp, self.control.ki, self.control.kd)
    }

    pub fn speed_control(&self) -> SpeedControlConfig {
        SpeedControlConfig {
            target: PlayerId(self.control.target),
            gains: self.gains(),
            max_output: self.control.max_output,
            telemetry_scale: self.control.telemetry_scale,
            control_period: Duration::from_millis(self.insim.interval_ms),
        }
    }

    pub fn init_request(&self) -> InitRequest {
        InitRequest {
            admin: self.insim.admin.clone(),
            app_name: self.insim.app_name.clone(),
            interval_ms: self.insim.interval_ms.min(u16::MAX as u64) as u16,
        }
    }
}

/// Resolve a value from the layered sources
pub fn resolve_runtime_value<T>(cli: Option<T>, env: Option<T>, current: T) -> T {
    cli.or(env).unwrap_or(current)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cruise_library::TargetRegistration;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_config_precedence() {
        assert_eq!(resolve_runtime_value(Some(1), Some(2), 3), 1);
        assert_eq!(resolve_runtime_value(None, Some(2), 3), 2);
        assert_eq!(resolve_runtime_value::<i32>(None, None, 3), 3);
    }

    #[test]
    fn test_defaults() {
        let config = CruiseConfig::default();
        assert_eq!(config.insim.port, 29999);
        assert_eq!(config.insim.interval_ms, 50);
        assert_eq!(config.control.target, 2);
        assert_eq!(config.gains(), Gains::new(0.5, 0.1, 0.1));
        assert!(!config.reconnect.enabled);
        config.validate().unwrap();
    }

    #[test]
    fn test_partial_file() {
        let config = CruiseConfig::from_toml(
            r#"
            [insim]
            host = "10.0.0.5"

            [control]
            kp = 0.8
            "#,
        )
        .unwrap();

        assert_eq!(config.insim.host, "10.0.0.5");
        assert_eq!(config.insim.port, 29999);
        assert_eq!(config.control.kp, 0.8);
        assert_eq!(config.control.ki, 0.1);
        assert_eq!(config.reconnect, ReconnectConfig::default());
    }

    #[test]
    fn test_malformed_file() {
        assert!(CruiseConfig::from_toml("[insim]\nport = \"nope\"").is_err());
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let config = CruiseConfig::load(Path::new("/nonexistent/cruise.toml")).unwrap();
        assert_eq!(config, CruiseConfig::default());
    }

    #[test]
    fn test_env_over_file_cli_over_env() {
        let mut config = CruiseConfig::default();
        config.insim.host = "file-host".to_string();

        let env = env_of(&[("HOST", "env-host"), ("PORT", "30000"), ("ADMIN", "secret")]);
        config.resolve_with(&Overrides::default(), &env).unwrap();
        assert_eq!(config.insim.host, "env-host");
        assert_eq!(config.insim.port, 30000);
        assert_eq!(config.insim.admin, "secret");

        let overrides = Overrides {
            host: Some("cli-host".to_string()),
            port: Some(31000),
            target: Some(5),
        };
        config.resolve_with(&overrides, &env).unwrap();
        assert_eq!(config.insim.host, "cli-host");
        assert_eq!(config.insim.port, 31000);
        assert_eq!(config.control.target, 5);
    }

    #[test]
    fn test_bad_env_port() {
        let mut config = CruiseConfig::default();
        let env = env_of(&[("PORT", "lots")]);
        assert!(config.resolve_with(&Overrides::default(), env).is_err());
    }

    #[test]
    fn test_validation() {
        let mut config = CruiseConfig::default();
        config.insim.interval_ms = 0;
        assert!(config.validate().is_err());

        let mut config = CruiseConfig::default();
        config.control.max_output = -1.0;
        assert!(config.validate().is_err());

        let mut config = CruiseConfig::default();
        config.control.kd = f64::NAN;
        assert!(config.validate().is_err());

        let mut config = CruiseConfig::default();
        config.insim.app_name = "a".repeat(16);
        assert!(config.validate().is_err());

        let mut config = CruiseConfig::default();
        config.reconnect.initial_backoff_ms = 60_000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_interval_must_match_ai_info_period() {
        for bad in [5, 25, 55, 2560, 3000] {
            let mut config = CruiseConfig::default();
            config.insim.interval_ms = bad;
            assert!(config.validate().is_err(), "{} ms accepted", bad);
        }

        for good in [10, 50, 100, 2550] {
            let mut config = CruiseConfig::default();
            config.insim.interval_ms = good;
            config.validate().unwrap();

            let control = config.speed_control();
            let registration = TargetRegistration::new(control.target, good);
            assert_eq!(
                Duration::from_millis(registration.repeat_hundredths as u64 * 10),
                control.control_period
            );
        }
    }

    #[test]
    fn test_speed_control_settings() {
        let mut config = CruiseConfig::default();
        config.insim.interval_ms = 100;
        config.control.target = 7;

        let control = config.speed_control();
        assert_eq!(control.target, PlayerId(7));
        assert_eq!(control.control_period, Duration::from_millis(100));
        assert_eq!(control.max_output, 840.0);

        let init = config.init_request();
        assert_eq!(init.interval_ms, 100);
        assert_eq!(init.app_name, "AI");
    }
}
