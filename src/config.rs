//! Robot configuration loaded from `waiterbot.toml`.
//!
//! The [`RobotConfig`] struct holds every configurable parameter of the
//! control core. Values missing from the file fall back to sensible
//! defaults. The whole struct is immutable after startup; nothing in the
//! control loop mutates it.

use std::path::Path;

use serde::Deserialize;

use crate::error::RobotError;

/// Top-level configuration for the delivery control core.
#[derive(Debug, Clone, Deserialize)]
pub struct RobotConfig {
    /// Name of the fixed pickup waypoint (e.g. the kitchen).
    #[serde(default = "default_pickup_location")]
    pub pickup_location: String,

    /// Navigation timeout in seconds for the leg to the pickup point.
    #[serde(default = "default_nav_timeout")]
    pub nav_pickup_timeout_s: f64,

    /// Navigation timeout in seconds for the leg to a drop-off point.
    #[serde(default = "default_nav_timeout")]
    pub nav_dropoff_timeout_s: f64,

    /// Retry budget handed to the navigator per goal.
    #[serde(default = "default_nav_retry")]
    pub nav_retry: u32,

    /// Minimum final-approach distance at a drop-off point, in meters.
    #[serde(default = "default_approach_distance")]
    pub nav_approach_distance: f64,

    /// Directory holding the cue sound resources.
    #[serde(default)]
    pub resource_path: String,

    /// Control loop rate in Hz.
    #[serde(default = "default_tick_hz")]
    pub tick_hz: u32,

    /// Status/indicator emission happens every Nth tick.
    #[serde(default = "default_status_divisor")]
    pub status_divisor: u32,

    /// Value of the `success` flag on the terminal report of a completed
    /// delivery. The original controller reported `false` here, which looks
    /// like a defect; the convention is explicit instead of silently fixed.
    #[serde(default = "default_report_delivery_success")]
    pub report_delivery_success: bool,
}

fn default_pickup_location() -> String {
    "kitchen".to_string()
}

fn default_nav_timeout() -> f64 {
    300.0
}

fn default_nav_retry() -> u32 {
    3
}

fn default_approach_distance() -> f64 {
    5.0
}

fn default_tick_hz() -> u32 {
    10
}

fn default_status_divisor() -> u32 {
    5
}

fn default_report_delivery_success() -> bool {
    true
}

impl Default for RobotConfig {
    fn default() -> Self {
        Self {
            pickup_location: default_pickup_location(),
            nav_pickup_timeout_s: default_nav_timeout(),
            nav_dropoff_timeout_s: default_nav_timeout(),
            nav_retry: default_nav_retry(),
            nav_approach_distance: default_approach_distance(),
            resource_path: String::new(),
            tick_hz: default_tick_hz(),
            status_divisor: default_status_divisor(),
            report_delivery_success: default_report_delivery_success(),
        }
    }
}

impl RobotConfig {
    /// Loads the configuration from `waiterbot.toml` in the current
    /// directory, falling back to defaults if the file does not exist.
    pub fn load() -> Result<Self, RobotError> {
        Self::load_from(Path::new("waiterbot.toml"))
    }

    /// Loads the configuration from an explicit path. A missing file yields
    /// the defaults; a malformed file is an error.
    pub fn load_from(path: &Path) -> Result<Self, RobotError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)?;
        let config = toml::from_str::<RobotConfig>(&contents)?;
        if config.tick_hz == 0 {
            return Err(RobotError::Config("tick_hz must be at least 1".into()));
        }
        if config.status_divisor == 0 {
            return Err(RobotError::Config(
                "status_divisor must be at least 1".into(),
            ));
        }
        for (name, value) in [
            ("nav_pickup_timeout_s", config.nav_pickup_timeout_s),
            ("nav_dropoff_timeout_s", config.nav_dropoff_timeout_s),
        ] {
            // These feed Duration::from_secs_f64, which panics on negative
            // or non-finite input.
            if !value.is_finite() || value < 0.0 {
                return Err(RobotError::Config(format!(
                    "{name} must be a finite, non-negative number of seconds"
                )));
            }
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let config = RobotConfig::default();
        assert_eq!(config.pickup_location, "kitchen");
        assert_eq!(config.nav_pickup_timeout_s, 300.0);
        assert_eq!(config.nav_dropoff_timeout_s, 300.0);
        assert_eq!(config.nav_retry, 3);
        assert_eq!(config.nav_approach_distance, 5.0);
        assert_eq!(config.tick_hz, 10);
        assert_eq!(config.status_divisor, 5);
        assert!(config.report_delivery_success);
        assert!(config.resource_path.is_empty());
    }

    #[test]
    fn deserialize_partial_toml() {
        let toml_str = r#"
            pickup_location = "bar"
            nav_retry = 5
            nav_approach_distance = 0.5
        "#;
        let config: RobotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.pickup_location, "bar");
        assert_eq!(config.nav_retry, 5);
        assert_eq!(config.nav_approach_distance, 0.5);
        // Untouched fields keep their defaults.
        assert_eq!(config.nav_pickup_timeout_s, 300.0);
        assert_eq!(config.tick_hz, 10);
    }

    #[test]
    fn load_from_missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = RobotConfig::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.nav_retry, 3);
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waiterbot.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "resource_path = \"/opt/waiterbot/sounds\"").unwrap();
        writeln!(file, "report_delivery_success = false").unwrap();

        let config = RobotConfig::load_from(&path).unwrap();
        assert_eq!(config.resource_path, "/opt/waiterbot/sounds");
        assert!(!config.report_delivery_success);
    }

    #[test]
    fn zero_tick_rate_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("waiterbot.toml");
        std::fs::write(&path, "tick_hz = 0\n").unwrap();
        assert!(RobotConfig::load_from(&path).is_err());
    }

    #[test]
    fn invalid_timeouts_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        for contents in [
            "nav_pickup_timeout_s = -1.0\n",
            "nav_dropoff_timeout_s = nan\n",
            "nav_pickup_timeout_s = inf\n",
        ] {
            let path = dir.path().join("waiterbot.toml");
            std::fs::write(&path, contents).unwrap();
            let err = RobotConfig::load_from(&path).unwrap_err();
            assert!(
                matches!(err, RobotError::Config(_)),
                "{contents:?} must fail validation, got {err:?}"
            );
        }
    }
}
