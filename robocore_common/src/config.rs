//! `RobotConfig` — immutable configuration loaded once at construction.
//!
//! Mirrors the teacher's `ControlUnitConfig`: `serde::Deserialize` for TOML
//! loading, `#[serde(default = "...")]` for every optional field, and a
//! `validate()` that checks bounds (FR-156 equivalent).

use serde::{Deserialize, Serialize};
use uuid::Uuid;

fn default_jog_joint_limit_deg() -> f64 {
    15.0
}
fn default_jog_joint_tol_deg() -> f64 {
    0.1
}
fn default_trajectory_error_tol_deg() -> f64 {
    5.0
}
fn default_jog_joint_timeout_ms() -> u64 {
    5_000
}
fn default_communication_timeout_ms() -> u64 {
    250
}
fn default_tick_period_ms() -> u64 {
    10
}

/// Immutable per-robot configuration (§3 `RobotConfig`).
///
/// Constructed once, never mutated afterward. Joint vectors elsewhere in
/// the core are validated against `joint_count` on every use.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotConfig {
    /// Number of joints, N ≥ 1.
    pub joint_count: usize,
    /// Ordered joint names, `len() == joint_count`.
    pub joint_names: Vec<String>,
    /// Stable device identifier, also used as the sensor-data clock UUID.
    pub device_uuid: Uuid,

    /// Maximum per-joint jog step [degrees].
    #[serde(default = "default_jog_joint_limit_deg")]
    pub jog_joint_limit_deg: f64,
    /// Jog-complete tolerance [degrees].
    #[serde(default = "default_jog_joint_tol_deg")]
    pub jog_joint_tol_deg: f64,
    /// Trajectory tolerance-monitor deviation limit [degrees].
    #[serde(default = "default_trajectory_error_tol_deg")]
    pub trajectory_error_tol_deg: f64,
    /// Jog completion timeout [ms].
    #[serde(default = "default_jog_joint_timeout_ms")]
    pub jog_joint_timeout_ms: u64,
    /// Max age of any feedback arrival timestamp before comm failure [ms].
    #[serde(default = "default_communication_timeout_ms")]
    pub communication_timeout_ms: u64,
    /// Control loop tick period [ms].
    #[serde(default = "default_tick_period_ms")]
    pub tick_period_ms: u64,
}

/// Configuration validation failure.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigValidationError {
    #[error("joint_count must be >= 1, got {0}")]
    ZeroJoints(usize),
    #[error("joint_names has {got} entries, expected {expected}")]
    JointNamesLenMismatch { got: usize, expected: usize },
    #[error("jog_joint_limit_deg must be > 0, got {0}")]
    NonPositiveJogLimit(f64),
    #[error("jog_joint_tol_deg must be > 0 and <= jog_joint_limit_deg")]
    InvalidJogTolerance,
    #[error("trajectory_error_tol_deg must be > 0, got {0}")]
    NonPositiveTrajectoryTolerance(f64),
    #[error("jog_joint_timeout_ms must be > 0")]
    ZeroJogTimeout,
    #[error("communication_timeout_ms must be > 0")]
    ZeroCommunicationTimeout,
    #[error("tick_period_ms must be > 0")]
    ZeroTickPeriod,
}

impl RobotConfig {
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if self.joint_count == 0 {
            return Err(ConfigValidationError::ZeroJoints(self.joint_count));
        }
        if self.joint_names.len() != self.joint_count {
            return Err(ConfigValidationError::JointNamesLenMismatch {
                got: self.joint_names.len(),
                expected: self.joint_count,
            });
        }
        if self.jog_joint_limit_deg <= 0.0 {
            return Err(ConfigValidationError::NonPositiveJogLimit(
                self.jog_joint_limit_deg,
            ));
        }
        if self.jog_joint_tol_deg <= 0.0 || self.jog_joint_tol_deg > self.jog_joint_limit_deg {
            return Err(ConfigValidationError::InvalidJogTolerance);
        }
        if self.trajectory_error_tol_deg <= 0.0 {
            return Err(ConfigValidationError::NonPositiveTrajectoryTolerance(
                self.trajectory_error_tol_deg,
            ));
        }
        if self.jog_joint_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroJogTimeout);
        }
        if self.communication_timeout_ms == 0 {
            return Err(ConfigValidationError::ZeroCommunicationTimeout);
        }
        if self.tick_period_ms == 0 {
            return Err(ConfigValidationError::ZeroTickPeriod);
        }
        Ok(())
    }

    /// Convenience constructor for tests/examples: sequential joint names,
    /// all tolerance constants at their spec defaults.
    pub fn new_default(joint_count: usize, device_uuid: Uuid) -> Self {
        Self {
            joint_count,
            joint_names: (0..joint_count).map(|i| format!("joint_{i}")).collect(),
            device_uuid,
            jog_joint_limit_deg: default_jog_joint_limit_deg(),
            jog_joint_tol_deg: default_jog_joint_tol_deg(),
            trajectory_error_tol_deg: default_trajectory_error_tol_deg(),
            jog_joint_timeout_ms: default_jog_joint_timeout_ms(),
            communication_timeout_ms: default_communication_timeout_ms(),
            tick_period_ms: default_tick_period_ms(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_for_six_joints_is_valid() {
        let cfg = RobotConfig::new_default(6, Uuid::nil());
        assert!(cfg.validate().is_ok());
        assert_eq!(cfg.joint_names.len(), 6);
        assert_eq!(cfg.jog_joint_limit_deg, 15.0);
        assert_eq!(cfg.communication_timeout_ms, 250);
        assert_eq!(cfg.tick_period_ms, 10);
    }

    #[test]
    fn zero_joints_rejected() {
        let cfg = RobotConfig::new_default(0, Uuid::nil());
        assert_eq!(
            cfg.validate(),
            Err(ConfigValidationError::ZeroJoints(0))
        );
    }

    #[test]
    fn mismatched_joint_names_rejected() {
        let mut cfg = RobotConfig::new_default(3, Uuid::nil());
        cfg.joint_names.pop();
        assert!(matches!(
            cfg.validate(),
            Err(ConfigValidationError::JointNamesLenMismatch { got: 2, expected: 3 })
        ));
    }

    #[test]
    fn jog_tolerance_exceeding_limit_rejected() {
        let mut cfg = RobotConfig::new_default(6, Uuid::nil());
        cfg.jog_joint_tol_deg = cfg.jog_joint_limit_deg + 1.0;
        assert_eq!(cfg.validate(), Err(ConfigValidationError::InvalidJogTolerance));
    }

    #[test]
    fn toml_roundtrip_with_defaults() {
        let toml_src = r#"
            joint_count = 6
            joint_names = ["j1", "j2", "j3", "j4", "j5", "j6"]
            device_uuid = "00000000-0000-0000-0000-000000000000"
        "#;
        let cfg: RobotConfig = toml::from_str(toml_src).unwrap();
        assert_eq!(cfg.joint_count, 6);
        assert_eq!(cfg.jog_joint_limit_deg, 15.0);
        assert_eq!(cfg.trajectory_error_tol_deg, 5.0);
        assert!(cfg.validate().is_ok());
    }
}
