//! TOML configuration loading for [`RobotConfig`] (§3).
//!
//! Mirrors `evo_control_unit::config::{load_config, load_config_from_strings}`:
//! read → parse → validate, with a `ConfigError` that distinguishes I/O,
//! parse, and validation failures.

use std::path::Path;

use robocore_common::config::{ConfigValidationError, RobotConfig};

/// Configuration loading/validation error.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(String),
    #[error("config parse error: {0}")]
    Parse(String),
    #[error("config validation: {0}")]
    Validation(#[from] ConfigValidationError),
}

/// Load and validate a [`RobotConfig`] from a TOML file.
pub fn load_config(path: &Path) -> Result<RobotConfig, ConfigError> {
    let toml_src = std::fs::read_to_string(path)
        .map_err(|e| ConfigError::Io(format!("failed to read {}: {e}", path.display())))?;
    load_config_from_str(&toml_src)
}

/// Load and validate a [`RobotConfig`] from a TOML string (used by tests).
pub fn load_config_from_str(toml_src: &str) -> Result<RobotConfig, ConfigError> {
    let config: RobotConfig = toml::from_str(toml_src).map_err(|e| {
        tracing::error!(error = %e, "config parse failed");
        ConfigError::Parse(e.to_string())
    })?;
    if let Err(e) = config.validate() {
        tracing::error!(error = %e, "config validation failed");
        return Err(e.into());
    }
    tracing::info!(joint_count = config.joint_count, device_uuid = %config.device_uuid, "config loaded");
    Ok(config)
}
