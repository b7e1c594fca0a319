//! Sandbox configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use rdsim_physics::EngineConfig;
use rdsim_render::LoopConfig;
use serde::{Deserialize, Serialize};

/// Contents of a `--config` TOML file.
///
/// ```toml
/// [engine]
/// time_step = 0.004166667
/// gravity = [0.0, -9.81, 0.0]
///
/// [render]
/// max_catch_up_steps = 8
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Physics engine settings.
    pub engine: EngineConfig,
    /// Real-time loop settings.
    pub render: LoopConfig,
}

impl SandboxConfig {
    /// Parse a TOML document. Missing tables and keys keep their defaults.
    pub fn from_toml(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text).context("malformed sandbox config")?;
        config.engine.validate()?;
        config.render.validate()?;
        Ok(config)
    }

    /// Read and parse a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_toml(&text).with_context(|| format!("invalid config {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(SandboxConfig::from_toml("").unwrap(), SandboxConfig::default());
    }

    #[test]
    fn test_partial_tables() {
        let config = SandboxConfig::from_toml(
            r#"
            [engine]
            gravity = [0.0, -1.62, 0.0]

            [render]
            max_catch_up_steps = 8
            "#,
        )
        .unwrap();
        assert_eq!(config.engine.gravity, [0.0, -1.62, 0.0]);
        assert_eq!(config.engine.time_step, EngineConfig::default().time_step);
        assert_eq!(config.render.max_catch_up_steps, 8);
        assert_eq!(config.render.fixed_dt, LoopConfig::default().fixed_dt);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(SandboxConfig::from_toml("[engine]\ntime_step = 0.0").is_err());
        assert!(SandboxConfig::from_toml("[render]\nfixed_dt = -1.0").is_err());
        assert!(SandboxConfig::from_toml("[render]\nfixed_dt = 0.5").is_err());
        assert!(SandboxConfig::from_toml("[render]\nmax_catch_up_steps = \"five\"").is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = SandboxConfig::load(Path::new("/nonexistent/rdsim.toml")).unwrap_err();
        assert!(err.to_string().contains("failed to read config"));
    }
}
