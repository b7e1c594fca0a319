//! Engine configuration.

use rdsim_model::DEFAULT_MAX_LINKS;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, Result};

/// Default physics time step (seconds).
pub const DEFAULT_TIME_STEP: f32 = 1.0 / 240.0;

/// Tunables for a [`crate::SimulationEngine`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Step size used by [`crate::SimulationEngine::step_default`].
    pub time_step: f32,
    /// Gravity acceleration (m/s²).
    pub gravity: [f32; 3],
    /// Maximum number of live robots and props combined.
    pub max_instances: usize,
    /// Maximum number of links in one robot.
    pub max_links: usize,
    /// Hinge motor stiffness used for position targets.
    pub motor_stiffness: f32,
    /// Hinge motor damping used for position targets.
    pub motor_damping: f32,
    /// Maximum hinge motor torque (Nm).
    pub max_motor_force: f32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            time_step: DEFAULT_TIME_STEP,
            gravity: [0.0, -9.81, 0.0],
            max_instances: 256,
            max_links: DEFAULT_MAX_LINKS,
            motor_stiffness: 1000.0,
            motor_damping: 100.0,
            max_motor_force: 1000.0,
        }
    }
}

impl EngineConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            return Err(PhysicsError::InvalidConfig(format!(
                "time_step must be positive, got {}",
                self.time_step
            )));
        }
        if !self.gravity.iter().all(|g| g.is_finite()) {
            return Err(PhysicsError::InvalidConfig("gravity must be finite".into()));
        }
        if self.max_instances == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_instances must be at least 1".into(),
            ));
        }
        if self.max_links == 0 {
            return Err(PhysicsError::InvalidConfig(
                "max_links must be at least 1".into(),
            ));
        }
        let motor = [self.motor_stiffness, self.motor_damping, self.max_motor_force];
        if !motor.iter().all(|m| m.is_finite() && *m >= 0.0) {
            return Err(PhysicsError::InvalidConfig(
                "motor parameters must be finite and non-negative".into(),
            ));
        }
        Ok(())
    }
}
