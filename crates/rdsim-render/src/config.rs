//! Render loop configuration.

use rdsim_physics::DEFAULT_TIME_STEP;
use serde::{Deserialize, Serialize};

use crate::error::{RenderError, Result};

/// Timing parameters for a [`crate::RenderLoop`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    /// Physics step size (seconds). Never varies with frame time.
    pub fixed_dt: f32,
    /// Most physics steps run in one loop iteration.
    pub max_catch_up_steps: u32,
    /// Longest wall-clock gap credited to one iteration (seconds).
    pub max_frame_time: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            fixed_dt: DEFAULT_TIME_STEP,
            max_catch_up_steps: 5,
            max_frame_time: 0.25,
        }
    }
}

impl LoopConfig {
    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if !(self.fixed_dt.is_finite() && self.fixed_dt > 0.0) {
            return Err(RenderError::InvalidConfig(format!(
                "fixed_dt must be positive, got {}",
                self.fixed_dt
            )));
        }
        if self.max_catch_up_steps == 0 {
            return Err(RenderError::InvalidConfig(
                "max_catch_up_steps must be at least 1".into(),
            ));
        }
        if !(self.max_frame_time.is_finite() && self.max_frame_time > 0.0) {
            return Err(RenderError::InvalidConfig(
                "max_frame_time must be positive".into(),
            ));
        }
        // One credited frame must be able to pay for at least one step.
        if self.max_frame_time < f64::from(self.fixed_dt) {
            return Err(RenderError::InvalidConfig(format!(
                "max_frame_time {} is shorter than fixed_dt {}",
                self.max_frame_time, self.fixed_dt
            )));
        }
        Ok(())
    }
}
