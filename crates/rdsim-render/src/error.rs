//! Error types for the render loop.

use rdsim_physics::PhysicsError;
use thiserror::Error;

/// Errors that stop a render loop.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Stepping or querying the engine failed.
    #[error("physics failure: {0}")]
    Physics(#[from] PhysicsError),

    /// The renderer backend failed (lost context, closed terminal, ...).
    #[error("renderer failure: {0}")]
    Backend(String),

    /// Loop configuration is out of range.
    #[error("invalid loop configuration: {0}")]
    InvalidConfig(String),

    /// `run` was called on a loop that has already stopped.
    #[error("render loop has already stopped")]
    AlreadyStopped,
}

/// Result type for render operations.
pub type Result<T> = std::result::Result<T, RenderError>;
