//! Error types for physics simulation.

use thiserror::Error;

use crate::engine::{PropIndex, RobotIndex};

/// Errors that can occur while building or stepping a simulation.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PhysicsError {
    /// Engine configuration is out of range.
    #[error("invalid engine configuration: {0}")]
    InvalidConfig(String),

    /// Robot handle is not live in this engine.
    #[error("robot {0:?} is not live in this engine")]
    UnknownRobot(RobotIndex),

    /// Prop handle is not live in this engine.
    #[error("prop {0:?} is not live in this engine")]
    UnknownProp(PropIndex),

    /// Link index past the end of the robot.
    #[error("link {link} out of range for robot with {count} links")]
    LinkOutOfRange {
        /// Requested link.
        link: usize,
        /// Number of links in the robot.
        count: usize,
    },

    /// Live instance limit reached.
    #[error("instance limit of {max} reached")]
    TooManyInstances {
        /// Configured maximum.
        max: usize,
    },

    /// Robot exceeds the engine's link limit.
    #[error("robot has {count} links, engine maximum is {max}")]
    TooManyLinks {
        /// Links in the robot.
        count: usize,
        /// Configured maximum.
        max: usize,
    },

    /// Joint target vector does not match the robot's degrees of freedom.
    #[error("expected {expected} joint targets, got {got}")]
    DofMismatch {
        /// Robot degrees of freedom.
        expected: usize,
        /// Targets supplied.
        got: usize,
    },

    /// Step size is zero, negative or not finite.
    #[error("invalid time step {0}")]
    InvalidTimestep(f32),

    /// A body transform became non-finite.
    #[error("simulation diverged: {0}")]
    Diverged(String),

    /// A live instance has lost its physics body.
    #[error("physics body missing for {0}")]
    MissingBody(String),

    /// Snapshot was taken by another engine or with a different set of live
    /// instances.
    #[error("snapshot does not match this engine or its live instances")]
    StaleSnapshot,
}

/// Result type for physics operations.
pub type Result<T> = std::result::Result<T, PhysicsError>;
