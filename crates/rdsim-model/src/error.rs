//! Error types for model construction.

use thiserror::Error;

/// Reasons a robot or prop description is rejected at construction time.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    /// Robot has no links.
    #[error("robot has no links")]
    EmptyRobot,

    /// Link 0 names a parent.
    #[error("root link must not have a parent (got parent {0})")]
    RootHasParent(usize),

    /// A non-root link has no parent.
    #[error("link {link} has no parent; only link 0 may be the root")]
    MissingParent {
        /// Offending link index.
        link: usize,
    },

    /// A parent index does not precede its child.
    #[error("link {link} has parent {parent}, which does not precede it")]
    InvalidParent {
        /// Offending link index.
        link: usize,
        /// Parent index as given.
        parent: usize,
    },

    /// A FREE joint on a non-root link.
    #[error("link {link} uses a free joint; only the root may be free")]
    FreeJointNotRoot {
        /// Offending link index.
        link: usize,
    },

    /// Hinge axis is zero or not finite.
    #[error("link {link} has a degenerate hinge axis")]
    DegenerateJointAxis {
        /// Offending link index.
        link: usize,
    },

    /// Joint rotation quaternion is zero or not finite.
    #[error("link {link} has a degenerate joint rotation")]
    DegenerateJointRotation {
        /// Offending link index.
        link: usize,
    },

    /// Joint position is not finite.
    #[error("link {link} has a non-finite joint position")]
    InvalidJointPosition {
        /// Offending link index.
        link: usize,
    },

    /// Link length is not strictly positive.
    #[error("link {link} has invalid length {length}")]
    InvalidLength {
        /// Offending link index.
        link: usize,
        /// Length as given.
        length: f32,
    },

    /// Hinge limits are reversed or not finite.
    #[error("link {link} has invalid joint limits [{lower}, {upper}]")]
    InvalidJointLimits {
        /// Offending link index.
        link: usize,
        /// Lower limit (radians).
        lower: f32,
        /// Upper limit (radians).
        upper: f32,
    },

    /// Link radius is not strictly positive.
    #[error("link radius must be positive, got {0}")]
    InvalidRadius(f32),

    /// Density is negative or not finite.
    #[error("density must be >= 0, got {0}")]
    InvalidDensity(f32),

    /// Friction outside `[0, 1]`.
    #[error("friction must be within [0, 1], got {0}")]
    InvalidFriction(f32),

    /// Prop half extents are not strictly positive.
    #[error("half extents must be positive, got [{0}, {1}, {2}]")]
    InvalidHalfExtents(f32, f32, f32),

    /// More links than the configured maximum.
    #[error("robot has {count} links, maximum is {max}")]
    TooManyLinks {
        /// Number of links given.
        count: usize,
        /// Configured maximum.
        max: usize,
    },
}

/// Result type for model construction.
pub type Result<T> = std::result::Result<T, ModelError>;
