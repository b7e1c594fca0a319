//! Shape descriptors shared by the engine and renderers.

use std::f32::consts::PI;

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Geometry of a single body, expressed in the body's own frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Shape {
    /// Capsule whose segment runs from the origin to `length` along +X.
    Capsule {
        /// Cap and cylinder radius.
        radius: f32,
        /// Length of the inner segment.
        length: f32,
    },
    /// Box centered at the origin.
    Cuboid {
        /// Half size along each axis.
        half_extents: Vector3<f32>,
    },
}

impl Shape {
    /// Enclosed volume in cubic meters.
    pub fn volume(&self) -> f32 {
        match *self {
            Shape::Capsule { radius, length } => {
                PI * radius * radius * length + 4.0 / 3.0 * PI * radius.powi(3)
            }
            Shape::Cuboid { half_extents } => {
                8.0 * half_extents.x * half_extents.y * half_extents.z
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_capsule_volume() {
        let shape = Shape::Capsule {
            radius: 1.0,
            length: 2.0,
        };
        assert_relative_eq!(shape.volume(), 2.0 * PI + 4.0 / 3.0 * PI, epsilon = 1e-5);
    }

    #[test]
    fn test_cuboid_volume() {
        let shape = Shape::Cuboid {
            half_extents: Vector3::new(10.0, 1.0, 10.0),
        };
        assert_relative_eq!(shape.volume(), 800.0);
    }
}
