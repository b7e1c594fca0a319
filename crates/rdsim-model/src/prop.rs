//! Box-shaped scenery bodies.

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::shape::Shape;

/// A static or dynamic box, e.g. a floor or an obstacle.
///
/// A density of zero marks the prop as immovable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "PropDesc", into = "PropDesc")]
pub struct Prop {
    density: f32,
    friction: f32,
    half_extents: Vector3<f32>,
}

/// Unvalidated serialized form of a [`Prop`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropDesc {
    /// Density (kg/m³), `0` for static props.
    pub density: f32,
    /// Friction coefficient.
    pub friction: f32,
    /// Half size along each axis (meters).
    pub half_extents: Vector3<f32>,
}

impl TryFrom<PropDesc> for Prop {
    type Error = ModelError;

    fn try_from(desc: PropDesc) -> Result<Self> {
        Prop::new(desc.density, desc.friction, desc.half_extents)
    }
}

impl From<Prop> for PropDesc {
    fn from(prop: Prop) -> Self {
        Self {
            density: prop.density,
            friction: prop.friction,
            half_extents: prop.half_extents,
        }
    }
}

impl Prop {
    /// Build a prop, rejecting out-of-range material or size.
    pub fn new(density: f32, friction: f32, half_extents: Vector3<f32>) -> Result<Self> {
        if !(density.is_finite() && density >= 0.0) {
            return Err(ModelError::InvalidDensity(density));
        }
        if !(0.0..=1.0).contains(&friction) {
            return Err(ModelError::InvalidFriction(friction));
        }
        if !half_extents.iter().all(|h| h.is_finite() && *h > 0.0) {
            return Err(ModelError::InvalidHalfExtents(
                half_extents.x,
                half_extents.y,
                half_extents.z,
            ));
        }
        Ok(Self {
            density,
            friction,
            half_extents,
        })
    }

    /// Parse and validate a prop from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Density (kg/m³).
    pub fn density(&self) -> f32 {
        self.density
    }

    /// Friction coefficient.
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Half size along each axis.
    pub fn half_extents(&self) -> Vector3<f32> {
        self.half_extents
    }

    /// Whether the prop never moves.
    pub fn is_static(&self) -> bool {
        self.density == 0.0
    }

    /// Collision and render shape.
    pub fn shape(&self) -> Shape {
        Shape::Cuboid {
            half_extents: self.half_extents,
        }
    }

    /// Mass, zero for static props.
    pub fn mass(&self) -> f32 {
        self.shape().volume() * self.density
    }
}
