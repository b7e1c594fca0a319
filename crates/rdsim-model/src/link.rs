//! Links and the joints connecting them to their parents.

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion, Vector3};
use serde::{Deserialize, Serialize};

/// How a link is attached to its parent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JointType {
    /// Six unconstrained degrees of freedom. Only valid on the root link.
    Free,
    /// One rotational degree of freedom about `joint_axis`.
    Hinge,
    /// Rigidly welded to the parent (or to the world, for the root).
    Fixed,
}

/// One rigid segment of an articulated robot.
///
/// A link's frame sits at its proximal joint; the segment extends `length`
/// along the local +X axis. The joint connecting it to its parent is placed
/// at `joint_pos * parent.length` along the parent's +X axis and rotated by
/// `joint_rot`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    /// Parent link index, `None` for the root.
    #[serde(default)]
    pub parent: Option<usize>,
    /// Joint connecting this link to its parent.
    pub joint_type: JointType,
    /// Joint location as a fraction of the parent's length.
    #[serde(default = "default_joint_pos")]
    pub joint_pos: f32,
    /// Joint frame rotation relative to the parent frame.
    #[serde(default = "Quaternion::identity")]
    pub joint_rot: Quaternion<f32>,
    /// Hinge rotation axis in this link's frame.
    #[serde(default = "Vector3::z")]
    pub joint_axis: Vector3<f32>,
    /// Segment length (meters).
    pub length: f32,
    /// Hinge limits `[lower, upper]` in radians.
    #[serde(default)]
    pub limits: Option<[f32; 2]>,
}

fn default_joint_pos() -> f32 {
    1.0
}

impl Link {
    /// Root link with a free joint.
    pub fn root(length: f32) -> Self {
        Self {
            parent: None,
            joint_type: JointType::Free,
            joint_pos: 0.0,
            joint_rot: Quaternion::identity(),
            joint_axis: Vector3::z(),
            length,
            limits: None,
        }
    }

    /// Hinge link attached to the distal end of `parent`.
    pub fn hinge(parent: usize, axis: Vector3<f32>, length: f32) -> Self {
        Self {
            parent: Some(parent),
            joint_type: JointType::Hinge,
            joint_pos: 1.0,
            joint_rot: Quaternion::identity(),
            joint_axis: axis,
            length,
            limits: None,
        }
    }

    /// Link welded to the distal end of `parent`.
    pub fn fixed(parent: usize, length: f32) -> Self {
        Self {
            parent: Some(parent),
            joint_type: JointType::Fixed,
            joint_pos: 1.0,
            joint_rot: Quaternion::identity(),
            joint_axis: Vector3::z(),
            length,
            limits: None,
        }
    }

    /// Set the joint position along the parent.
    pub fn with_joint_pos(mut self, joint_pos: f32) -> Self {
        self.joint_pos = joint_pos;
        self
    }

    /// Set the joint frame rotation.
    pub fn with_joint_rot(mut self, joint_rot: UnitQuaternion<f32>) -> Self {
        self.joint_rot = joint_rot.into_inner();
        self
    }

    /// Set hinge limits in radians.
    pub fn with_limits(mut self, lower: f32, upper: f32) -> Self {
        self.limits = Some([lower, upper]);
        self
    }

    /// Whether this is the root link.
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Joint rotation as a unit quaternion.
    ///
    /// Links held by a [`crate::Robot`] are already normalized.
    pub fn rotation(&self) -> UnitQuaternion<f32> {
        UnitQuaternion::new_unchecked(self.joint_rot)
    }

    /// Joint pivot in the parent's frame.
    pub fn pivot_in_parent(&self, parent_length: f32) -> Vector3<f32> {
        Vector3::new(self.joint_pos * parent_length, 0.0, 0.0)
    }

    /// Transform from the parent's frame to this link's frame.
    pub fn joint_transform(&self, parent_length: f32) -> Isometry3<f32> {
        Isometry3::from_parts(
            Translation3::from(self.pivot_in_parent(parent_length)),
            self.rotation(),
        )
    }

    /// Capsule center in this link's frame.
    pub fn center(&self) -> Vector3<f32> {
        Vector3::new(0.5 * self.length, 0.0, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_joint_transform_places_pivot_on_parent() {
        let link = Link::hinge(0, Vector3::z(), 0.5).with_joint_pos(0.5);
        let t = link.joint_transform(2.0);
        assert_relative_eq!(t.translation.vector, Vector3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_joint_rotation_is_applied() {
        let rot = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), FRAC_PI_2);
        let link = Link::hinge(0, Vector3::z(), 1.0).with_joint_rot(rot);
        let t = link.joint_transform(1.0);
        // Child +X points along parent +Y after a quarter turn about Z.
        let tip = t * nalgebra::Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(tip, nalgebra::Point3::new(1.0, 1.0, 0.0), epsilon = 1e-6);
    }

    #[test]
    fn test_link_json_defaults() {
        let link: Link =
            serde_json::from_str(r#"{"parent": 0, "joint_type": "hinge", "length": 0.25}"#)
                .unwrap();
        assert_eq!(link.joint_pos, 1.0);
        assert_eq!(link.joint_axis, Vector3::z());
        assert_eq!(link.joint_rot, Quaternion::identity());
        assert!(link.limits.is_none());
    }
}
