//! Joint conversion from rdsim links to Rapier.

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use rapier3d::dynamics::{GenericJoint, GenericJointBuilder, JointAxesMask, JointAxis, MotorModel};
use rdsim_model::{JointType, Link};

/// Rapier axis driven by hinge motors and limits.
pub const HINGE_AXIS: JointAxis = JointAxis::AngX;

/// Rotation taking the joint frame's X axis onto `axis`.
///
/// Rapier hinges rotate about the local X axis of their joint frames.
pub fn axis_frame(axis: &Vector3<f32>) -> UnitQuaternion<f32> {
    UnitQuaternion::rotation_between(&Vector3::x(), axis).unwrap_or_else(|| {
        // Anti-parallel to X: any half turn about a perpendicular axis works.
        UnitQuaternion::from_axis_angle(&Vector3::y_axis(), std::f32::consts::PI)
    })
}

/// Create a Rapier joint connecting a child link to its parent body.
///
/// # Arguments
///
/// * `link` - The child link
/// * `parent_length` - Length of the parent link (scales `joint_pos`)
/// * `max_motor_force` - Torque bound for hinge motors
///
/// # Returns
///
/// `None` for joint types that create no constraint (free joints).
pub fn link_joint(link: &Link, parent_length: f32, max_motor_force: f32) -> Option<GenericJoint> {
    let offset = link.joint_transform(parent_length);
    match link.joint_type {
        JointType::Free => None,
        JointType::Hinge => Some(create_hinge_joint(
            offset,
            &link.joint_axis,
            link.limits,
            max_motor_force,
        )),
        JointType::Fixed => Some(create_fixed_joint(offset)),
    }
}

/// Joint attaching a root link to an immovable world anchor.
///
/// The anchor body is placed at the root's resting frame, so both joint
/// frames coincide with the body origins.
pub fn anchor_joint(root: &Link, max_motor_force: f32) -> Option<GenericJoint> {
    match root.joint_type {
        JointType::Hinge => Some(create_hinge_joint(
            Isometry3::identity(),
            &root.joint_axis,
            root.limits,
            max_motor_force,
        )),
        JointType::Free | JointType::Fixed => None,
    }
}

fn create_hinge_joint(
    parent_frame: Isometry3<f32>,
    axis: &Vector3<f32>,
    limits: Option<[f32; 2]>,
    max_motor_force: f32,
) -> GenericJoint {
    let axis_rot = axis_frame(axis);
    let frame1 = parent_frame * Isometry3::from_parts(Translation3::identity(), axis_rot);
    let frame2 = Isometry3::from_parts(Translation3::identity(), axis_rot);

    let mut builder = GenericJointBuilder::new(JointAxesMask::LOCKED_REVOLUTE_AXES)
        .local_frame1(frame1)
        .local_frame2(frame2)
        .contacts_enabled(false);

    if let Some(limits) = limits {
        builder = builder.limits(HINGE_AXIS, limits);
    }

    // Motor stays idle until a position target is set.
    builder = builder
        .motor_model(HINGE_AXIS, MotorModel::AccelerationBased)
        .motor_max_force(HINGE_AXIS, max_motor_force);

    builder.build()
}

fn create_fixed_joint(parent_frame: Isometry3<f32>) -> GenericJoint {
    GenericJointBuilder::new(JointAxesMask::LOCKED_FIXED_AXES)
        .local_frame1(parent_frame)
        .local_frame2(Isometry3::identity())
        .contacts_enabled(false)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_axis_frame_maps_x_to_axis() {
        let diagonal = Vector3::new(1.0, 1.0, 0.0).normalize();
        for axis in [Vector3::z(), Vector3::y(), -Vector3::x(), diagonal] {
            let rot = axis_frame(&axis);
            assert_relative_eq!(rot * Vector3::x(), axis, epsilon = 1e-6);
        }
    }

    #[test]
    fn test_hinge_joint_frames() {
        let link = Link::hinge(0, Vector3::z(), 0.5);
        let joint = link_joint(&link, 0.5, 100.0).unwrap();

        assert_relative_eq!(joint.local_anchor1().coords, Vector3::new(0.5, 0.0, 0.0));
        assert_relative_eq!(joint.local_anchor2().coords, Vector3::zeros());
        assert_relative_eq!(*joint.local_axis1(), Vector3::z(), epsilon = 1e-6);
        assert_relative_eq!(*joint.local_axis2(), Vector3::z(), epsilon = 1e-6);
        assert!(!joint.contacts_enabled);
    }

    #[test]
    fn test_hinge_limits_are_applied() {
        let link = Link::hinge(0, Vector3::z(), 0.5).with_limits(-1.0, 0.5);
        let joint = link_joint(&link, 0.5, 100.0).unwrap();
        let limits = joint.limits(HINGE_AXIS).unwrap();
        assert_eq!(limits.min, -1.0);
        assert_eq!(limits.max, 0.5);
    }

    #[test]
    fn test_free_and_fixed() {
        assert!(link_joint(&Link::root(0.5), 0.0, 100.0).is_none());
        let joint = link_joint(&Link::fixed(0, 0.5).with_joint_pos(0.5), 2.0, 100.0).unwrap();
        assert_eq!(joint.locked_axes, JointAxesMask::LOCKED_FIXED_AXES);
        assert_relative_eq!(joint.local_anchor1().coords, Vector3::new(1.0, 0.0, 0.0));
        assert!(anchor_joint(&Link::root(0.5), 100.0).is_none());
    }
}
