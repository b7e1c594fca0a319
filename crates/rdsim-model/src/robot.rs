//! Articulated robot descriptions.

use nalgebra::{Isometry3, Quaternion, Translation3, UnitQuaternion};
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::link::{JointType, Link};
use crate::shape::Shape;

/// Default upper bound on the number of links in one robot.
pub const DEFAULT_MAX_LINKS: usize = 128;

/// Structural limits applied when a robot is constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelLimits {
    /// Maximum number of links.
    pub max_links: usize,
}

impl Default for ModelLimits {
    fn default() -> Self {
        Self {
            max_links: DEFAULT_MAX_LINKS,
        }
    }
}

/// A validated kinematic tree of capsule links.
///
/// Links are stored in topological order: link 0 is the root and every other
/// link's parent has a smaller index. All structural checks happen in the
/// constructor, so code holding a `Robot` never re-validates the tree.
///
/// Robots are immutable and meant to be shared behind an `Arc`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RobotDesc", into = "RobotDesc")]
pub struct Robot {
    link_density: f32,
    link_radius: f32,
    friction: f32,
    links: Vec<Link>,
}

/// Unvalidated serialized form of a [`Robot`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RobotDesc {
    /// Density of every link (kg/m³), `0` for immovable links.
    pub link_density: f32,
    /// Capsule radius of every link (meters).
    pub link_radius: f32,
    /// Friction coefficient of every link.
    pub friction: f32,
    /// Links in topological order.
    pub links: Vec<Link>,
}

impl TryFrom<RobotDesc> for Robot {
    type Error = ModelError;

    fn try_from(desc: RobotDesc) -> Result<Self> {
        Robot::new(desc.link_density, desc.link_radius, desc.friction, desc.links)
    }
}

impl From<Robot> for RobotDesc {
    fn from(robot: Robot) -> Self {
        Self {
            link_density: robot.link_density,
            link_radius: robot.link_radius,
            friction: robot.friction,
            links: robot.links,
        }
    }
}

impl Robot {
    /// Build a robot, validating against [`ModelLimits::default`].
    pub fn new(
        link_density: f32,
        link_radius: f32,
        friction: f32,
        links: Vec<Link>,
    ) -> Result<Self> {
        Self::with_limits(
            link_density,
            link_radius,
            friction,
            links,
            &ModelLimits::default(),
        )
    }

    /// Build a robot, validating against caller-supplied limits.
    pub fn with_limits(
        link_density: f32,
        link_radius: f32,
        friction: f32,
        mut links: Vec<Link>,
        limits: &ModelLimits,
    ) -> Result<Self> {
        if !(link_density.is_finite() && link_density >= 0.0) {
            return Err(ModelError::InvalidDensity(link_density));
        }
        if !(link_radius.is_finite() && link_radius > 0.0) {
            return Err(ModelError::InvalidRadius(link_radius));
        }
        if !(0.0..=1.0).contains(&friction) {
            return Err(ModelError::InvalidFriction(friction));
        }
        if links.is_empty() {
            return Err(ModelError::EmptyRobot);
        }
        if links.len() > limits.max_links {
            return Err(ModelError::TooManyLinks {
                count: links.len(),
                max: limits.max_links,
            });
        }

        for (i, link) in links.iter_mut().enumerate() {
            validate_link(i, link)?;
        }

        Ok(Self {
            link_density,
            link_radius,
            friction,
            links,
        })
    }

    /// Parse and validate a robot from JSON.
    pub fn from_json(json: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize to a JSON string.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Links in topological order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// Link by index.
    pub fn link(&self, index: usize) -> Option<&Link> {
        self.links.get(index)
    }

    /// Number of links.
    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Density shared by all links.
    pub fn link_density(&self) -> f32 {
        self.link_density
    }

    /// Capsule radius shared by all links.
    pub fn link_radius(&self) -> f32 {
        self.link_radius
    }

    /// Friction shared by all links.
    pub fn friction(&self) -> f32 {
        self.friction
    }

    /// Number of actuated degrees of freedom (one per hinge).
    pub fn dof_count(&self) -> usize {
        self.links
            .iter()
            .filter(|l| l.joint_type == JointType::Hinge)
            .count()
    }

    /// Collision and render shape of a link.
    pub fn link_shape(&self, index: usize) -> Option<Shape> {
        self.links.get(index).map(|link| Shape::Capsule {
            radius: self.link_radius,
            length: link.length,
        })
    }

    /// Mass of a link from its capsule volume and the link density.
    pub fn link_mass(&self, index: usize) -> Option<f32> {
        self.link_shape(index)
            .map(|shape| shape.volume() * self.link_density)
    }

    /// Total mass of all links.
    pub fn total_mass(&self) -> f32 {
        (0..self.links.len())
            .filter_map(|i| self.link_mass(i))
            .sum()
    }

    /// Resting world frame of every link for a robot placed at `placement`.
    ///
    /// The root frame is `placement * joint_rot(root)`; the root's `joint_pos`
    /// is ignored. Every other frame composes its parent's frame with the
    /// joint offset and rotation.
    pub fn rest_frames(&self, placement: &Isometry3<f32>) -> Vec<Isometry3<f32>> {
        let mut frames: Vec<Isometry3<f32>> = Vec::with_capacity(self.links.len());
        for link in &self.links {
            let frame = match link.parent {
                None => {
                    placement * Isometry3::from_parts(Translation3::identity(), link.rotation())
                }
                Some(p) => frames[p] * link.joint_transform(self.links[p].length),
            };
            frames.push(frame);
        }
        frames
    }
}

fn validate_link(i: usize, link: &mut Link) -> Result<()> {
    match (i, link.parent) {
        (0, Some(p)) => return Err(ModelError::RootHasParent(p)),
        (0, None) => {}
        (_, None) => return Err(ModelError::MissingParent { link: i }),
        (_, Some(p)) if p >= i => return Err(ModelError::InvalidParent { link: i, parent: p }),
        _ => {}
    }

    if i != 0 && link.joint_type == JointType::Free {
        return Err(ModelError::FreeJointNotRoot { link: i });
    }
    if !(link.length.is_finite() && link.length > 0.0) {
        return Err(ModelError::InvalidLength {
            link: i,
            length: link.length,
        });
    }
    if !link.joint_pos.is_finite() {
        return Err(ModelError::InvalidJointPosition { link: i });
    }

    let rot_norm = link.joint_rot.norm();
    if !(rot_norm.is_finite() && rot_norm > f32::EPSILON) {
        return Err(ModelError::DegenerateJointRotation { link: i });
    }
    link.joint_rot = UnitQuaternion::from_quaternion(link.joint_rot).into_inner();
    if link.joint_rot.w < 0.0 {
        link.joint_rot = Quaternion::from(-link.joint_rot.coords);
    }

    if link.joint_type == JointType::Hinge {
        let axis_norm = link.joint_axis.norm();
        if !(axis_norm.is_finite() && axis_norm > f32::EPSILON) {
            return Err(ModelError::DegenerateJointAxis { link: i });
        }
        link.joint_axis /= axis_norm;

        if let Some([lower, upper]) = link.limits {
            if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
                return Err(ModelError::InvalidJointLimits {
                    link: i,
                    lower,
                    upper,
                });
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::{Point3, Vector3};

    fn snake(n: usize) -> Vec<Link> {
        let mut links = vec![Link::root(0.5)];
        for i in 1..n {
            links.push(Link::hinge(i - 1, Vector3::z(), 0.5));
        }
        links
    }

    #[test]
    fn test_valid_snake() {
        let robot = Robot::new(10.0, 0.05, 0.9, snake(5)).unwrap();
        assert_eq!(robot.link_count(), 5);
        assert_eq!(robot.dof_count(), 4);
        for (i, link) in robot.links().iter().enumerate() {
            match link.parent {
                None => assert_eq!(i, 0),
                Some(p) => assert!(p < i),
            }
        }
    }

    #[test]
    fn test_rejects_forward_parent() {
        let mut links = snake(3);
        links[1].parent = Some(2);
        assert_eq!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::InvalidParent { link: 1, parent: 2 })
        );
    }

    #[test]
    fn test_rejects_self_parent() {
        let mut links = snake(3);
        links[2].parent = Some(2);
        assert!(matches!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::InvalidParent { link: 2, .. })
        ));
    }

    #[test]
    fn test_rejects_orphan_and_parented_root() {
        let mut links = snake(2);
        links[1].parent = None;
        assert_eq!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::MissingParent { link: 1 })
        );

        let mut links = snake(2);
        links[0].parent = Some(0);
        assert_eq!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::RootHasParent(0))
        );
    }

    #[test]
    fn test_rejects_zero_hinge_axis() {
        let mut links = snake(2);
        links[1].joint_axis = Vector3::zeros();
        assert_eq!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::DegenerateJointAxis { link: 1 })
        );
    }

    #[test]
    fn test_zero_axis_allowed_on_fixed_link() {
        let mut links = vec![Link::root(0.5), Link::fixed(0, 0.5)];
        links[1].joint_axis = Vector3::zeros();
        assert!(Robot::new(10.0, 0.05, 0.9, links).is_ok());
    }

    #[test]
    fn test_hinge_axis_is_normalized() {
        let mut links = snake(2);
        links[1].joint_axis = Vector3::new(0.0, 0.0, 3.0);
        let robot = Robot::new(10.0, 0.05, 0.9, links).unwrap();
        assert_relative_eq!(robot.links()[1].joint_axis, Vector3::z());
    }

    #[test]
    fn test_rejects_free_child() {
        let mut links = snake(2);
        links[1].joint_type = JointType::Free;
        assert_eq!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::FreeJointNotRoot { link: 1 })
        );
    }

    #[test]
    fn test_rejects_out_of_range_material() {
        assert_eq!(
            Robot::new(10.0, 0.05, 1.5, snake(2)),
            Err(ModelError::InvalidFriction(1.5))
        );
        assert_eq!(
            Robot::new(-1.0, 0.05, 0.5, snake(2)),
            Err(ModelError::InvalidDensity(-1.0))
        );
        assert_eq!(
            Robot::new(1.0, 0.0, 0.5, snake(2)),
            Err(ModelError::InvalidRadius(0.0))
        );
        assert!(matches!(
            Robot::new(f32::NAN, 0.05, 0.5, snake(2)),
            Err(ModelError::InvalidDensity(_))
        ));
    }

    #[test]
    fn test_rejects_too_many_links() {
        let limits = ModelLimits { max_links: 4 };
        assert_eq!(
            Robot::with_limits(10.0, 0.05, 0.9, snake(5), &limits),
            Err(ModelError::TooManyLinks { count: 5, max: 4 })
        );
        assert!(Robot::with_limits(10.0, 0.05, 0.9, snake(4), &limits).is_ok());
    }

    #[test]
    fn test_rejects_reversed_limits() {
        let mut links = snake(2);
        links[1] = links[1].clone().with_limits(1.0, -1.0);
        assert!(matches!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::InvalidJointLimits { link: 1, .. })
        ));
    }

    #[test]
    fn test_rejects_empty_and_degenerate_rotation() {
        assert_eq!(Robot::new(10.0, 0.05, 0.9, vec![]), Err(ModelError::EmptyRobot));

        let mut links = snake(2);
        links[1].joint_rot = Quaternion::new(0.0, 0.0, 0.0, 0.0);
        assert_eq!(
            Robot::new(10.0, 0.05, 0.9, links),
            Err(ModelError::DegenerateJointRotation { link: 1 })
        );
    }

    #[test]
    fn test_rest_frames_chain_along_x() {
        let robot = Robot::new(10.0, 0.05, 0.9, snake(3)).unwrap();
        let placement = Isometry3::translation(0.0, 1.0, 0.0);
        let frames = robot.rest_frames(&placement);
        assert_eq!(frames.len(), 3);
        assert_relative_eq!(frames[0].translation.vector, Vector3::new(0.0, 1.0, 0.0));
        assert_relative_eq!(frames[1].translation.vector, Vector3::new(0.5, 1.0, 0.0));
        assert_relative_eq!(frames[2].translation.vector, Vector3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn test_rest_frames_compose_rotations() {
        let quarter =
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), std::f32::consts::FRAC_PI_2);
        let links = vec![
            Link::root(1.0),
            Link::hinge(0, Vector3::z(), 1.0).with_joint_rot(quarter),
            Link::hinge(1, Vector3::z(), 1.0).with_joint_rot(quarter),
        ];
        let robot = Robot::new(1.0, 0.1, 0.5, links).unwrap();
        let frames = robot.rest_frames(&Isometry3::identity());
        let tip = frames[2] * Point3::new(1.0, 0.0, 0.0);
        assert_relative_eq!(tip, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-5);
    }

    #[test]
    fn test_json_roundtrip_validates() {
        let robot = Robot::new(10.0, 0.05, 0.9, snake(3)).unwrap();
        let json = robot.to_json().unwrap();
        let restored = Robot::from_json(&json).unwrap();
        assert_eq!(robot, restored);

        let bad = json.replace("0.9", "1.9");
        assert!(Robot::from_json(&bad).is_err());
    }

    #[test]
    fn test_link_mass_uses_capsule_volume() {
        let robot = Robot::new(10.0, 0.05, 0.9, snake(1)).unwrap();
        let expected = 10.0
            * (std::f32::consts::PI * 0.05 * 0.05 * 0.5
                + 4.0 / 3.0 * std::f32::consts::PI * 0.05f32.powi(3));
        assert_relative_eq!(robot.link_mass(0).unwrap(), expected, epsilon = 1e-6);
        assert_relative_eq!(robot.total_mass(), expected, epsilon = 1e-6);
    }
}
