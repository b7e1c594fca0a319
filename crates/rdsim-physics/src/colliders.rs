//! Collision shape generation from rdsim shapes.

use parry3d::bounding_volume::{Aabb, BoundingVolume};
use parry3d::shape::SharedShape;
use rapier3d::geometry::{Collider, ColliderBuilder, ColliderHandle, ColliderSet};
use rdsim_model::{Prop, Robot, Shape};

/// Build a parry shape for a descriptor.
///
/// Capsules are returned centered on the origin; callers offset them to the
/// middle of the link segment.
pub fn shape_to_collider(shape: &Shape) -> SharedShape {
    match *shape {
        Shape::Capsule { radius, length } => SharedShape::capsule_x(0.5 * length, radius),
        Shape::Cuboid { half_extents } => {
            SharedShape::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }
    }
}

/// Collider for one robot link, expressed in the link's body frame.
///
/// Mass comes from the capsule volume and the robot's link density.
pub fn link_collider(robot: &Robot, link: usize) -> Option<Collider> {
    let shape = robot.link_shape(link)?;
    let center = robot.link(link)?.center();
    Some(
        ColliderBuilder::new(shape_to_collider(&shape))
            .translation(center)
            .density(robot.link_density())
            .friction(robot.friction())
            .build(),
    )
}

/// Collider for a prop, centered on the body.
pub fn prop_collider(prop: &Prop) -> Collider {
    ColliderBuilder::new(shape_to_collider(&prop.shape()))
        .density(prop.density())
        .friction(prop.friction())
        .build()
}

/// Union of the world AABBs of the given colliders.
///
/// Returns `None` when no handle resolves to a collider.
pub fn merged_aabb<'a>(
    colliders: &ColliderSet,
    handles: impl IntoIterator<Item = &'a ColliderHandle>,
) -> Option<Aabb> {
    handles
        .into_iter()
        .filter_map(|h| colliders.get(*h))
        .map(|c| c.compute_aabb())
        .reduce(|acc, aabb| acc.merged(&aabb))
}
