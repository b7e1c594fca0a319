//! Simulation engine management using Rapier3d.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3};
use parry3d::bounding_volume::Aabb;
use rapier3d::dynamics::{
    CCDSolver, ImpulseJointHandle, ImpulseJointSet, IntegrationParameters, IslandManager,
    MultibodyJointSet, RigidBodyBuilder, RigidBodyHandle, RigidBodySet, RigidBodyType,
};
use rapier3d::geometry::{BroadPhaseMultiSap, ColliderSet, NarrowPhase};
use rapier3d::pipeline::{PhysicsPipeline, QueryPipeline};
use rdsim_model::{JointType, Prop, Robot};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, trace};

use crate::colliders::{link_collider, merged_aabb, prop_collider};
use crate::config::EngineConfig;
use crate::error::{PhysicsError, Result};
use crate::joints::{anchor_joint, link_joint, HINGE_AXIS};
use crate::snapshot::Snapshot;

static NEXT_ENGINE_ID: AtomicU64 = AtomicU64::new(0);

new_key_type! {
    /// Handle to a live robot instance.
    pub struct RobotIndex;
    /// Handle to a live prop instance.
    pub struct PropIndex;
}

/// Every Rapier structure that makes up the world state.
///
/// Grouped so the whole world can be cloned for snapshots.
#[derive(Clone)]
pub(crate) struct PhysicsState {
    pub(crate) islands: IslandManager,
    pub(crate) broad_phase: BroadPhaseMultiSap,
    pub(crate) narrow_phase: NarrowPhase,
    pub(crate) bodies: RigidBodySet,
    pub(crate) colliders: ColliderSet,
    pub(crate) impulse_joints: ImpulseJointSet,
    pub(crate) multibody_joints: MultibodyJointSet,
    pub(crate) ccd_solver: CCDSolver,
    pub(crate) query_pipeline: QueryPipeline,
}

impl PhysicsState {
    fn new() -> Self {
        Self {
            islands: IslandManager::new(),
            broad_phase: BroadPhaseMultiSap::new(),
            narrow_phase: NarrowPhase::new(),
            bodies: RigidBodySet::new(),
            colliders: ColliderSet::new(),
            impulse_joints: ImpulseJointSet::new(),
            multibody_joints: MultibodyJointSet::new(),
            ccd_solver: CCDSolver::new(),
            query_pipeline: QueryPipeline::new(),
        }
    }

    fn remove_body(&mut self, handle: RigidBodyHandle) {
        self.bodies.remove(
            handle,
            &mut self.islands,
            &mut self.colliders,
            &mut self.impulse_joints,
            &mut self.multibody_joints,
            true,
        );
    }

    fn position(&self, handle: RigidBodyHandle) -> Option<Isometry3<f32>> {
        self.bodies.get(handle).map(|b| *b.position())
    }
}

/// Physics objects created for one `add_robot` call.
#[derive(Clone)]
struct LiveRobot {
    model: Arc<Robot>,
    /// One body per link, in link order.
    link_bodies: Vec<RigidBodyHandle>,
    /// Immovable body a hinged root is attached to.
    anchor: Option<RigidBodyHandle>,
    /// Hinge joints in link order; one per degree of freedom.
    hinges: Vec<ImpulseJointHandle>,
}

/// Physics objects created for one `add_prop` call.
#[derive(Clone)]
struct LiveProp {
    model: Arc<Prop>,
    body: RigidBodyHandle,
}

/// Live physical world built from robot and prop models.
///
/// Models are shared read-only; the engine exclusively owns every body,
/// collider and joint it creates. Handles are generational, so a handle to a
/// removed instance never resolves to a later one.
pub struct SimulationEngine {
    /// Process-unique; ties snapshots to the engine that took them.
    id: u64,
    config: EngineConfig,
    pipeline: PhysicsPipeline,
    gravity: Vector3<f32>,
    integration_params: IntegrationParameters,
    state: PhysicsState,
    robots: SlotMap<RobotIndex, LiveRobot>,
    props: SlotMap<PropIndex, LiveProp>,
}

impl Default for SimulationEngine {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl SimulationEngine {
    /// Create an empty engine with the given configuration.
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let integration_params = IntegrationParameters {
            dt: config.time_step,
            ..IntegrationParameters::default()
        };
        Self {
            id: NEXT_ENGINE_ID.fetch_add(1, Ordering::Relaxed),
            pipeline: PhysicsPipeline::new(),
            gravity: Vector3::from(config.gravity),
            integration_params,
            state: PhysicsState::new(),
            robots: SlotMap::with_key(),
            props: SlotMap::with_key(),
            config,
        }
    }

    /// Engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Configured step size.
    pub fn time_step(&self) -> f32 {
        self.config.time_step
    }

    /// Set gravity vector.
    ///
    /// Unlike [`EngineConfig::validate`], this does not reject non-finite
    /// components; the next [`step`](Self::step) then fails with
    /// [`PhysicsError::Diverged`].
    pub fn set_gravity(&mut self, x: f32, y: f32, z: f32) {
        self.gravity = Vector3::new(x, y, z);
    }

    /// Current gravity vector.
    pub fn gravity(&self) -> Vector3<f32> {
        self.gravity
    }

    fn check_capacity(&self) -> Result<()> {
        if self.instance_count() >= self.config.max_instances {
            return Err(PhysicsError::TooManyInstances {
                max: self.config.max_instances,
            });
        }
        Ok(())
    }

    /// Instantiate a robot with its root frame at the given world pose.
    ///
    /// Links are created in index order, so every parent body exists and has
    /// a resolved pose before its children are attached.
    pub fn add_robot(
        &mut self,
        model: &Arc<Robot>,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
    ) -> Result<RobotIndex> {
        self.check_capacity()?;
        if model.link_count() > self.config.max_links {
            return Err(PhysicsError::TooManyLinks {
                count: model.link_count(),
                max: self.config.max_links,
            });
        }

        let placement = Isometry3::from_parts(Translation3::from(position), orientation);
        let frames = model.rest_frames(&placement);
        let immovable = model.link_density() == 0.0;

        let mut link_bodies = Vec::with_capacity(model.link_count());
        let mut anchor = None;
        let mut hinges = Vec::with_capacity(model.dof_count());

        for (i, link) in model.links().iter().enumerate() {
            let fixed_root = link.is_root() && link.joint_type == JointType::Fixed;
            let body_type = if immovable || fixed_root {
                RigidBodyType::Fixed
            } else {
                RigidBodyType::Dynamic
            };
            let body = RigidBodyBuilder::new(body_type).position(frames[i]).build();
            let body_handle = self.state.bodies.insert(body);
            if let Some(collider) = link_collider(model, i) {
                self.state
                    .colliders
                    .insert_with_parent(collider, body_handle, &mut self.state.bodies);
            }

            let joint = match link.parent {
                Some(p) => link_joint(link, model.links()[p].length, self.config.max_motor_force)
                    .map(|j| (link_bodies[p], j)),
                None => anchor_joint(link, self.config.max_motor_force).map(|j| {
                    // World-grounded hinge: fixed anchor at the root's resting frame
                    let anchor_body = self
                        .state
                        .bodies
                        .insert(RigidBodyBuilder::fixed().position(frames[i]).build());
                    anchor = Some(anchor_body);
                    (anchor_body, j)
                }),
            };

            if let Some((parent_body, joint)) = joint {
                let handle = self
                    .state
                    .impulse_joints
                    .insert(parent_body, body_handle, joint, true);
                if link.joint_type == JointType::Hinge {
                    hinges.push(handle);
                }
            }

            link_bodies.push(body_handle);
        }

        let index = self.robots.insert(LiveRobot {
            model: Arc::clone(model),
            link_bodies,
            anchor,
            hinges,
        });
        debug!(?index, links = model.link_count(), "added robot");
        Ok(index)
    }

    /// Instantiate a prop centered at the given world pose.
    pub fn add_prop(
        &mut self,
        model: &Arc<Prop>,
        position: Vector3<f32>,
        orientation: UnitQuaternion<f32>,
    ) -> Result<PropIndex> {
        self.check_capacity()?;

        let body_type = if model.is_static() {
            RigidBodyType::Fixed
        } else {
            RigidBodyType::Dynamic
        };
        let pose = Isometry3::from_parts(Translation3::from(position), orientation);
        let body = self
            .state
            .bodies
            .insert(RigidBodyBuilder::new(body_type).position(pose).build());
        self.state
            .colliders
            .insert_with_parent(prop_collider(model), body, &mut self.state.bodies);

        let index = self.props.insert(LiveProp {
            model: Arc::clone(model),
            body,
        });
        debug!(?index, is_static = model.is_static(), "added prop");
        Ok(index)
    }

    /// Destroy every body, collider and joint of a robot.
    pub fn remove_robot(&mut self, index: RobotIndex) -> Result<()> {
        let robot = self
            .robots
            .remove(index)
            .ok_or(PhysicsError::UnknownRobot(index))?;
        // Removing a body also removes its colliders and attached joints.
        for handle in robot.link_bodies.into_iter().chain(robot.anchor) {
            self.state.remove_body(handle);
        }
        debug!(?index, "removed robot");
        Ok(())
    }

    /// Destroy a prop's body and collider.
    pub fn remove_prop(&mut self, index: PropIndex) -> Result<()> {
        let prop = self
            .props
            .remove(index)
            .ok_or(PhysicsError::UnknownProp(index))?;
        self.state.remove_body(prop.body);
        debug!(?index, "removed prop");
        Ok(())
    }

    /// Step the physics simulation by exactly `dt` seconds.
    ///
    /// Fails if `dt` is not a positive finite number, or if any live body
    /// ends up with a non-finite transform.
    pub fn step(&mut self, dt: f32) -> Result<()> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(PhysicsError::InvalidTimestep(dt));
        }
        self.integration_params.dt = dt;

        self.pipeline.step(
            &self.gravity,
            &self.integration_params,
            &mut self.state.islands,
            &mut self.state.broad_phase,
            &mut self.state.narrow_phase,
            &mut self.state.bodies,
            &mut self.state.colliders,
            &mut self.state.impulse_joints,
            &mut self.state.multibody_joints,
            &mut self.state.ccd_solver,
            Some(&mut self.state.query_pipeline),
            &(),
            &(),
        );
        trace!(dt, "stepped");

        self.check_finite()
    }

    /// Step by the configured time step.
    pub fn step_default(&mut self) -> Result<()> {
        self.step(self.config.time_step)
    }

    fn check_finite(&self) -> Result<()> {
        for (index, robot) in &self.robots {
            for (link, &handle) in robot.link_bodies.iter().enumerate() {
                if !self.state.position(handle).is_some_and(is_finite) {
                    return Err(PhysicsError::Diverged(format!(
                        "robot {index:?} link {link} has a non-finite transform"
                    )));
                }
            }
        }
        for (index, prop) in &self.props {
            if !self.state.position(prop.body).is_some_and(is_finite) {
                return Err(PhysicsError::Diverged(format!(
                    "prop {index:?} has a non-finite transform"
                )));
            }
        }
        Ok(())
    }

    fn robot(&self, index: RobotIndex) -> Result<&LiveRobot> {
        self.robots
            .get(index)
            .ok_or(PhysicsError::UnknownRobot(index))
    }

    fn prop(&self, index: PropIndex) -> Result<&LiveProp> {
        self.props.get(index).ok_or(PhysicsError::UnknownProp(index))
    }

    /// World transform of a link's frame (its proximal joint).
    pub fn get_link_transform(&self, robot: RobotIndex, link: usize) -> Result<Isometry3<f32>> {
        let live = self.robot(robot)?;
        let handle = live
            .link_bodies
            .get(link)
            .ok_or(PhysicsError::LinkOutOfRange {
                link,
                count: live.link_bodies.len(),
            })?;
        self.state
            .position(*handle)
            .ok_or_else(|| PhysicsError::MissingBody(format!("robot {robot:?} link {link}")))
    }

    /// World transform of a prop's center.
    pub fn get_prop_transform(&self, prop: PropIndex) -> Result<Isometry3<f32>> {
        let live = self.prop(prop)?;
        self.state
            .position(live.body)
            .ok_or_else(|| PhysicsError::MissingBody(format!("prop {prop:?}")))
    }

    /// Linear velocity of a link body.
    pub fn get_link_velocity(&self, robot: RobotIndex, link: usize) -> Result<Vector3<f32>> {
        let live = self.robot(robot)?;
        let handle = live
            .link_bodies
            .get(link)
            .ok_or(PhysicsError::LinkOutOfRange {
                link,
                count: live.link_bodies.len(),
            })?;
        self.state
            .bodies
            .get(*handle)
            .map(|b| *b.linvel())
            .ok_or_else(|| PhysicsError::MissingBody(format!("robot {robot:?} link {link}")))
    }

    /// Union of the world AABBs of all of a robot's links.
    pub fn robot_world_aabb(&self, robot: RobotIndex) -> Result<Aabb> {
        let live = self.robot(robot)?;
        let handles = live
            .link_bodies
            .iter()
            .filter_map(|h| self.state.bodies.get(*h))
            .flat_map(|b| b.colliders().iter());
        merged_aabb(&self.state.colliders, handles)
            .ok_or_else(|| PhysicsError::MissingBody(format!("robot {robot:?}")))
    }

    /// Number of actuated joints of a live robot.
    pub fn robot_dof_count(&self, robot: RobotIndex) -> Result<usize> {
        Ok(self.robot(robot)?.hinges.len())
    }

    /// Drive each hinge towards a target angle (radians), in link order.
    pub fn set_joint_target_positions(&mut self, robot: RobotIndex, targets: &[f32]) -> Result<()> {
        let live = self
            .robots
            .get(robot)
            .ok_or(PhysicsError::UnknownRobot(robot))?;
        if targets.len() != live.hinges.len() {
            return Err(PhysicsError::DofMismatch {
                expected: live.hinges.len(),
                got: targets.len(),
            });
        }
        for (&handle, &target) in live.hinges.iter().zip(targets) {
            if let Some(joint) = self.state.impulse_joints.get_mut(handle, true) {
                joint.data.set_motor_position(
                    HINGE_AXIS,
                    target,
                    self.config.motor_stiffness,
                    self.config.motor_damping,
                );
            }
        }
        Ok(())
    }

    /// First live instance built from this exact model.
    pub fn find_robot_index(&self, model: &Arc<Robot>) -> Option<RobotIndex> {
        self.robots
            .iter()
            .find(|(_, r)| Arc::ptr_eq(&r.model, model))
            .map(|(index, _)| index)
    }

    /// Model a live robot was built from.
    pub fn robot_model(&self, robot: RobotIndex) -> Result<&Arc<Robot>> {
        Ok(&self.robot(robot)?.model)
    }

    /// Model a live prop was built from.
    pub fn prop_model(&self, prop: PropIndex) -> Result<&Arc<Prop>> {
        Ok(&self.prop(prop)?.model)
    }

    /// Number of links of a live robot.
    pub fn link_count(&self, robot: RobotIndex) -> Result<usize> {
        Ok(self.robot(robot)?.link_bodies.len())
    }

    /// Handles of all live robots.
    pub fn robot_indices(&self) -> impl Iterator<Item = RobotIndex> + '_ {
        self.robots.keys()
    }

    /// Handles of all live props.
    pub fn prop_indices(&self) -> impl Iterator<Item = PropIndex> + '_ {
        self.props.keys()
    }

    /// Number of live robots.
    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    /// Number of live props.
    pub fn prop_count(&self) -> usize {
        self.props.len()
    }

    /// Number of live robots and props.
    pub fn instance_count(&self) -> usize {
        self.robots.len() + self.props.len()
    }

    /// Capture the complete physics state.
    pub fn save_state(&self) -> Snapshot {
        Snapshot {
            engine_id: self.id,
            state: self.state.clone(),
            robots: self.robots.keys().collect(),
            props: self.props.keys().collect(),
        }
    }

    /// Roll the world back to a snapshot.
    ///
    /// Only allowed on the engine that took the snapshot, while its live
    /// instances are exactly those present when the snapshot was taken.
    pub fn restore_state(&mut self, snapshot: &Snapshot) -> Result<()> {
        if snapshot.engine_id != self.id {
            return Err(PhysicsError::StaleSnapshot);
        }
        let robots_match = self.robots.keys().eq(snapshot.robots.iter().copied());
        let props_match = self.props.keys().eq(snapshot.props.iter().copied());
        if !(robots_match && props_match) {
            return Err(PhysicsError::StaleSnapshot);
        }
        self.state = snapshot.state.clone();
        debug!(
            robots = snapshot.robot_count(),
            props = snapshot.prop_count(),
            "restored snapshot"
        );
        Ok(())
    }
}

fn is_finite(pose: Isometry3<f32>) -> bool {
    pose.translation.vector.iter().all(|c| c.is_finite())
        && pose.rotation.coords.iter().all(|c| c.is_finite())
}
