//! The demo scene: a snake lying on a floor slab.

use std::sync::Arc;

use anyhow::Result;
use nalgebra::{UnitQuaternion, Vector3};
use rdsim_model::{Link, Prop, Robot};
use rdsim_physics::{PropIndex, RobotIndex, SimulationEngine};

const SNAKE_LINKS: usize = 5;
const SNAKE_LINK_LENGTH: f32 = 0.5;
const SNAKE_LINK_RADIUS: f32 = 0.05;
const SNAKE_DENSITY: f32 = 10.0;
const FRICTION: f32 = 0.9;
const ROOT_HEIGHT: f32 = 1.0;

/// Shared models for the demo scene.
pub struct DemoScene {
    pub robot: Arc<Robot>,
    pub floor: Arc<Prop>,
}

/// Live handles returned by [`DemoScene::populate`].
#[derive(Debug, Clone, Copy)]
pub struct DemoHandles {
    pub robot: RobotIndex,
    pub floor: PropIndex,
}

impl DemoScene {
    /// Build the snake and floor models.
    pub fn new() -> Result<Self> {
        let mut links = vec![Link::root(SNAKE_LINK_LENGTH)];
        for parent in 0..SNAKE_LINKS - 1 {
            links.push(Link::hinge(parent, Vector3::z(), SNAKE_LINK_LENGTH));
        }
        let robot = Robot::new(SNAKE_DENSITY, SNAKE_LINK_RADIUS, FRICTION, links)?;
        // Static slab whose top face is the plane y = 0.
        let floor = Prop::new(0.0, FRICTION, Vector3::new(10.0, 1.0, 10.0))?;
        Ok(Self {
            robot: Arc::new(robot),
            floor: Arc::new(floor),
        })
    }

    /// Add the floor and then the snake to `engine`.
    pub fn populate(&self, engine: &mut SimulationEngine) -> Result<DemoHandles> {
        let floor = engine.add_prop(
            &self.floor,
            Vector3::new(0.0, -1.0, 0.0),
            UnitQuaternion::identity(),
        )?;
        let robot = engine.add_robot(
            &self.robot,
            Vector3::new(0.0, ROOT_HEIGHT, 0.0),
            UnitQuaternion::identity(),
        )?;
        Ok(DemoHandles { robot, floor })
    }
}
