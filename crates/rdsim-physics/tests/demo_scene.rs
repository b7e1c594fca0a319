//! Scenario tests on the snake-and-floor demo scene.

use std::sync::Arc;

use approx::assert_abs_diff_eq;
use nalgebra::{UnitQuaternion, Vector3};
use rdsim_model::{Link, Prop, Robot};
use rdsim_physics::{EngineConfig, SimulationEngine};

const LINK_RADIUS: f32 = 0.05;
const FLOOR_TOP_Y: f32 = 0.0;
/// Penetration tolerated while contacts resolve, including the first
/// impact step at this time step.
const PENETRATION_SLOP: f32 = 0.03;

fn snake() -> Arc<Robot> {
    let mut links = vec![Link::root(0.5)];
    for i in 1..5 {
        links.push(Link::hinge(i - 1, Vector3::z(), 0.5));
    }
    Arc::new(Robot::new(10.0, LINK_RADIUS, 0.9, links).unwrap())
}

fn floor() -> Arc<Prop> {
    Arc::new(Prop::new(0.0, 0.9, Vector3::new(10.0, 1.0, 10.0)).unwrap())
}

#[test]
fn snake_comes_to_rest_on_floor() {
    let mut engine = SimulationEngine::new(EngineConfig::default()).unwrap();
    let floor_idx = engine
        .add_prop(&floor(), Vector3::new(0.0, -1.0, 0.0), UnitQuaternion::identity())
        .unwrap();
    let robot_idx = engine
        .add_robot(&snake(), Vector3::new(0.0, 1.0, 0.0), UnitQuaternion::identity())
        .unwrap();

    let rest_y = FLOOR_TOP_Y + LINK_RADIUS;
    for _ in 0..720 {
        engine.step(engine.time_step()).unwrap();
        let y = engine.get_link_transform(robot_idx, 0).unwrap().translation.y;
        assert!(y >= rest_y - PENETRATION_SLOP, "root sank to {y}");
    }

    let root = engine.get_link_transform(robot_idx, 0).unwrap();
    assert_abs_diff_eq!(root.translation.y, rest_y, epsilon = 0.01);
    for link in 1..5 {
        let pose = engine.get_link_transform(robot_idx, link).unwrap();
        assert_abs_diff_eq!(pose.translation.y, rest_y, epsilon = 0.01);
    }

    engine.remove_robot(robot_idx).unwrap();
    engine.remove_prop(floor_idx).unwrap();
    assert_eq!(engine.instance_count(), 0);
}

#[test]
fn aabb_offset_places_robot_on_floor() {
    let model = snake();

    let mut probe = SimulationEngine::default();
    let idx = probe
        .add_robot(&model, Vector3::zeros(), UnitQuaternion::identity())
        .unwrap();
    let y_offset = -probe.robot_world_aabb(idx).unwrap().mins.y;
    assert_abs_diff_eq!(y_offset, LINK_RADIUS, epsilon = 1e-4);

    let mut engine = SimulationEngine::default();
    engine
        .add_prop(&floor(), Vector3::new(0.0, -1.0, 0.0), UnitQuaternion::identity())
        .unwrap();
    let robot = engine
        .add_robot(&model, Vector3::new(0.0, y_offset, 0.0), UnitQuaternion::identity())
        .unwrap();
    for _ in 0..120 {
        engine.step_default().unwrap();
    }
    let y = engine.get_link_transform(robot, 0).unwrap().translation.y;
    assert_abs_diff_eq!(y, y_offset, epsilon = 0.01);
}

#[test]
fn restored_snapshot_replays_identically() {
    let mut engine = SimulationEngine::default();
    engine
        .add_prop(&floor(), Vector3::new(0.0, -1.0, 0.0), UnitQuaternion::identity())
        .unwrap();
    let robot = engine
        .add_robot(&snake(), Vector3::new(0.0, 0.3, 0.0), UnitQuaternion::identity())
        .unwrap();
    let dofs = engine.robot_dof_count(robot).unwrap();
    engine
        .set_joint_target_positions(robot, &vec![0.3; dofs])
        .unwrap();

    let snapshot = engine.save_state();
    let trajectory = |engine: &mut SimulationEngine| {
        (0..100)
            .map(|_| {
                engine.step_default().unwrap();
                engine.get_link_transform(robot, 4).unwrap()
            })
            .collect::<Vec<_>>()
    };

    let first = trajectory(&mut engine);
    engine.restore_state(&snapshot).unwrap();
    let second = trajectory(&mut engine);
    assert_eq!(first, second);
}

#[test]
fn many_instances_share_one_model() {
    let model = snake();
    let mut engine = SimulationEngine::default();
    let handles: Vec<_> = (0..4)
        .map(|i| {
            engine
                .add_robot(
                    &model,
                    Vector3::new(0.0, 1.0, 2.0 * i as f32),
                    UnitQuaternion::identity(),
                )
                .unwrap()
        })
        .collect();
    assert_eq!(engine.robot_count(), 4);
    assert_eq!(Arc::strong_count(&model), 5);

    for handle in handles {
        engine.remove_robot(handle).unwrap();
    }
    assert_eq!(engine.robot_count(), 0);
    assert_eq!(Arc::strong_count(&model), 1);
}
