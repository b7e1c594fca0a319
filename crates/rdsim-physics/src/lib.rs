#![warn(missing_docs)]

//! Physics simulation for rdsim robots and props using Rapier3d.
//!
//! This crate turns validated [`rdsim_model::Robot`] and
//! [`rdsim_model::Prop`] descriptions into live rigid bodies, joints and
//! colliders, and advances them deterministically.
//!
//! # Features
//!
//! - Capsule links with hinge, fixed and free joints
//! - Static and dynamic box props
//! - Generational instance handles that never alias removed instances
//! - Hinge position targets, world AABB queries and state snapshots
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use nalgebra::{UnitQuaternion, Vector3};
//! use rdsim_physics::SimulationEngine;
//!
//! let mut engine = SimulationEngine::default();
//! let level = UnitQuaternion::identity();
//! let floor = engine.add_prop(&floor_model, Vector3::new(0.0, -1.0, 0.0), level)?;
//! let robot = engine.add_robot(&robot_model, Vector3::new(0.0, 1.0, 0.0), level)?;
//!
//! for _ in 0..240 {
//!     engine.step(1.0 / 240.0)?;
//! }
//! let root = engine.get_link_transform(robot, 0)?;
//! ```

mod colliders;
mod config;
mod engine;
mod error;
mod joints;
mod snapshot;

pub use config::{EngineConfig, DEFAULT_TIME_STEP};
pub use engine::{PropIndex, RobotIndex, SimulationEngine};
pub use error::{PhysicsError, Result};
pub use parry3d::bounding_volume::Aabb;
pub use snapshot::Snapshot;
