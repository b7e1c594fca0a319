#![warn(missing_docs)]

//! Body descriptions for the rdsim robot design sandbox.
//!
//! A [`Robot`] is a tree of capsule [`Link`]s encoded by parent indices; a
//! [`Prop`] is a single box. Both are validated once, when constructed, and
//! are immutable afterwards, so they can be shared (typically behind an
//! `Arc`) by any number of live simulation instances.
//!
//! # Example
//!
//! ```
//! use nalgebra::Vector3;
//! use rdsim_model::{Link, Prop, Robot};
//!
//! let mut links = vec![Link::root(0.5)];
//! for i in 1..5 {
//!     links.push(Link::hinge(i - 1, Vector3::z(), 0.5));
//! }
//! let robot = Robot::new(10.0, 0.05, 0.9, links).unwrap();
//! assert_eq!(robot.dof_count(), 4);
//!
//! let floor = Prop::new(0.0, 0.9, Vector3::new(10.0, 1.0, 10.0)).unwrap();
//! assert!(floor.is_static());
//! ```

mod error;
mod link;
mod prop;
mod robot;
mod shape;

pub use error::{ModelError, Result};
pub use link::{JointType, Link};
pub use prop::{Prop, PropDesc};
pub use robot::{ModelLimits, Robot, RobotDesc, DEFAULT_MAX_LINKS};
pub use shape::Shape;
