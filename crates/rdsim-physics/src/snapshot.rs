//! Saved physics state.

use crate::engine::{PhysicsState, PropIndex, RobotIndex};

/// Complete copy of an engine's physics world.
///
/// Produced by [`crate::SimulationEngine::save_state`]; records
/// which engine took it and which instances were live, so a restore can
/// never bring back a removed handle or graft another engine's world.
#[derive(Clone)]
pub struct Snapshot {
    pub(crate) engine_id: u64,
    pub(crate) state: PhysicsState,
    pub(crate) robots: Vec<RobotIndex>,
    pub(crate) props: Vec<PropIndex>,
}

impl Snapshot {
    /// Number of robots live when the snapshot was taken.
    pub fn robot_count(&self) -> usize {
        self.robots.len()
    }

    /// Number of props live when the snapshot was taken.
    pub fn prop_count(&self) -> usize {
        self.props.len()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Snapshot")
            .field("engine_id", &self.engine_id)
            .field("robots", &self.robots)
            .field("props", &self.props)
            .field("bodies", &self.state.bodies.len())
            .finish()
    }
}
