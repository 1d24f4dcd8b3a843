use beep_core::{NodeId, NodePool};

use crate::world::WorldState;

/// Effector inputs strictly inside this band leave the agent where it is
pub const MOVE_THRESHOLD: f32 = 0.5;

/// Ids of the nodes registered by [`standard_pool`]
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StandardNodes {
    pub x_position: NodeId,
    pub internal: Vec<NodeId>,
    pub move_east: NodeId,
}

/// Normalized x coordinate of the current agent, in [0, 1)
pub fn read_x_position(world: &WorldState) -> f32 {
    match world.current_position() {
        Some(p) => p.x as f32 / world.size() as f32,
        None => 0.0,
    }
}

/// Step one cell east when the summed input is at least the threshold in magnitude
pub fn apply_move_east(world: &mut WorldState, value: f32) {
    if value > -MOVE_THRESHOLD && value < MOVE_THRESHOLD {
        return;
    }
    let agent = world.current();
    if let Some(p) = world.current_position() {
        world.try_move(agent, p.x + 1, p.y);
    }
}

/// Pool shared by every agent: one x-position sensor, `internal` hidden
/// nodes and one move-east effector
pub fn standard_pool(internal: usize) -> (NodePool<WorldState>, StandardNodes) {
    let mut pool = NodePool::new();
    let x_position = pool.add_sensor("x_position", read_x_position);
    let internal = (0..internal)
        .map(|i| pool.add_internal(format!("internal_{i}")))
        .collect();
    let move_east = pool.add_effector("move_east", apply_move_east);
    (
        pool,
        StandardNodes {
            x_position,
            internal,
            move_east,
        },
    )
}
