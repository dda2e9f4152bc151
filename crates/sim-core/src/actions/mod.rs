//! Action Library
//!
//! Leaf behaviors of the tree. An action reads the snapshot and the targets its
//! conditions left on the blackboard, then writes deferred mutations and events
//! to the agent's buffer. None of them touch world state directly.

pub mod conflict;
pub mod movement;
pub mod resource;
pub mod social;

use crate::behavior::TickContext;
use crate::components::Position;
use crate::mutation::Mutation;
use crate::systems::spatial;

/// Moves the agent to `next` (clamped to the map) and charges `energy_cost`.
/// Returns the new position, or `None` when the agent would not move.
pub(crate) fn relocate(ctx: &mut TickContext<'_>, next: Position, energy_cost: f64) -> Option<Position> {
    let world = ctx.view.world();
    let next = spatial::clamp_to_bounds(next, world.map_width, world.map_height);
    if next == ctx.agent.position {
        return None;
    }
    let agent = ctx.agent.id;
    ctx.push(Mutation::Move { agent, to: next });
    if energy_cost != 0.0 {
        ctx.push(Mutation::Energy {
            agent,
            delta: -energy_cost,
        });
    }
    Some(next)
}

/// One movement step toward `target`, stopping `stop_distance` short of it.
pub(crate) fn step_to(ctx: &mut TickContext<'_>, target: Position, stop_distance: f64) -> Option<Position> {
    let movement = &ctx.config.movement;
    let next = spatial::step_toward(ctx.agent.position, target, movement.move_speed, stop_distance);
    let cost = movement.move_energy_cost;
    relocate(ctx, next, cost)
}
