//! Movement Actions
//!
//! Flee, rest, grouping and wandering.

use serde_json::json;
use sim_events::EventType;

use super::{relocate, step_to};
use crate::behavior::{NodeStatus, TickContext};
use crate::error::DecisionError;
use crate::mutation::Mutation;
use crate::systems::spatial;

/// Runs one step directly away from the current threat.
pub fn flee(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let threat_id = ctx
        .blackboard
        .target_agent
        .or(ctx.blackboard.nearest_enemy.map(|(id, _)| id));
    let Some(threat) = threat_id.and_then(|id| ctx.other(id)) else {
        return Ok(NodeStatus::Failure);
    };

    let from = ctx.agent.position;
    let speed = ctx.config.movement.move_speed;
    let next = spatial::step_away(from, threat.position, speed, &mut *ctx.rng);
    let cost = ctx.config.movement.move_energy_cost;
    let Some(to) = relocate(ctx, next, cost) else {
        // Cornered against the map edge
        return Ok(NodeStatus::Failure);
    };

    let builder = ctx.event(EventType::CharacterFlee).target(threat.actor_ref()).payload(json!({
        "from": { "x": from.x, "y": from.y },
        "to": { "x": to.x, "y": to.y },
    }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}

pub fn rest(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let agent = ctx.agent.id;
    ctx.push(Mutation::Rest { agent });
    let builder = ctx
        .event(EventType::CharacterActionRest)
        .payload(json!({ "energy": ctx.agent.vitals.energy }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}

/// Heads for the clan objective, or the ally centroid when the clan has none.
/// Bonds with the nearest ally once the group is within reach.
pub fn group_or_follow_objective(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let objective = ctx.agent.clan_id.and_then(|c| ctx.view.objective_position(c));
    let (target, reason) = match (objective, ctx.blackboard.ally_centroid) {
        (Some(p), _) => (p, "objective"),
        (None, Some(p)) => (p, "group"),
        (None, None) => return Ok(NodeStatus::Failure),
    };

    let grouping = ctx.config.movement.grouping_distance;
    if let Some((ally, distance)) = ctx.blackboard.nearest_ally {
        if distance <= grouping {
            let delta = ctx.config.relationships.group_delta;
            let agent = ctx.agent.id;
            ctx.push(Mutation::Relationship { a: agent, b: ally, delta });
        }
    }

    let from = ctx.agent.position;
    match step_to(ctx, target, grouping / 2.0) {
        Some(to) => {
            let builder = ctx.event(EventType::CharacterMove).payload(json!({
                "reason": reason,
                "from": { "x": from.x, "y": from.y },
                "to": { "x": to.x, "y": to.y },
            }));
            ctx.emit(builder);
            Ok(NodeStatus::Running)
        }
        None => Ok(NodeStatus::Success),
    }
}

/// A small random step. Always succeeds so it can serve as the default.
pub fn wander(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let speed = ctx.config.movement.move_speed;
    let next = spatial::wander_step(ctx.agent.position, speed, &mut *ctx.rng);
    let cost = ctx.config.movement.wander_energy_cost;
    relocate(ctx, next, cost);
    Ok(NodeStatus::Success)
}
