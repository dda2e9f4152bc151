//! Social Actions

use serde_json::json;
use sim_events::EventType;

use super::step_to;
use crate::behavior::{NodeStatus, TickContext};
use crate::error::DecisionError;
use crate::mutation::Mutation;

/// Joins the partner and requests a child.
///
/// The child itself, and the cost to both parents, are materialized in the
/// resolve phase so that a pair choosing each other only has one child.
pub fn reproduce(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let Some(partner) = ctx.blackboard.partner.and_then(|id| ctx.other(id)) else {
        return Ok(NodeStatus::Failure);
    };
    if !partner.is_alive() {
        return Ok(NodeStatus::Failure);
    }

    let grouping = ctx.config.movement.grouping_distance;
    if ctx.agent.position.distance_to(&partner.position) > grouping {
        step_to(ctx, partner.position, grouping * 0.8);
        return Ok(NodeStatus::Running);
    }

    let me = ctx.agent.id;
    ctx.push(Mutation::Birth {
        parent_a: me,
        parent_b: partner.id,
    });
    let builder = ctx.event(EventType::CharacterBirth).target(partner.actor_ref()).payload(json!({
        "parent_a": me,
        "parent_b": partner.id,
    }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}
