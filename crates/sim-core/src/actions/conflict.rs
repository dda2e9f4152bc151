//! Conflict Actions
//!
//! Melee attacks and territory raids.

use serde_json::json;
use sim_events::EventType;

use super::step_to;
use crate::behavior::{NodeStatus, TickContext};
use crate::error::DecisionError;
use crate::mutation::Mutation;

/// Approaches the blackboard target and strikes it once in range.
///
/// Damage is only buffered here. Whether the target dies, and who gets the
/// kill, is settled in the resolve phase.
pub fn attack(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let Some(target) = ctx.blackboard.target_agent.and_then(|id| ctx.other(id)) else {
        return Ok(NodeStatus::Failure);
    };
    if !target.is_alive() || target.id == ctx.agent.id {
        return Ok(NodeStatus::Failure);
    }

    let range = ctx.config.movement.attack_range;
    if ctx.agent.position.distance_to(&target.position) > range {
        step_to(ctx, target.position, range * 0.8);
        return Ok(NodeStatus::Running);
    }

    let me = ctx.agent.id;
    let damage = ctx.species.base_strength;
    let before = target.health;
    let after = before - damage;

    ctx.push(Mutation::Damage {
        target: target.id,
        attacker: me,
        amount: damage,
    });
    ctx.push(Mutation::Energy {
        agent: me,
        delta: -ctx.config.vitals.attack_energy_cost,
    });
    ctx.push(Mutation::Relationship {
        a: me,
        b: target.id,
        delta: ctx.config.relationships.attack_delta,
    });
    if let Some(ally) = ctx.blackboard.protected_ally {
        ctx.push(Mutation::Relationship {
            a: me,
            b: ally,
            delta: ctx.config.relationships.help_delta,
        });
    }

    let builder = ctx.event(EventType::CombatAction).target(target.actor_ref()).payload(json!({
        "damage": damage,
        "target_health_before": before,
        "target_health_after": after,
        "lethal": after <= 0.0,
    }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}

/// Marches on the raid target. Succeeds on the step that crosses its border.
pub fn invade(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let Some(territory) = ctx.blackboard.target_territory.and_then(|id| ctx.view.territory(id)) else {
        return Ok(NodeStatus::Failure);
    };
    if territory.contains(&ctx.agent.position) {
        return Ok(NodeStatus::Success);
    }

    let from = ctx.agent.position;
    let Some(to) = step_to(ctx, territory.center(), 0.0) else {
        return Ok(NodeStatus::Failure);
    };

    if territory.contains(&to) {
        let builder = ctx.event(EventType::TerritoryInvasion).payload(json!({
            "territory_id": territory.id,
            "territory_name": territory.name,
            "owner_clan_id": territory.owner,
        }));
        ctx.emit(builder);
        Ok(NodeStatus::Success)
    } else {
        let builder = ctx.event(EventType::CharacterMove).payload(json!({
            "reason": "invade",
            "territory_id": territory.id,
            "from": { "x": from.x, "y": from.y },
            "to": { "x": to.x, "y": to.y },
        }));
        ctx.emit(builder);
        Ok(NodeStatus::Running)
    }
}
