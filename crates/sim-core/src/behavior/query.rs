//! Target Queries
//!
//! Lookups shared by considerations (to score) and conditions (to commit to a
//! target). All of them read the snapshot only.

use sim_events::ResourceTypeId;

use super::TickContext;
use crate::components::{Agent, Diplomacy, ResourceNode, Territory};
use crate::systems::spatial;

/// Lowest-id food item the agent is carrying.
pub fn inventory_food(ctx: &TickContext<'_>) -> Option<ResourceTypeId> {
    ctx.agent
        .inventory
        .iter()
        .find(|(resource, qty)| **qty > 0 && ctx.view.is_food(**resource))
        .map(|(resource, _)| *resource)
}

/// Nearest undepleted food node within vision.
pub fn visible_food_node<'a>(ctx: &TickContext<'a>) -> Option<&'a ResourceNode> {
    let vision = ctx.config.movement.vision_range;
    let candidates = ctx
        .view
        .nodes()
        .iter()
        .filter(|n| n.is_available() && ctx.view.is_food(n.resource_type_id))
        .filter(|n| ctx.agent.position.distance_to(&n.position) <= vision);
    spatial::nearest(ctx.agent.position, candidates, |n| n.position).map(|(n, _)| n)
}

/// Territories owned by the agent's clan.
pub fn home_territories<'a>(ctx: &TickContext<'a>) -> Vec<&'a Territory> {
    match ctx.agent.clan_id {
        Some(clan) => ctx
            .view
            .territories()
            .iter()
            .filter(|t| t.owner == Some(clan))
            .collect(),
        None => Vec::new(),
    }
}

/// True when no undepleted material node lies inside any home territory.
pub fn home_lacks_material(ctx: &TickContext<'_>) -> bool {
    let homes = home_territories(ctx);
    !ctx.view.nodes().iter().any(|n| {
        n.is_available()
            && ctx.view.is_material(n.resource_type_id)
            && homes.iter().any(|t| t.contains(&n.position))
    })
}

/// Nearest material node anywhere on the map, when home has none.
pub fn strategic_node<'a>(ctx: &TickContext<'a>) -> Option<&'a ResourceNode> {
    if !home_lacks_material(ctx) {
        return None;
    }
    let candidates = ctx
        .view
        .nodes()
        .iter()
        .filter(|n| n.is_available() && ctx.view.is_material(n.resource_type_id));
    spatial::nearest(ctx.agent.position, candidates, |n| n.position).map(|(n, _)| n)
}

/// Nearest territory held by a clan at war with ours that we are not already in.
pub fn raid_target<'a>(ctx: &TickContext<'a>) -> Option<&'a Territory> {
    let clan = ctx.agent.clan_id?;
    let enemies = ctx.view.tables().enemies_of(clan);
    if enemies.is_empty() {
        return None;
    }
    let candidates = ctx.view.territories().iter().filter(|t| {
        t.owner.map_or(false, |owner| enemies.contains(&owner))
            && !t.contains(&ctx.agent.position)
    });
    spatial::nearest(ctx.agent.position, candidates, |t| t.center()).map(|(t, _)| t)
}

/// Nearest visible ally that qualifies as a reproduction partner.
pub fn partner<'a>(ctx: &TickContext<'a>) -> Option<&'a Agent> {
    let cfg = &ctx.config.reproduction;
    let tick = ctx.view.tick();
    let candidates: Vec<&'a Agent> = ctx
        .blackboard
        .allies
        .iter()
        .filter_map(|id| ctx.view.agent(*id))
        .filter(|other| {
            other.is_alive()
                && other.species_id == ctx.agent.species_id
                && other.gender == ctx.agent.gender.opposite()
                && !other.on_reproduction_cooldown(tick, cfg.cooldown_ticks)
                && ctx.resolver.personal_score(ctx.agent, other) >= cfg.min_relationship
        })
        .collect();
    spatial::nearest(ctx.agent.position, candidates, |a| a.position).map(|(a, _)| a)
}

pub fn has_build_materials(ctx: &TickContext<'_>) -> bool {
    let economy = &ctx.config.economy;
    match (ctx.view.wood_id(), ctx.view.stone_id()) {
        (Some(wood), Some(stone)) => {
            ctx.agent.quantity_of(wood) >= economy.house_wood_cost
                && ctx.agent.quantity_of(stone) >= economy.house_stone_cost
        }
        _ => false,
    }
}

/// True inside a territory owned by our clan or an allied clan.
pub fn in_friendly_territory(ctx: &TickContext<'_>) -> bool {
    let Some(clan) = ctx.agent.clan_id else {
        return false;
    };
    match spatial::territory_at(ctx.view.territories(), &ctx.agent.position).and_then(|t| t.owner) {
        Some(owner) if owner == clan => true,
        Some(owner) => ctx.view.tables().diplomacy(clan, owner) == Some(Diplomacy::Alliance),
        None => false,
    }
}
