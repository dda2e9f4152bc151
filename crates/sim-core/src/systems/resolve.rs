//! Resolve Phase
//!
//! Single-threaded pass that folds every agent's buffer into one
//! [`TickCommit`]. Buffers are merged in ascending agent id order, which is
//! what makes contention (two harvesters on one node, two attackers on one
//! victim) reproducible.
//!
//! Per agent, in order: hunger, energy, age, health, then death. Death is
//! decided exactly once, from final health and age, and credited to the last
//! damaging entry recorded against the agent. Starvation only bites an agent
//! that survived this tick's combat.

use std::collections::{BTreeMap, BTreeSet};

use rand::Rng;
use serde_json::json;
use sim_events::{
    AgentId, Event, EventBuilder, EventType, PopulationSnapshot, ResourceNodeId, ResourceTypeId,
};
use tracing::{debug, warn};

use crate::components::{
    pair_key, Agent, Gender, LifeStatus, Personality, Position, Vitals, VITAL_MAX,
};
use crate::config::SimConfig;
use crate::mutation::Mutation;
use crate::store::{AgentPatch, NodePatch, PatchOp, RelationshipDelta, TickCommit};
use crate::systems::decide::{agent_rng, AgentOutcome};
use crate::systems::snapshot::WorldView;

/// Mixed into the engine seed for newborn rolls.
const BIRTH_STREAM: u64 = 0xB1_27_4D;

/// Why an agent died.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeathCause {
    Combat { killer: AgentId },
    Starvation,
    OldAge,
    /// Health was already gone with nothing recorded against it
    Unknown,
}

impl DeathCause {
    pub fn reason(&self) -> &'static str {
        match self {
            DeathCause::Combat { .. } => "combat",
            DeathCause::Starvation => "starvation",
            DeathCause::OldAge => "old_age",
            DeathCause::Unknown => "unknown",
        }
    }

    pub fn killer(&self) -> Option<AgentId> {
        match self {
            DeathCause::Combat { killer } => Some(*killer),
            _ => None,
        }
    }
}

/// The commit for one tick plus what happened in it.
#[derive(Debug)]
pub struct Resolution {
    pub commit: TickCommit,
    pub deaths: Vec<(AgentId, DeathCause)>,
    pub births: Vec<AgentId>,
}

#[derive(Debug, Clone, Copy)]
enum DamageSource {
    Attack(AgentId),
    Starvation,
}

/// Buffered effects gathered for one agent.
#[derive(Debug, Default)]
struct Pending {
    hunger: f64,
    energy: f64,
    moved_to: Option<Position>,
    rested: bool,
    damage: Vec<(DamageSource, f64)>,
    inventory: BTreeMap<ResourceTypeId, i64>,
    collected: u64,
    damage_dealt: f64,
}

/// State of an agent after this tick.
#[derive(Debug)]
struct Settled {
    position: Position,
    vitals: Vitals,
    health: f64,
    death: Option<DeathCause>,
    kills: u32,
    reproduced: bool,
}

pub fn resolve(view: &WorldView, outcomes: Vec<AgentOutcome>, config: &SimConfig) -> Resolution {
    let tick = view.tick();
    let mut commit = TickCommit::new(view.world_id(), tick);

    let mut pending: BTreeMap<AgentId, Pending> = view.agents().iter().map(|a| (a.id, Pending::default())).collect();
    let mut remaining: BTreeMap<ResourceNodeId, u32> = view.nodes().iter().map(|n| (n.id, n.quantity)).collect();
    let mut harvested: BTreeSet<ResourceNodeId> = BTreeSet::new();
    let mut grants: Vec<(AgentId, ResourceNodeId, u32)> = Vec::new();
    let mut births: Vec<(AgentId, AgentId)> = Vec::new();
    let mut relationships: Vec<RelationshipDelta> = Vec::new();
    let mut events: Vec<Event> = Vec::new();

    let mut sorted = outcomes;
    sorted.sort_by_key(|o| o.agent);

    for outcome in sorted {
        let (mutations, agent_events) = outcome.buffer.into_parts();
        events.extend(agent_events);

        for mutation in mutations {
            match mutation {
                Mutation::Damage {
                    target,
                    attacker,
                    amount,
                } => {
                    let Some(victim) = pending.get_mut(&target) else {
                        warn!(%target, %attacker, "Damage against an agent not in the snapshot");
                        continue;
                    };
                    victim.damage.push((DamageSource::Attack(attacker), amount));
                    if let Some(a) = pending.get_mut(&attacker) {
                        a.damage_dealt += amount;
                    }
                }
                Mutation::Energy { agent, delta } => {
                    if let Some(p) = pending_for(&mut pending, agent) {
                        p.energy += delta;
                    }
                }
                Mutation::Hunger { agent, delta } => {
                    if let Some(p) = pending_for(&mut pending, agent) {
                        p.hunger += delta;
                    }
                }
                Mutation::Move { agent, to } => {
                    if let Some(p) = pending_for(&mut pending, agent) {
                        p.moved_to = Some(to);
                    }
                }
                Mutation::Rest { agent } => {
                    if let Some(p) = pending_for(&mut pending, agent) {
                        p.rested = true;
                    }
                }
                Mutation::Inventory {
                    agent,
                    resource,
                    delta,
                } => {
                    if let Some(p) = pending_for(&mut pending, agent) {
                        *p.inventory.entry(resource).or_insert(0) += delta;
                    }
                }
                Mutation::Harvest {
                    agent,
                    node,
                    resource,
                    amount,
                } => {
                    let Some(left) = remaining.get_mut(&node) else {
                        warn!(%agent, %node, "Harvest from a node not in the snapshot");
                        grants.push((agent, node, 0));
                        continue;
                    };
                    let granted = amount.min(*left);
                    *left -= granted;
                    harvested.insert(node);
                    grants.push((agent, node, granted));
                    if let Some(p) = pending_for(&mut pending, agent) {
                        *p.inventory.entry(resource).or_insert(0) += i64::from(granted);
                        p.collected += u64::from(granted);
                    }
                }
                Mutation::Relationship { a, b, delta } => {
                    if a != b && pending.contains_key(&a) && pending.contains_key(&b) {
                        relationships.push(RelationshipDelta { a, b, delta });
                    }
                }
                Mutation::Birth { parent_a, parent_b } => births.push((parent_a, parent_b)),
            }
        }
    }

    let vitals = &config.vitals;
    let mut settled: BTreeMap<AgentId, Settled> = BTreeMap::new();
    for agent in view.agents() {
        let Some(p) = pending.get_mut(&agent.id) else { continue };

        let hunger = (agent.vitals.hunger + p.hunger).clamp(0.0, VITAL_MAX);
        let hunger = (hunger + vitals.hunger_increase_rate).clamp(0.0, VITAL_MAX);

        let mut energy = agent.vitals.energy + p.energy;
        if p.rested {
            energy += vitals.rest_energy_regen_rate;
        } else if p.moved_to.is_none() {
            energy += vitals.energy_regen_rate;
        }
        let energy = energy.clamp(0.0, VITAL_MAX);
        let age = agent.vitals.age + 1;

        let mut health = agent.health - p.damage.iter().map(|(_, amount)| amount).sum::<f64>();
        // A blow that was already lethal keeps the kill
        if hunger >= VITAL_MAX && health > 0.0 {
            health -= vitals.starvation_damage;
            p.damage.push((DamageSource::Starvation, vitals.starvation_damage));
        }

        let old_age = view
            .lifespan_ticks(agent, vitals.ticks_per_year)
            .map_or(false, |lifespan| age >= lifespan);
        let death = if health <= 0.0 {
            Some(match p.damage.last() {
                Some((DamageSource::Attack(killer), _)) => DeathCause::Combat { killer: *killer },
                Some((DamageSource::Starvation, _)) => DeathCause::Starvation,
                None if old_age => DeathCause::OldAge,
                None => DeathCause::Unknown,
            })
        } else if old_age {
            Some(DeathCause::OldAge)
        } else {
            None
        };

        settled.insert(
            agent.id,
            Settled {
                position: p.moved_to.unwrap_or(agent.position),
                vitals: Vitals { hunger, energy, age },
                health: if death.is_some() { 0.0 } else { health },
                death,
                kills: 0,
                reproduced: false,
            },
        );
    }

    let mut deaths = Vec::new();
    for (id, state) in &settled {
        if let Some(cause) = state.death {
            deaths.push((*id, cause));
        }
    }
    for (_, cause) in &deaths {
        if let Some(killer) = cause.killer() {
            // Attackers are always snapshot agents, so they settle too
            if let Some(k) = settled.get_mut(&killer) {
                k.kills += 1;
            }
        }
    }

    // Births
    let mut next_id = view.next_agent_id();
    let mut accepted: BTreeMap<(AgentId, AgentId), (AgentId, String)> = BTreeMap::new();
    let mut seen_pairs = BTreeSet::new();
    let repro = &config.reproduction;
    for (a, b) in births {
        if a == b || !seen_pairs.insert(pair_key(a, b)) {
            continue;
        }
        let eligible = |id: AgentId| settled.get(&id).map_or(false, |s| s.death.is_none() && !s.reproduced);
        if !eligible(a) || !eligible(b) {
            continue;
        }
        let Some(parent) = view.agent(a) else { continue };
        let Some(species) = view.species(parent.species_id) else {
            warn!(parent = %a, species = %parent.species_id, "Birth for unknown species dropped");
            continue;
        };

        let child_id = next_id;
        next_id = sim_events::AgentId(next_id.get() + 1);
        let position = settled.get(&a).map_or(parent.position, |s| s.position);
        let child = newborn(child_id, parent, b, species.name.as_str(), species.base_health, position, config, tick);
        accepted.insert((a, b), (child_id, child.name.clone()));
        commit.new_agents.push(child);

        for id in [a, b] {
            if let Some(s) = settled.get_mut(&id) {
                s.reproduced = true;
                s.vitals.hunger = (s.vitals.hunger + repro.hunger_cost).clamp(0.0, VITAL_MAX);
                s.vitals.energy = (s.vitals.energy - repro.energy_cost).clamp(0.0, VITAL_MAX);
            }
        }
    }

    // Decision events, annotated with what resolve granted
    let mut grant_queue = grants;
    let mut kept = Vec::with_capacity(events.len());
    for mut event in events {
        match event.event_type {
            EventType::CharacterBirth => {
                let key = event.actor_id.zip(event.target_id);
                match key.and_then(|k| accepted.remove(&k)) {
                    Some((child_id, name)) => {
                        event.payload["child_id"] = json!(child_id);
                        event.payload["child_name"] = json!(name);
                    }
                    None => continue,
                }
            }
            EventType::CharacterGather => {
                let node = event.payload.get("node_id").and_then(|v| v.as_u64()).map(ResourceNodeId);
                let found = grant_queue
                    .iter()
                    .position(|(agent, n, _)| Some(*agent) == event.actor_id && Some(*n) == node);
                let granted = found.map_or(0, |i| grant_queue.remove(i).2);
                event.payload["granted"] = json!(granted);
            }
            _ => {}
        }
        kept.push(event);
    }

    // Deaths
    for (id, cause) in &deaths {
        let (Some(agent), Some(state)) = (view.agent(*id), settled.get(id)) else { continue };
        let mut builder = EventBuilder::new(EventType::CharacterDeath)
            .actor(agent.actor_ref())
            .location(state.position.x, state.position.y)
            .payload(json!({
                "reason": cause.reason(),
                "killer_id": cause.killer(),
                "age": state.vitals.age,
            }));
        if let Some(killer) = cause.killer().and_then(|k| view.agent(k)) {
            builder = builder.target(killer.actor_ref());
        }
        kept.push(builder.build(view.world_id(), view.timestamp()));
    }

    // Global event countdown
    commit.global_event = match view.world().global_event.clone() {
        Some(mut global) if global.remaining_ticks > 1 => {
            global.remaining_ticks -= 1;
            Some(global)
        }
        Some(global) => {
            kept.push(
                EventBuilder::new(EventType::GlobalEventEnded)
                    .payload(json!({ "name": global.name }))
                    .build(view.world_id(), view.timestamp()),
            );
            None
        }
        None => None,
    };

    // Patches
    let mut population = PopulationSnapshot::default();
    for agent in view.agents() {
        let (Some(state), Some(p)) = (settled.get(&agent.id), pending.get(&agent.id)) else {
            continue;
        };
        let mut ops = Vec::new();
        if state.position != agent.position {
            ops.push(PatchOp::SetPosition(state.position));
        }
        if state.health != agent.health {
            ops.push(PatchOp::SetHealth(state.health));
        }
        ops.push(PatchOp::SetVitals(state.vitals));
        for (resource, delta) in &p.inventory {
            let held = i64::from(agent.quantity_of(*resource));
            let delta = if held + delta < 0 {
                warn!(agent = %agent.id, %resource, "Inventory underflow clamped");
                -held
            } else {
                *delta
            };
            if delta != 0 {
                ops.push(PatchOp::IncrementInventory {
                    resource: *resource,
                    delta,
                });
            }
        }
        if p.collected > 0 {
            ops.push(PatchOp::IncrementResourcesCollected(p.collected));
        }
        if p.damage_dealt > 0.0 {
            ops.push(PatchOp::IncrementDamageDealt(p.damage_dealt));
        }
        if state.kills > 0 {
            ops.push(PatchOp::IncrementKills(state.kills));
        }
        if state.reproduced {
            ops.push(PatchOp::SetLastReproductionTick(tick));
            ops.push(PatchOp::IncrementChildren(1));
        }
        if state.death.is_some() {
            ops.push(PatchOp::SetStatus(LifeStatus::Dead));
            ops.push(PatchOp::IncrementDeaths(1));
        } else {
            population.total_alive += 1;
            *population.by_species.entry(agent.species_id).or_insert(0) += 1;
        }
        commit.agent_patches.push(AgentPatch { id: agent.id, ops });
    }
    for child in &commit.new_agents {
        population.total_alive += 1;
        *population.by_species.entry(child.species_id).or_insert(0) += 1;
    }

    for node in harvested {
        if let Some(left) = remaining.get(&node) {
            commit.node_patches.push(NodePatch {
                id: node,
                quantity: *left,
                is_depleted: *left == 0,
            });
        }
    }

    let births: Vec<AgentId> = commit.new_agents.iter().map(|a| a.id).collect();
    commit.relationship_deltas = relationships;
    commit.events = kept;
    commit.population = population;

    debug!(
        tick,
        deaths = deaths.len(),
        births = births.len(),
        nodes = commit.node_patches.len(),
        "Resolved tick"
    );
    Resolution {
        commit,
        deaths,
        births,
    }
}

fn pending_for(pending: &mut BTreeMap<AgentId, Pending>, agent: AgentId) -> Option<&mut Pending> {
    let found = pending.get_mut(&agent);
    if found.is_none() {
        warn!(%agent, "Mutation for an agent not in the snapshot");
    }
    found
}

#[allow(clippy::too_many_arguments)]
fn newborn(
    id: AgentId,
    parent: &Agent,
    other_parent: AgentId,
    species_name: &str,
    base_health: f64,
    position: Position,
    config: &SimConfig,
    tick: u64,
) -> Agent {
    let mut rng = agent_rng(config.engine.seed ^ BIRTH_STREAM, tick, id);
    let mut trait_roll = || rng.gen_range(25.0..=75.0);
    let personality = Personality {
        bravery: trait_roll(),
        caution: trait_roll(),
        sociability: trait_roll(),
        greed: trait_roll(),
        intelligence: trait_roll(),
    };
    let gender = if rng.gen_bool(0.5) {
        Gender::Male
    } else {
        Gender::Female
    };

    let mut child = Agent::new(
        id,
        parent.world_id,
        format!("{} Newborn", species_name),
        parent.species_id,
        position,
        base_health,
    )
    .with_gender(gender)
    .with_personality(personality);
    child.clan_id = parent.clan_id;
    child.parents = vec![parent.id, other_parent];
    child
}
