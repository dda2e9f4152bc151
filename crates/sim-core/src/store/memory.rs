//! In-memory World Store
//!
//! Reference implementation of [`WorldStore`] backed by ordered maps. Commits
//! are validated in full before the first row is touched.

use std::collections::{BTreeMap, BTreeSet};

use sim_events::{
    AgentId, ClanId, Event, MissionId, PopulationSnapshot, ResourceNodeId, ResourceTypeId,
    SpeciesId, TerritoryId, WorldId,
};

use super::{AgentPatch, MissionUpdate, PatchOp, TickCommit, WorldStore};
use crate::components::{
    pair_key, Agent, Clan, Diplomacy, LifeStatus, Mission, RelationshipKind, RelationshipTables,
    ResourceNode, ResourceType, Species, Territory, World,
};
use crate::error::StoreError;

#[derive(Debug, Default)]
pub struct InMemoryStore {
    worlds: BTreeMap<WorldId, World>,
    agents: BTreeMap<AgentId, Agent>,
    species: BTreeMap<SpeciesId, Species>,
    resource_types: BTreeMap<ResourceTypeId, ResourceType>,
    clans: BTreeMap<ClanId, Clan>,
    territories: BTreeMap<TerritoryId, Territory>,
    nodes: BTreeMap<ResourceNodeId, ResourceNode>,
    missions: BTreeMap<MissionId, Mission>,
    species_relations: BTreeMap<(SpeciesId, SpeciesId), RelationshipKind>,
    clan_relations: BTreeMap<(ClanId, ClanId), Diplomacy>,
    personal: BTreeMap<(AgentId, AgentId), f64>,
    populations: BTreeMap<WorldId, PopulationSnapshot>,
    events: Vec<Event>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_world(&mut self, world: World) {
        self.worlds.insert(world.id, world);
    }

    pub fn insert_agent(&mut self, agent: Agent) {
        self.agents.insert(agent.id, agent);
    }

    pub fn insert_species(&mut self, species: Species) {
        self.species.insert(species.id, species);
    }

    pub fn insert_resource_type(&mut self, resource_type: ResourceType) {
        self.resource_types.insert(resource_type.id, resource_type);
    }

    pub fn insert_clan(&mut self, clan: Clan) {
        self.clans.insert(clan.id, clan);
    }

    pub fn insert_territory(&mut self, territory: Territory) {
        self.territories.insert(territory.id, territory);
    }

    pub fn insert_node(&mut self, node: ResourceNode) {
        self.nodes.insert(node.id, node);
    }

    pub fn insert_mission(&mut self, mission: Mission) {
        self.missions.insert(mission.id, mission);
    }

    pub fn set_species_relation(&mut self, a: SpeciesId, b: SpeciesId, kind: RelationshipKind) {
        self.species_relations.insert(pair_key(a, b), kind);
    }

    pub fn set_diplomacy(&mut self, a: ClanId, b: ClanId, state: Diplomacy) {
        self.clan_relations.insert(pair_key(a, b), state);
    }

    pub fn set_personal_score(&mut self, a: AgentId, b: AgentId, score: f64) {
        self.personal.insert(pair_key(a, b), score);
    }

    pub fn personal_score(&self, a: AgentId, b: AgentId) -> Option<f64> {
        self.personal.get(&pair_key(a, b)).copied()
    }

    pub fn get_world(&self, id: WorldId) -> Option<&World> {
        self.worlds.get(&id)
    }

    pub fn world_mut(&mut self, id: WorldId) -> Option<&mut World> {
        self.worlds.get_mut(&id)
    }

    pub fn get_agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.get(&id)
    }

    pub fn get_species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    pub fn agents_in(&self, world: WorldId) -> impl Iterator<Item = &Agent> {
        self.agents.values().filter(move |a| a.world_id == world)
    }

    pub fn get_node(&self, id: ResourceNodeId) -> Option<&ResourceNode> {
        self.nodes.get(&id)
    }

    pub fn nodes_in(&self, world: WorldId) -> impl Iterator<Item = &ResourceNode> {
        self.nodes.values().filter(move |n| n.world_id == world)
    }

    pub fn get_territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.get(&id)
    }

    pub fn get_mission(&self, id: MissionId) -> Option<&Mission> {
        self.missions.get(&id)
    }

    pub fn missions_in(&self, world: WorldId) -> impl Iterator<Item = &Mission> {
        self.missions.values().filter(move |m| m.world_id == world)
    }

    pub fn clans_in(&self, world: WorldId) -> impl Iterator<Item = &Clan> {
        self.clans.values().filter(move |c| c.world_id == world)
    }

    pub fn population(&self, world: WorldId) -> Option<&PopulationSnapshot> {
        self.populations.get(&world)
    }

    /// Every event appended so far, in commit order.
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    fn validate_commit(&self, commit: &TickCommit) -> Result<(), StoreError> {
        let world = self
            .worlds
            .get(&commit.world_id)
            .ok_or(StoreError::WorldNotFound(commit.world_id))?;
        if world.current_tick != commit.tick {
            return Err(StoreError::CommitRejected(format!(
                "commit for tick {} but {} is at tick {}",
                commit.tick, world.id, world.current_tick
            )));
        }

        let mut new_ids = BTreeSet::new();
        for agent in &commit.new_agents {
            if self.agents.contains_key(&agent.id) || !new_ids.insert(agent.id) {
                return Err(StoreError::CommitRejected(format!(
                    "agent id {} is already taken",
                    agent.id
                )));
            }
            if !self.species.contains_key(&agent.species_id) {
                return Err(StoreError::CommitRejected(format!(
                    "newborn {} has unknown species {}",
                    agent.id, agent.species_id
                )));
            }
        }

        for patch in &commit.agent_patches {
            if !self.agents.contains_key(&patch.id) && !new_ids.contains(&patch.id) {
                return Err(StoreError::AgentNotFound(patch.id));
            }
            validate_inventory_ops(self.agents.get(&patch.id), patch)?;
        }
        for patch in &commit.node_patches {
            if !self.nodes.contains_key(&patch.id) {
                return Err(StoreError::NodeNotFound(patch.id));
            }
        }
        for delta in &commit.relationship_deltas {
            for id in [delta.a, delta.b] {
                if !self.agents.contains_key(&id) && !new_ids.contains(&id) {
                    return Err(StoreError::AgentNotFound(id));
                }
            }
        }
        Ok(())
    }

    fn recount_population(&mut self, world: WorldId) -> PopulationSnapshot {
        let mut population = PopulationSnapshot::default();
        for agent in self.agents_in(world).filter(|a| a.is_alive()) {
            population.total_alive += 1;
            *population.by_species.entry(agent.species_id).or_insert(0) += 1;
        }
        population
    }
}

/// Rejects a patch that would drive an inventory below zero.
fn validate_inventory_ops(agent: Option<&Agent>, patch: &AgentPatch) -> Result<(), StoreError> {
    let mut running: BTreeMap<ResourceTypeId, i64> = BTreeMap::new();
    for op in &patch.ops {
        if let PatchOp::IncrementInventory { resource, delta } = op {
            let held = running.entry(*resource).or_insert_with(|| {
                agent.map_or(0, |a| i64::from(a.quantity_of(*resource)))
            });
            *held += delta;
            if *held < 0 {
                return Err(StoreError::CommitRejected(format!(
                    "inventory of {} for {} would go negative",
                    resource, patch.id
                )));
            }
        }
    }
    Ok(())
}

fn apply_op(agent: &mut Agent, op: &PatchOp) {
    match op {
        PatchOp::SetPosition(p) => agent.position = *p,
        PatchOp::SetHealth(h) => agent.health = *h,
        PatchOp::SetVitals(v) => agent.vitals = *v,
        PatchOp::SetStatus(s) => agent.status = *s,
        PatchOp::SetLastReproductionTick(t) => agent.last_reproduction_tick = Some(*t),
        PatchOp::IncrementKills(n) => agent.stats.kills += n,
        PatchOp::IncrementDeaths(n) => agent.stats.deaths += n,
        PatchOp::IncrementDamageDealt(d) => agent.stats.damage_dealt += d,
        PatchOp::IncrementResourcesCollected(n) => agent.stats.resources_collected += n,
        PatchOp::IncrementChildren(n) => agent.children += n,
        PatchOp::IncrementInventory { resource, delta } => {
            let held = i64::from(agent.quantity_of(*resource)) + delta;
            if held <= 0 {
                agent.inventory.remove(resource);
            } else {
                agent
                    .inventory
                    .insert(*resource, u32::try_from(held).unwrap_or(u32::MAX));
            }
        }
    }
}

impl WorldStore for InMemoryStore {
    fn world(&self, world: WorldId) -> Result<World, StoreError> {
        self.worlds
            .get(&world)
            .cloned()
            .ok_or(StoreError::WorldNotFound(world))
    }

    fn alive_agents(&self, world: WorldId) -> Result<Vec<Agent>, StoreError> {
        if !self.worlds.contains_key(&world) {
            return Err(StoreError::WorldNotFound(world));
        }
        Ok(self
            .agents_in(world)
            .filter(|a| a.status == LifeStatus::Alive)
            .cloned()
            .collect())
    }

    fn agent(&self, id: AgentId) -> Result<Option<Agent>, StoreError> {
        Ok(self.agents.get(&id).cloned())
    }

    fn species(&self) -> Result<Vec<Species>, StoreError> {
        Ok(self.species.values().cloned().collect())
    }

    fn resource_types(&self) -> Result<Vec<ResourceType>, StoreError> {
        Ok(self.resource_types.values().cloned().collect())
    }

    fn territories(&self, world: WorldId) -> Result<Vec<Territory>, StoreError> {
        Ok(self
            .territories
            .values()
            .filter(|t| t.world_id == world)
            .cloned()
            .collect())
    }

    fn undepleted_nodes(&self, world: WorldId) -> Result<Vec<ResourceNode>, StoreError> {
        Ok(self
            .nodes_in(world)
            .filter(|n| n.is_available())
            .cloned()
            .collect())
    }

    fn relationship_tables(&self, world: WorldId) -> Result<RelationshipTables, StoreError> {
        let mut tables = RelationshipTables::new();
        for ((a, b), kind) in &self.species_relations {
            tables.set_species(*a, *b, *kind);
        }
        let world_clans: BTreeSet<ClanId> = self.clans_in(world).map(|c| c.id).collect();
        for ((a, b), state) in &self.clan_relations {
            if world_clans.contains(a) || world_clans.contains(b) {
                tables.set_diplomacy(*a, *b, *state);
            }
        }
        for ((a, b), score) in &self.personal {
            let in_world = |id: &AgentId| self.agents.get(id).map_or(false, |x| x.world_id == world);
            if in_world(a) || in_world(b) {
                tables.set_personal(*a, *b, *score);
            }
        }
        Ok(tables)
    }

    fn active_missions(&self, world: WorldId) -> Result<Vec<Mission>, StoreError> {
        Ok(self
            .missions_in(world)
            .filter(|m| m.is_active())
            .cloned()
            .collect())
    }

    fn next_agent_id(&self) -> Result<AgentId, StoreError> {
        Ok(AgentId(
            self.agents.keys().next_back().map_or(1, |id| id.0 + 1),
        ))
    }

    fn commit(&mut self, commit: TickCommit) -> Result<(), StoreError> {
        self.validate_commit(&commit)?;

        let world_id = commit.world_id;
        for agent in commit.new_agents {
            self.agents.insert(agent.id, agent);
        }
        for patch in &commit.agent_patches {
            if let Some(agent) = self.agents.get_mut(&patch.id) {
                for op in &patch.ops {
                    apply_op(agent, op);
                }
            }
        }
        for patch in &commit.node_patches {
            if let Some(node) = self.nodes.get_mut(&patch.id) {
                node.quantity = patch.quantity;
                node.is_depleted = patch.is_depleted;
            }
        }
        for delta in &commit.relationship_deltas {
            *self.personal.entry(pair_key(delta.a, delta.b)).or_insert(0.0) += delta.delta;
        }
        self.events.extend(commit.events);
        if let Some(world) = self.worlds.get_mut(&world_id) {
            world.current_tick += 1;
            world.global_event = commit.global_event;
        }
        self.populations.insert(world_id, commit.population);
        Ok(())
    }

    fn apply_missions(&mut self, world: WorldId, update: MissionUpdate) -> Result<(), StoreError> {
        if !self.worlds.contains_key(&world) {
            return Err(StoreError::WorldNotFound(world));
        }
        for patch in &update.missions {
            let mission = self
                .missions
                .get(&patch.id)
                .ok_or(StoreError::MissionNotFound(patch.id))?;
            if let Some(bad) = patch
                .completed_objectives
                .iter()
                .chain(patch.progress.iter().map(|(i, _)| i))
                .find(|i| **i >= mission.objectives.len())
            {
                return Err(StoreError::CommitRejected(format!(
                    "{} has no objective {}",
                    patch.id, bad
                )));
            }
        }
        for (territory, _) in &update.territory_owners {
            if !self.territories.contains_key(territory) {
                return Err(StoreError::TerritoryNotFound(*territory));
            }
        }

        for patch in update.missions {
            if let Some(mission) = self.missions.get_mut(&patch.id) {
                for (index, progress) in patch.progress {
                    mission.objectives[index].current_progress = progress;
                }
                for index in patch.completed_objectives {
                    mission.objectives[index].is_complete = true;
                }
                if let Some(status) = patch.status {
                    mission.status = status;
                }
            }
        }
        for (territory, clan) in update.territory_owners {
            if let Some(t) = self.territories.get_mut(&territory) {
                t.owner = Some(clan);
            }
        }
        self.events.extend(update.events);
        let population = self.recount_population(world);
        self.populations.insert(world, population);
        Ok(())
    }
}
