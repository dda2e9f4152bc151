//! World Snapshot
//!
//! The immutable pre-tick view every agent decides against. Loaded once per
//! tick from the store and shared by reference across decide workers.

use std::collections::{BTreeMap, HashMap};

use sim_events::{
    AgentId, AgentSnapshot, ClanId, MissionSnapshot, ObjectiveSnapshot, ResourceNodeId, ResourceNodeSnapshot,
    ResourceTypeId, SimTimestamp, SpeciesId, TerritoryId, TerritorySnapshot, WorldId,
    WorldSnapshot,
};

use crate::components::{
    material_names, Agent, Mission, Position, RelationshipTables, ResourceCategory, ResourceNode,
    ResourceType, Species, Territory, World,
};
use crate::config::SimConfig;
use crate::error::StoreError;
use crate::store::WorldStore;
use crate::systems::mission::clan_objective_positions;
use crate::systems::relationship::Resolver;

#[derive(Debug, Clone)]
pub struct WorldView {
    world: World,
    timestamp: SimTimestamp,
    agents: Vec<Agent>,
    index: HashMap<AgentId, usize>,
    species: BTreeMap<SpeciesId, Species>,
    resource_types: BTreeMap<ResourceTypeId, ResourceType>,
    territories: Vec<Territory>,
    nodes: Vec<ResourceNode>,
    tables: RelationshipTables,
    missions: Vec<Mission>,
    objective_positions: BTreeMap<ClanId, Position>,
    next_agent_id: AgentId,
}

impl WorldView {
    /// Reads everything the decide phase needs for one world.
    pub fn load<S: WorldStore + ?Sized>(
        store: &S,
        world_id: WorldId,
        config: &SimConfig,
    ) -> Result<Self, StoreError> {
        let world = store.world(world_id)?;
        let mut agents = store.alive_agents(world_id)?;
        agents.retain(|a| a.is_alive());
        agents.sort_by_key(|a| a.id);

        let mut territories = store.territories(world_id)?;
        territories.sort_by_key(|t| t.id);
        let mut nodes = store.undepleted_nodes(world_id)?;
        nodes.retain(|n| n.is_available());
        nodes.sort_by_key(|n| n.id);

        let missions = store.active_missions(world_id)?;
        let objective_positions = clan_objective_positions(&missions, &territories);

        Ok(Self::assemble(
            world,
            agents,
            store.species()?,
            store.resource_types()?,
            territories,
            nodes,
            store.relationship_tables(world_id)?,
            missions,
            objective_positions,
            store.next_agent_id()?,
            config.vitals.ticks_per_year,
        ))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        world: World,
        agents: Vec<Agent>,
        species: Vec<Species>,
        resource_types: Vec<ResourceType>,
        territories: Vec<Territory>,
        nodes: Vec<ResourceNode>,
        tables: RelationshipTables,
        missions: Vec<Mission>,
        objective_positions: BTreeMap<ClanId, Position>,
        next_agent_id: AgentId,
        ticks_per_year: u64,
    ) -> Self {
        let index = agents.iter().enumerate().map(|(i, a)| (a.id, i)).collect();
        Self {
            timestamp: SimTimestamp::new(world.current_tick, ticks_per_year),
            world,
            agents,
            index,
            species: species.into_iter().map(|s| (s.id, s)).collect(),
            resource_types: resource_types.into_iter().map(|r| (r.id, r)).collect(),
            territories,
            nodes,
            tables,
            missions,
            objective_positions,
            next_agent_id,
        }
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn world_id(&self) -> WorldId {
        self.world.id
    }

    pub fn tick(&self) -> u64 {
        self.world.current_tick
    }

    pub fn timestamp(&self) -> SimTimestamp {
        self.timestamp
    }

    /// Living agents in ascending id order.
    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.index.get(&id).and_then(|i| self.agents.get(*i))
    }

    pub fn species(&self, id: SpeciesId) -> Option<&Species> {
        self.species.get(&id)
    }

    pub fn resource_type(&self, id: ResourceTypeId) -> Option<&ResourceType> {
        self.resource_types.get(&id)
    }

    pub fn is_food(&self, id: ResourceTypeId) -> bool {
        self.resource_type(id)
            .map_or(false, |r| r.category == ResourceCategory::Food)
    }

    pub fn is_material(&self, id: ResourceTypeId) -> bool {
        self.resource_type(id)
            .map_or(false, |r| r.category == ResourceCategory::Material)
    }

    /// Resource type id of a named material.
    pub fn material_id(&self, name: &str) -> Option<ResourceTypeId> {
        self.resource_types
            .values()
            .find(|r| r.category == ResourceCategory::Material && r.name == name)
            .map(|r| r.id)
    }

    pub fn wood_id(&self) -> Option<ResourceTypeId> {
        self.material_id(material_names::WOOD)
    }

    pub fn stone_id(&self) -> Option<ResourceTypeId> {
        self.material_id(material_names::STONE)
    }

    pub fn territories(&self) -> &[Territory] {
        &self.territories
    }

    pub fn territory(&self, id: TerritoryId) -> Option<&Territory> {
        self.territories.iter().find(|t| t.id == id)
    }

    /// Undepleted nodes in ascending id order.
    pub fn nodes(&self) -> &[ResourceNode] {
        &self.nodes
    }

    pub fn node(&self, id: ResourceNodeId) -> Option<&ResourceNode> {
        self.nodes.iter().find(|n| n.id == id)
    }

    pub fn tables(&self) -> &RelationshipTables {
        &self.tables
    }

    pub fn missions(&self) -> &[Mission] {
        &self.missions
    }

    pub fn objective_position(&self, clan: ClanId) -> Option<Position> {
        self.objective_positions.get(&clan).copied()
    }

    pub fn next_agent_id(&self) -> AgentId {
        self.next_agent_id
    }

    pub fn resolver<'a>(&'a self, config: &SimConfig) -> Resolver<'a> {
        Resolver::new(&self.tables, &self.species, &config.relationships)
    }

    /// Health as a fraction of the species base health, within [0, 1].
    pub fn life_fraction(&self, agent: &Agent) -> f64 {
        match self.species(agent.species_id) {
            Some(s) if s.base_health > 0.0 => (agent.health / s.base_health).clamp(0.0, 1.0),
            _ => 0.0,
        }
    }

    /// Lifespan in ticks, preferring the agent's own override.
    pub fn lifespan_ticks(&self, agent: &Agent, ticks_per_year: u64) -> Option<u64> {
        agent.lifespan_ticks.or_else(|| {
            self.species(agent.species_id)
                .and_then(|s| s.lifespan_ticks(ticks_per_year))
        })
    }
}

/// Builds the client-facing snapshot of a world from the store.
pub fn world_snapshot<S: WorldStore + ?Sized>(
    store: &S,
    world_id: WorldId,
    config: &SimConfig,
) -> Result<WorldSnapshot, StoreError> {
    let view = WorldView::load(store, world_id, config)?;
    let world = view.world();
    let mut snapshot = WorldSnapshot::new(world.id, view.timestamp(), world.map_width, world.map_height);
    snapshot.global_event = world.global_event.as_ref().map(|e| e.name.clone());

    for agent in view.agents() {
        snapshot.population.total_alive += 1;
        *snapshot.population.by_species.entry(agent.species_id).or_insert(0) += 1;
        snapshot.agents.push(AgentSnapshot {
            id: agent.id,
            name: agent.name.clone(),
            species_id: agent.species_id,
            clan_id: agent.clan_id,
            x: agent.position.x,
            y: agent.position.y,
            health: agent.health,
            hunger: agent.vitals.hunger,
            energy: agent.vitals.energy,
            age: agent.vitals.age,
            alive: agent.is_alive(),
            inventory: agent.inventory.clone(),
            kills: agent.stats.kills,
        });
    }
    snapshot.territories = view
        .territories()
        .iter()
        .map(|t| TerritorySnapshot {
            id: t.id,
            name: t.name.clone(),
            x: t.bounds.x,
            y: t.bounds.y,
            width: t.bounds.width,
            height: t.bounds.height,
            owner_clan_id: t.owner,
        })
        .collect();
    snapshot.resource_nodes = view
        .nodes()
        .iter()
        .map(|n| ResourceNodeSnapshot {
            id: n.id,
            resource_type_id: n.resource_type_id,
            x: n.position.x,
            y: n.position.y,
            quantity: n.quantity,
            is_depleted: n.is_depleted,
        })
        .collect();
    snapshot.missions = view
        .missions()
        .iter()
        .map(|m| MissionSnapshot {
            id: m.id,
            clan_id: m.clan_id,
            name: m.name.clone(),
            status: m.status.as_str().to_string(),
            objectives_complete: m.completed_count(),
            objectives_total: m.objectives.len(),
            objectives: m
                .objectives
                .iter()
                .map(|o| ObjectiveSnapshot {
                    is_complete: o.is_complete,
                    current_progress: o.current_progress,
                    target_quantity: o.target_quantity(),
                })
                .collect(),
        })
        .collect();
    Ok(snapshot)
}
