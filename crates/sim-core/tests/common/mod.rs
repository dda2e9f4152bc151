//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use sim_core::components::{
    Agent, Clan, Mission, ObjectiveKind, Position, RelationshipKind, ResourceCategory, ResourceNode,
    ResourceType, Species, World,
};
use sim_core::store::{InMemoryStore, WorldStore};
use sim_core::{SimConfig, TickEngine, TickReport};
use sim_events::{
    AgentId, ClanId, Event, EventType, MissionId, ResourceNodeId, ResourceTypeId, SpeciesId, WorldId,
};

pub const WORLD: WorldId = WorldId(1);
/// Health 100, strength 15
pub const KNIGHT: SpeciesId = SpeciesId(1);
/// Health 100, strength 10
pub const PEASANT: SpeciesId = SpeciesId(2);
pub const BERRIES: ResourceTypeId = ResourceTypeId(1);
pub const IRON: ResourceTypeId = ResourceTypeId(2);

/// A 1000x1000 world where knights and peasants are enemies.
pub struct Fixture {
    pub store: InMemoryStore,
    next_agent: u64,
    next_node: u64,
}

impl Fixture {
    pub fn new() -> Self {
        let mut store = InMemoryStore::new();
        store.insert_world(World::new(WORLD, "Arena", 1000.0, 1000.0));
        store.insert_species(Species::new(KNIGHT, "Knight", 100.0, 15.0));
        store.insert_species(Species::new(PEASANT, "Peasant", 100.0, 10.0));
        store.set_species_relation(KNIGHT, PEASANT, RelationshipKind::Enemy);
        store.insert_resource_type(ResourceType {
            id: BERRIES,
            name: "Berries".into(),
            category: ResourceCategory::Food,
        });
        store.insert_resource_type(ResourceType {
            id: IRON,
            name: "Iron".into(),
            category: ResourceCategory::Material,
        });
        Self {
            store,
            next_agent: 1,
            next_node: 1,
        }
    }

    pub fn agent(&mut self, species: SpeciesId, x: f64, y: f64, edit: impl FnOnce(Agent) -> Agent) -> AgentId {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        let agent = Agent::new(id, WORLD, format!("agent {}", id.get()), species, Position::new(x, y), 100.0);
        self.store.insert_agent(edit(agent));
        id
    }

    pub fn node(&mut self, resource: ResourceTypeId, x: f64, y: f64, quantity: u32) -> ResourceNodeId {
        let id = ResourceNodeId(self.next_node);
        self.next_node += 1;
        self.store.insert_node(ResourceNode {
            id,
            world_id: WORLD,
            resource_type_id: resource,
            position: Position::new(x, y),
            quantity,
            is_depleted: false,
        });
        id
    }

    pub fn clan(&mut self, id: ClanId, species: SpeciesId) {
        self.store.insert_clan(Clan::new(id, WORLD, format!("clan {}", id.get()), species));
    }

    pub fn mission(&mut self, id: MissionId, clan: ClanId, objectives: Vec<ObjectiveKind>) {
        self.store
            .insert_mission(Mission::new(id, WORLD, clan, format!("mission {}", id.get()), objectives));
    }

    pub fn edit(&mut self, id: AgentId, edit: impl FnOnce(&mut Agent)) {
        let mut agent = self.store.get_agent(id).cloned().expect("agent exists");
        edit(&mut agent);
        self.store.insert_agent(agent);
    }

    pub fn tick(&mut self) -> TickReport {
        let engine = TickEngine::sequential(SimConfig::default()).expect("default config is valid");
        engine.process_tick(&mut self.store, WORLD).expect("tick succeeds")
    }

    pub fn get(&self, id: AgentId) -> Agent {
        self.store.agent(id).expect("store read").expect("agent exists")
    }

    pub fn current_tick(&self) -> u64 {
        self.store.world(WORLD).expect("world exists").current_tick
    }
}

/// Events of one type recorded for one tick.
pub fn events_of(store: &InMemoryStore, tick: u64, event_type: EventType) -> Vec<Event> {
    store
        .events()
        .iter()
        .filter(|e| e.timestamp.tick == tick && e.event_type == event_type)
        .cloned()
        .collect()
}
