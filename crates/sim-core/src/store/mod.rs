//! Storage Contract
//!
//! The engine reads world state through [`WorldStore`] queries and writes each
//! tick back as one [`TickCommit`]. Implementations must apply a commit
//! all-or-nothing: a rejected commit leaves every row untouched.

pub mod memory;

pub use memory::InMemoryStore;

use sim_events::{
    AgentId, ClanId, Event, MissionId, PopulationSnapshot, ResourceNodeId, ResourceTypeId,
    TerritoryId, WorldId,
};

use crate::components::{
    Agent, GlobalEvent, LifeStatus, Mission, MissionStatus, Position, RelationshipTables,
    ResourceNode, ResourceType, Species, Territory, Vitals, World,
};
use crate::error::StoreError;

/// A single field operation against an agent row.
#[derive(Debug, Clone, PartialEq)]
pub enum PatchOp {
    SetPosition(Position),
    SetHealth(f64),
    SetVitals(Vitals),
    SetStatus(LifeStatus),
    SetLastReproductionTick(u64),
    IncrementKills(u32),
    IncrementDeaths(u32),
    IncrementDamageDealt(f64),
    IncrementResourcesCollected(u64),
    IncrementChildren(u32),
    IncrementInventory { resource: ResourceTypeId, delta: i64 },
}

/// All field operations for one agent, applied in order.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentPatch {
    pub id: AgentId,
    pub ops: Vec<PatchOp>,
}

/// New quantity for a resource node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodePatch {
    pub id: ResourceNodeId,
    pub quantity: u32,
    pub is_depleted: bool,
}

/// Increment to a personal relationship score, upserted on the sorted pair.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RelationshipDelta {
    pub a: AgentId,
    pub b: AgentId,
    pub delta: f64,
}

/// Everything one tick writes.
#[derive(Debug, Clone)]
pub struct TickCommit {
    pub world_id: WorldId,
    /// The tick that was simulated; the store rejects the commit if the world moved on
    pub tick: u64,
    pub agent_patches: Vec<AgentPatch>,
    pub node_patches: Vec<NodePatch>,
    pub relationship_deltas: Vec<RelationshipDelta>,
    pub new_agents: Vec<Agent>,
    pub events: Vec<Event>,
    /// Global event after this tick's countdown
    pub global_event: Option<GlobalEvent>,
    pub population: PopulationSnapshot,
}

impl TickCommit {
    pub fn new(world_id: WorldId, tick: u64) -> Self {
        Self {
            world_id,
            tick,
            agent_patches: Vec::new(),
            node_patches: Vec::new(),
            relationship_deltas: Vec::new(),
            new_agents: Vec::new(),
            events: Vec::new(),
            global_event: None,
            population: PopulationSnapshot::default(),
        }
    }
}

/// Progress written by the mission tracker.
#[derive(Debug, Clone, PartialEq)]
pub struct MissionPatch {
    pub id: MissionId,
    /// Objective indices that became complete
    pub completed_objectives: Vec<usize>,
    /// New `current_progress` values, by objective index
    pub progress: Vec<(usize, u32)>,
    pub status: Option<MissionStatus>,
}

#[derive(Debug, Clone, Default)]
pub struct MissionUpdate {
    pub missions: Vec<MissionPatch>,
    pub territory_owners: Vec<(TerritoryId, ClanId)>,
    pub events: Vec<Event>,
}

impl MissionUpdate {
    pub fn is_empty(&self) -> bool {
        self.missions.is_empty() && self.territory_owners.is_empty() && self.events.is_empty()
    }
}

/// Query and write surface the engine needs from persistence.
pub trait WorldStore {
    fn world(&self, world: WorldId) -> Result<World, StoreError>;

    /// Living agents of the world, in ascending id order.
    fn alive_agents(&self, world: WorldId) -> Result<Vec<Agent>, StoreError>;

    /// Any agent, alive or dead.
    fn agent(&self, id: AgentId) -> Result<Option<Agent>, StoreError>;

    fn species(&self) -> Result<Vec<Species>, StoreError>;

    fn resource_types(&self) -> Result<Vec<ResourceType>, StoreError>;

    fn territories(&self, world: WorldId) -> Result<Vec<Territory>, StoreError>;

    fn undepleted_nodes(&self, world: WorldId) -> Result<Vec<ResourceNode>, StoreError>;

    /// Species relations, clan diplomacy and personal scores relevant to the world.
    fn relationship_tables(&self, world: WorldId) -> Result<RelationshipTables, StoreError>;

    fn active_missions(&self, world: WorldId) -> Result<Vec<Mission>, StoreError>;

    /// First id free for a newborn.
    fn next_agent_id(&self) -> Result<AgentId, StoreError>;

    /// Applies a tick atomically and advances the world tick counter.
    fn commit(&mut self, commit: TickCommit) -> Result<(), StoreError>;

    /// Applies mission tracker progress atomically.
    fn apply_missions(&mut self, world: WorldId, update: MissionUpdate) -> Result<(), StoreError>;
}
