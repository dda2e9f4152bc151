//! Snapshot Types
//!
//! Serialization structs for world snapshots pushed to real-time clients after
//! each tick. They are flat projections of engine state with no behavior.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::ids::{
    AgentId, ClanId, MissionId, ResourceNodeId, ResourceTypeId, SpeciesId, TerritoryId, WorldId,
};
use crate::SimTimestamp;

/// Generates a snapshot ID for the given tick.
pub fn generate_snapshot_id(tick: u64) -> String {
    format!("snap_{:06}", tick)
}

/// Projection of one character.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSnapshot {
    pub id: AgentId,
    pub name: String,
    pub species_id: SpeciesId,
    #[serde(default)]
    pub clan_id: Option<ClanId>,
    pub x: f64,
    pub y: f64,
    pub health: f64,
    pub hunger: f64,
    pub energy: f64,
    pub age: u64,
    pub alive: bool,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub inventory: BTreeMap<ResourceTypeId, u32>,
    #[serde(default)]
    pub kills: u32,
}

/// Projection of a territory rectangle and its owner.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TerritorySnapshot {
    pub id: TerritoryId,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub owner_clan_id: Option<ClanId>,
}

/// Projection of a resource node.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNodeSnapshot {
    pub id: ResourceNodeId,
    pub resource_type_id: ResourceTypeId,
    pub x: f64,
    pub y: f64,
    pub quantity: u32,
    pub is_depleted: bool,
}

/// Projection of a clan mission and its progress.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MissionSnapshot {
    pub id: MissionId,
    pub clan_id: ClanId,
    pub name: String,
    pub status: String,
    pub objectives_complete: usize,
    pub objectives_total: usize,
    #[serde(default)]
    pub objectives: Vec<ObjectiveSnapshot>,
}

/// Progress on one objective of a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectiveSnapshot {
    pub is_complete: bool,
    pub current_progress: u32,
    #[serde(default)]
    pub target_quantity: Option<u32>,
}

/// Population totals for the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PopulationSnapshot {
    pub total_alive: u64,
    #[serde(default)]
    pub by_species: BTreeMap<SpeciesId, u64>,
}

/// Complete world snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub snapshot_id: String,
    pub world_id: WorldId,
    pub timestamp: SimTimestamp,
    pub map_width: f64,
    pub map_height: f64,
    #[serde(default)]
    pub global_event: Option<String>,
    #[serde(default)]
    pub population: PopulationSnapshot,
    #[serde(default)]
    pub agents: Vec<AgentSnapshot>,
    #[serde(default)]
    pub territories: Vec<TerritorySnapshot>,
    #[serde(default)]
    pub resource_nodes: Vec<ResourceNodeSnapshot>,
    #[serde(default)]
    pub missions: Vec<MissionSnapshot>,
}

impl WorldSnapshot {
    /// Creates an empty snapshot for the given world and time.
    pub fn new(world_id: WorldId, timestamp: SimTimestamp, map_width: f64, map_height: f64) -> Self {
        Self {
            snapshot_id: generate_snapshot_id(timestamp.tick),
            world_id,
            timestamp,
            map_width,
            map_height,
            global_event: None,
            population: PopulationSnapshot::default(),
            agents: Vec::new(),
            territories: Vec::new(),
            resource_nodes: Vec::new(),
            missions: Vec::new(),
        }
    }

    /// Serializes to pretty JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserializes from JSON.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
