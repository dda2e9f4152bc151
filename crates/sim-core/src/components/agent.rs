//! Agent Components
//!
//! A character: identity, vitals, personality, inventory and lifetime stats.
//! Relations to other agents (parents) are held as ids, never references.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sim_events::{ActorRef, AgentId, ClanId, ResourceTypeId, SpeciesId, WorldId};

use super::world::Position;

/// Upper bound of hunger and energy.
pub const VITAL_MAX: f64 = 100.0;

/// Agent personality traits - fixed at creation.
/// All values are 0 to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Personality {
    /// Willingness to stand and fight
    pub bravery: f64,
    /// Aversion to risk in hostile ground
    pub caution: f64,
    /// Drive to stay near allies
    pub sociability: f64,
    /// Appetite for food and materials
    pub greed: f64,
    /// Tactical judgment
    pub intelligence: f64,
}

impl Default for Personality {
    fn default() -> Self {
        Self {
            bravery: 50.0,
            caution: 50.0,
            sociability: 50.0,
            greed: 50.0,
            intelligence: 50.0,
        }
    }
}

/// Hunger (100 = starving) and energy are clamped to [0, 100]; age counts ticks.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vitals {
    pub hunger: f64,
    pub energy: f64,
    pub age: u64,
}

impl Default for Vitals {
    fn default() -> Self {
        Self {
            hunger: 0.0,
            energy: VITAL_MAX,
            age: 0,
        }
    }
}

impl Vitals {
    pub fn clamped(self) -> Self {
        Self {
            hunger: self.hunger.clamp(0.0, VITAL_MAX),
            energy: self.energy.clamp(0.0, VITAL_MAX),
            age: self.age,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LifeStatus {
    Alive,
    Dead,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
}

impl Gender {
    pub fn opposite(self) -> Self {
        match self {
            Gender::Male => Gender::Female,
            Gender::Female => Gender::Male,
        }
    }
}

/// Lifetime counters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LifetimeStats {
    pub kills: u32,
    pub deaths: u32,
    pub damage_dealt: f64,
    pub resources_collected: u64,
}

/// Resource kind to quantity held.
pub type Inventory = BTreeMap<ResourceTypeId, u32>;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub world_id: WorldId,
    pub name: String,
    pub species_id: SpeciesId,
    #[serde(default)]
    pub clan_id: Option<ClanId>,
    pub gender: Gender,
    pub position: Position,
    pub health: f64,
    #[serde(default)]
    pub vitals: Vitals,
    #[serde(default)]
    pub personality: Personality,
    pub status: LifeStatus,
    #[serde(default)]
    pub inventory: Inventory,
    #[serde(default)]
    pub stats: LifetimeStats,
    /// Overrides the species lifespan when set
    #[serde(default)]
    pub lifespan_ticks: Option<u64>,
    #[serde(default)]
    pub parents: Vec<AgentId>,
    #[serde(default)]
    pub children: u32,
    #[serde(default)]
    pub last_reproduction_tick: Option<u64>,
}

impl Agent {
    /// Creates a living adult with default vitals and personality.
    pub fn new(
        id: AgentId,
        world_id: WorldId,
        name: impl Into<String>,
        species_id: SpeciesId,
        position: Position,
        health: f64,
    ) -> Self {
        Self {
            id,
            world_id,
            name: name.into(),
            species_id,
            clan_id: None,
            gender: Gender::Male,
            position,
            health,
            vitals: Vitals::default(),
            personality: Personality::default(),
            status: LifeStatus::Alive,
            inventory: Inventory::new(),
            stats: LifetimeStats::default(),
            lifespan_ticks: None,
            parents: Vec::new(),
            children: 0,
            last_reproduction_tick: None,
        }
    }

    pub fn with_clan(mut self, clan: ClanId) -> Self {
        self.clan_id = Some(clan);
        self
    }

    pub fn with_gender(mut self, gender: Gender) -> Self {
        self.gender = gender;
        self
    }

    pub fn with_vitals(mut self, hunger: f64, energy: f64, age: u64) -> Self {
        self.vitals = Vitals {
            hunger,
            energy,
            age,
        };
        self
    }

    pub fn with_personality(mut self, personality: Personality) -> Self {
        self.personality = personality;
        self
    }

    pub fn with_item(mut self, resource: ResourceTypeId, quantity: u32) -> Self {
        self.inventory.insert(resource, quantity);
        self
    }

    pub fn is_alive(&self) -> bool {
        self.status == LifeStatus::Alive
    }

    pub fn quantity_of(&self, resource: ResourceTypeId) -> u32 {
        self.inventory.get(&resource).copied().unwrap_or(0)
    }

    /// Identity as recorded on events.
    pub fn actor_ref(&self) -> ActorRef {
        ActorRef::new(self.id, self.species_id, self.clan_id)
    }

    /// True while the reproduction cooldown has not elapsed at `tick`.
    pub fn on_reproduction_cooldown(&self, tick: u64, cooldown: u64) -> bool {
        self.last_reproduction_tick
            .map_or(false, |last| tick < last.saturating_add(cooldown))
    }
}
