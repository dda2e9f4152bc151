//! Clans and Diplomacy

use serde::{Deserialize, Serialize};

use sim_events::{ClanId, SpeciesId, WorldId};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Clan {
    pub id: ClanId,
    pub world_id: WorldId,
    pub name: String,
    pub species_id: SpeciesId,
}

impl Clan {
    pub fn new(id: ClanId, world_id: WorldId, name: impl Into<String>, species_id: SpeciesId) -> Self {
        Self {
            id,
            world_id,
            name: name.into(),
            species_id,
        }
    }
}

/// Diplomatic state between two clans.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Diplomacy {
    War,
    Alliance,
    Neutral,
}
