//! Species Templates
//!
//! Static per-species stats. Never mutated at runtime.

use serde::{Deserialize, Serialize};

use sim_events::SpeciesId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Species {
    pub id: SpeciesId,
    pub name: String,
    /// Health of a newborn and the 100% mark for life fraction
    pub base_health: f64,
    /// Damage dealt per attack
    pub base_strength: f64,
    /// Natural lifespan; `None` never dies of age
    #[serde(default)]
    pub lifespan_years: Option<u32>,
    /// Friend to its own kind, enemy to every other species
    #[serde(default)]
    pub hostile_to_all: bool,
}

impl Species {
    pub fn new(id: SpeciesId, name: impl Into<String>, base_health: f64, base_strength: f64) -> Self {
        Self {
            id,
            name: name.into(),
            base_health,
            base_strength,
            lifespan_years: None,
            hostile_to_all: false,
        }
    }

    pub fn with_lifespan_years(mut self, years: u32) -> Self {
        self.lifespan_years = Some(years);
        self
    }

    pub fn hostile_to_all(mut self) -> Self {
        self.hostile_to_all = true;
        self
    }

    /// Natural lifespan converted to ticks.
    pub fn lifespan_ticks(&self, ticks_per_year: u64) -> Option<u64> {
        self.lifespan_years
            .map(|years| u64::from(years) * ticks_per_year)
    }
}
