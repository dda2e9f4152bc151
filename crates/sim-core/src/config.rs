//! Configuration System
//!
//! Every tuning constant of the engine, loadable from TOML. Missing sections
//! and fields fall back to the defaults below, so an empty file is valid.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::ConfigError;

/// Complete engine configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SimConfig {
    /// Distances and movement costs
    #[serde(default)]
    pub movement: MovementConfig,
    /// Hunger, energy, health and aging
    #[serde(default)]
    pub vitals: VitalsConfig,
    /// Gathering and building
    #[serde(default)]
    pub economy: EconomyConfig,
    /// Reproduction gates and costs
    #[serde(default)]
    pub reproduction: ReproductionConfig,
    /// Personal relationship thresholds and deltas
    #[serde(default)]
    pub relationships: RelationshipConfig,
    /// Consideration weights
    #[serde(default)]
    pub utility: UtilityConfig,
    /// Scheduling and randomness
    #[serde(default)]
    pub engine: EngineConfig,
}

impl SimConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parses and validates configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SimConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Returns the configuration as a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Rejects values the engine cannot run with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let m = &self.movement;
        if m.move_speed <= 0.0 {
            return Err(ConfigError::Invalid("movement.move_speed must be positive".into()));
        }
        if m.vision_range <= 0.0 {
            return Err(ConfigError::Invalid("movement.vision_range must be positive".into()));
        }
        if m.attack_range <= 0.0 || m.gather_range <= 0.0 {
            return Err(ConfigError::Invalid(
                "movement.attack_range and movement.gather_range must be positive".into(),
            ));
        }
        if self.vitals.ticks_per_year == 0 {
            return Err(ConfigError::Invalid("vitals.ticks_per_year must be at least 1".into()));
        }
        if self.economy.gather_amount == 0 {
            return Err(ConfigError::Invalid("economy.gather_amount must be at least 1".into()));
        }
        let r = &self.relationships;
        if r.enemy_threshold >= r.friend_threshold {
            return Err(ConfigError::Invalid(format!(
                "relationships.enemy_threshold ({}) must be below friend_threshold ({})",
                r.enemy_threshold, r.friend_threshold
            )));
        }
        if self.utility.threshold < 0.0 {
            return Err(ConfigError::Invalid("utility.threshold must not be negative".into()));
        }
        Ok(())
    }
}

/// Distances are in map units, speeds in map units per tick.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MovementConfig {
    /// Radius within which other agents are perceived
    pub vision_range: f64,
    /// Maximum distance covered in one tick
    pub move_speed: f64,
    /// Distance at which an attack lands
    pub attack_range: f64,
    /// Distance at which a resource node can be harvested
    pub gather_range: f64,
    /// Distance at which an agent counts as part of a group
    pub grouping_distance: f64,
    /// Energy spent per movement step
    pub move_energy_cost: f64,
    /// Energy spent per wander step
    pub wander_energy_cost: f64,
}

impl Default for MovementConfig {
    fn default() -> Self {
        Self {
            vision_range: 150.0,
            move_speed: 15.0,
            attack_range: 25.0,
            gather_range: 15.0,
            grouping_distance: 50.0,
            move_energy_cost: 0.5,
            wander_energy_cost: 0.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct VitalsConfig {
    /// Hunger gained every tick
    pub hunger_increase_rate: f64,
    /// Health lost per tick while starving
    pub starvation_damage: f64,
    /// Energy regained on ticks spent neither moving nor resting
    pub energy_regen_rate: f64,
    /// Energy regained on ticks spent resting
    pub rest_energy_regen_rate: f64,
    /// Hunger removed by one meal
    pub eat_hunger_reduction: f64,
    /// Energy spent per attack
    pub attack_energy_cost: f64,
    /// Energy spent per harvest
    pub gather_energy_cost: f64,
    /// Attacks are not considered below this energy
    pub min_attack_energy: f64,
    /// Length of a simulated year, used for lifespans
    pub ticks_per_year: u64,
}

impl Default for VitalsConfig {
    fn default() -> Self {
        Self {
            hunger_increase_rate: 0.1,
            starvation_damage: 1.0,
            energy_regen_rate: 5.0,
            rest_energy_regen_rate: 10.0,
            eat_hunger_reduction: 50.0,
            attack_energy_cost: 5.0,
            gather_energy_cost: 3.0,
            min_attack_energy: 10.0,
            ticks_per_year: sim_events::TICKS_PER_YEAR,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    /// Units requested from a node per harvest
    pub gather_amount: u32,
    /// Wood consumed by building a house
    pub house_wood_cost: u32,
    /// Stone consumed by building a house
    pub house_stone_cost: u32,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            gather_amount: 6,
            house_wood_cost: 10,
            house_stone_cost: 5,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReproductionConfig {
    /// Ticks a parent must wait between births
    pub cooldown_ticks: u64,
    /// Hunger added to each parent
    pub hunger_cost: f64,
    /// Energy removed from each parent
    pub energy_cost: f64,
    /// Minimum energy to consider reproducing
    pub min_energy: f64,
    /// Maximum hunger to consider reproducing
    pub max_hunger: f64,
    /// Minimum personal score toward the partner
    pub min_relationship: f64,
}

impl Default for ReproductionConfig {
    fn default() -> Self {
        Self {
            cooldown_ticks: 300,
            hunger_cost: 50.0,
            energy_cost: 40.0,
            min_energy: 60.0,
            max_hunger: 40.0,
            min_relationship: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RelationshipConfig {
    /// Personal score above which two agents are friends
    pub friend_threshold: f64,
    /// Personal score below which two agents are enemies
    pub enemy_threshold: f64,
    /// Applied to the pair on every attack
    pub attack_delta: f64,
    /// Applied between a defender and the ally it protects
    pub help_delta: f64,
    /// Applied between grouped agents
    pub group_delta: f64,
}

impl Default for RelationshipConfig {
    fn default() -> Self {
        Self {
            friend_threshold: 50.0,
            enemy_threshold: -50.0,
            attack_delta: -10.0,
            help_delta: 8.0,
            group_delta: 1.0,
        }
    }
}

/// Weights for the utility considerations. Traits are on a 0-100 scale.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UtilityConfig {
    /// A consideration must score strictly above this to be chosen
    pub threshold: f64,
    pub flee_scale: f64,
    pub flee_floor: f64,
    /// Life fraction below which fleeing is forced
    pub flee_critical_life: f64,
    /// Numeric disadvantage at which fleeing is forced
    pub flee_outnumbered_by: i32,
    pub defend_score: f64,
    pub attack_scale: f64,
    pub help_scale: f64,
    pub help_floor: f64,
    /// Ally life fraction below which helping is forced
    pub help_critical_life: f64,
    pub eat_scale: f64,
    pub eat_greed_factor: f64,
    pub eat_opportunity_bonus: f64,
    pub eat_floor: f64,
    /// Hunger at which eating is forced
    pub eat_critical_hunger: f64,
    pub rest_scale: f64,
    pub group_scale: f64,
    pub group_mixed_gender_bonus: f64,
    pub seek_resource_scale: f64,
    pub invade_scale: f64,
    pub reproduce_score: f64,
    pub build_base: f64,
    /// Expansion drives are off at or above this hunger
    pub expansion_max_hunger: f64,
    /// Expansion drives are off below this energy
    pub expansion_min_energy: f64,
}

impl Default for UtilityConfig {
    fn default() -> Self {
        Self {
            threshold: 10.0,
            flee_scale: 150.0,
            flee_floor: 200.0,
            flee_critical_life: 0.25,
            flee_outnumbered_by: 3,
            defend_score: 90.0,
            attack_scale: 60.0,
            help_scale: 80.0,
            help_floor: 120.0,
            help_critical_life: 0.3,
            eat_scale: 100.0,
            eat_greed_factor: 0.15,
            eat_opportunity_bonus: 20.0,
            eat_floor: 150.0,
            eat_critical_hunger: 90.0,
            rest_scale: 80.0,
            group_scale: 15.0,
            group_mixed_gender_bonus: 3.0,
            seek_resource_scale: 20.0,
            invade_scale: 25.0,
            reproduce_score: 35.0,
            build_base: 12.0,
            expansion_max_hunger: 80.0,
            expansion_min_energy: 30.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Below this many agents the decide phase runs on the calling thread
    pub parallel_threshold: usize,
    /// Worker threads for the decide phase; 0 uses the rayon default
    pub worker_count: usize,
    /// Mixed into every per-agent random stream
    pub seed: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: 64,
            worker_count: 0,
            seed: 42,
        }
    }
}
