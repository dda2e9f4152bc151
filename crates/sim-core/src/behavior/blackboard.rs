//! Blackboard
//!
//! Per-agent, per-tick scratch memory. The utility selector fills the
//! perception half before scoring; conditions write targets that the action
//! subtree then reads.

use sim_events::{AgentId, ResourceNodeId, TerritoryId};

use crate::components::{Agent, Position};
use crate::config::SimConfig;
use crate::systems::relationship::Resolver;
use crate::systems::spatial;
use crate::systems::snapshot::WorldView;

/// An ally within reach of something hostile to it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AllyDanger {
    pub ally: AgentId,
    pub threat: AgentId,
    /// Higher for closer friends with more health missing
    pub urgency: f64,
    pub ally_life: f64,
}

#[derive(Debug, Clone, Default)]
pub struct Blackboard {
    /// Visible friends, excluding self, ascending id
    pub allies: Vec<AgentId>,
    /// Visible enemies, ascending id
    pub enemies: Vec<AgentId>,
    pub ally_centroid: Option<Position>,
    pub nearest_ally: Option<(AgentId, f64)>,
    pub nearest_enemy: Option<(AgentId, f64)>,
    /// Nearest enemy standing in a territory owned by our clan
    pub intruder: Option<AgentId>,
    pub ally_danger: Option<AllyDanger>,
    pub opposite_gender_ally: bool,

    pub target_agent: Option<AgentId>,
    pub protected_ally: Option<AgentId>,
    pub target_node: Option<ResourceNodeId>,
    pub target_territory: Option<TerritoryId>,
    pub partner: Option<AgentId>,

    /// Consideration scores from this tick's selection, in registration order
    pub scores: Vec<(&'static str, f64)>,
}

impl Blackboard {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Own side (self plus allies) minus visible enemies.
    pub fn advantage(&self) -> i32 {
        let own = i32::try_from(self.allies.len()).unwrap_or(i32::MAX).saturating_add(1);
        own.saturating_sub(i32::try_from(self.enemies.len()).unwrap_or(i32::MAX))
    }

    pub fn has_enemies(&self) -> bool {
        !self.enemies.is_empty()
    }

    /// Partitions every agent within vision into allies and enemies and
    /// derives the threat picture used by the considerations.
    pub fn perceive(&mut self, agent: &Agent, view: &WorldView, resolver: &Resolver<'_>, config: &SimConfig) {
        let vision = config.movement.vision_range;
        let danger_radius = config.movement.attack_range * 2.0;

        let mut visible = spatial::within_radius(agent.position, vision, view.agents(), |a| a.position);
        visible.retain(|other| other.id != agent.id);

        let mut ally_agents = Vec::new();
        for other in &visible {
            let d = agent.position.distance_to(&other.position);
            if resolver.is_friend(agent, other) {
                self.allies.push(other.id);
                ally_agents.push(*other);
                if self.nearest_ally.map_or(true, |(_, bd)| d < bd) {
                    self.nearest_ally = Some((other.id, d));
                }
                if other.gender != agent.gender && other.species_id == agent.species_id {
                    self.opposite_gender_ally = true;
                }
            } else if resolver.is_enemy(agent, other) {
                self.enemies.push(other.id);
                if self.nearest_enemy.map_or(true, |(_, bd)| d < bd) {
                    self.nearest_enemy = Some((other.id, d));
                }
            }
        }

        self.ally_centroid = spatial::centroid(ally_agents.iter().map(|a| a.position));

        if let Some(clan) = agent.clan_id {
            let mut best: Option<(AgentId, f64)> = None;
            for id in &self.enemies {
                let Some(enemy) = view.agent(*id) else { continue };
                let inside_home = view
                    .territories()
                    .iter()
                    .any(|t| t.owner == Some(clan) && t.contains(&enemy.position));
                if inside_home {
                    let d = agent.position.distance_to(&enemy.position);
                    if best.map_or(true, |(_, bd)| d < bd) {
                        best = Some((*id, d));
                    }
                }
            }
            self.intruder = best.map(|(id, _)| id);
        }

        for ally in &ally_agents {
            let hostile = visible
                .iter()
                .copied()
                .filter(|other| other.id != ally.id && resolver.is_enemy(ally, other));
            let Some((threat, _)) =
                spatial::nearest(ally.position, hostile, |a| a.position).filter(|(_, d)| *d <= danger_radius)
            else {
                continue;
            };
            let ally_life = view.life_fraction(ally);
            let bond = resolver.personal_score(agent, ally).max(0.0);
            let urgency = (1.0 + bond / 100.0) * (1.0 - ally_life);
            if self.ally_danger.map_or(true, |d| urgency > d.urgency) {
                self.ally_danger = Some(AllyDanger {
                    ally: ally.id,
                    threat: threat.id,
                    urgency,
                    ally_life,
                });
            }
        }
    }
}
