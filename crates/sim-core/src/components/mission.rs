//! Missions and Objectives
//!
//! Clan goals evaluated after every tick.

use serde::{Deserialize, Serialize};

use sim_events::{AgentId, ClanId, MissionId, ResourceTypeId, TerritoryId, WorldId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MissionStatus {
    Active,
    Completed,
    Failed,
}

impl MissionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            MissionStatus::Active => "ACTIVE",
            MissionStatus::Completed => "COMPLETED",
            MissionStatus::Failed => "FAILED",
        }
    }
}

/// What an objective asks of the clan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObjectiveKind {
    /// Hold at least `target` units summed across living members
    GatherResource {
        resource_type_id: ResourceTypeId,
        target: u32,
    },
    /// Own the territory
    ConquerTerritory { territory_id: TerritoryId },
    /// See the character dead
    DefeatCharacter { agent_id: AgentId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub kind: ObjectiveKind,
    #[serde(default)]
    pub is_complete: bool,
    /// Units held by the clan at the last evaluation, for gather objectives
    #[serde(default)]
    pub current_progress: u32,
}

impl Objective {
    pub fn new(kind: ObjectiveKind) -> Self {
        Self {
            kind,
            is_complete: false,
            current_progress: 0,
        }
    }

    /// The amount asked for, when the objective is counted in units.
    pub fn target_quantity(&self) -> Option<u32> {
        match self.kind {
            ObjectiveKind::GatherResource { target, .. } => Some(target),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Mission {
    pub id: MissionId,
    pub world_id: WorldId,
    pub clan_id: ClanId,
    pub name: String,
    pub status: MissionStatus,
    pub objectives: Vec<Objective>,
    /// The mission fails once the world passes this tick
    #[serde(default)]
    pub deadline_tick: Option<u64>,
}

impl Mission {
    pub fn new(
        id: MissionId,
        world_id: WorldId,
        clan_id: ClanId,
        name: impl Into<String>,
        objectives: Vec<ObjectiveKind>,
    ) -> Self {
        Self {
            id,
            world_id,
            clan_id,
            name: name.into(),
            status: MissionStatus::Active,
            objectives: objectives.into_iter().map(Objective::new).collect(),
            deadline_tick: None,
        }
    }

    pub fn with_deadline(mut self, tick: u64) -> Self {
        self.deadline_tick = Some(tick);
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == MissionStatus::Active
    }

    pub fn completed_count(&self) -> usize {
        self.objectives.iter().filter(|o| o.is_complete).count()
    }
}
