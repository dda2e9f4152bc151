//! Event Types
//!
//! The append-only event record written by the engine and consumed by
//! observability and analytics collaborators.

use crate::ids::{AgentId, ClanId, ResourceTypeId, SpeciesId, WorldId};
use crate::SimTimestamp;
use serde::{Deserialize, Serialize};

/// Every kind of event the engine can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventType {
    CombatAction,
    CharacterDeath,
    CharacterBirth,
    CharacterGather,
    CharacterEat,
    CharacterMove,
    CharacterFlee,
    CharacterActionRest,
    CharacterBuildHouse,
    TerritoryInvasion,
    TerritoryConquered,
    MissionCompleted,
    MissionFailed,
    GlobalEventEnded,
    AiDecision,
}

impl EventType {
    /// Returns the analytics category this event type is filed under.
    pub fn category(&self) -> EventCategory {
        match self {
            EventType::CombatAction | EventType::CharacterDeath => EventCategory::Combat,
            EventType::CharacterGather | EventType::CharacterEat => EventCategory::Resource,
            EventType::CharacterBirth => EventCategory::Life,
            EventType::CharacterMove | EventType::CharacterFlee => EventCategory::Movement,
            EventType::CharacterBuildHouse => EventCategory::Build,
            EventType::AiDecision => EventCategory::Ai,
            EventType::CharacterActionRest
            | EventType::TerritoryInvasion
            | EventType::TerritoryConquered
            | EventType::MissionCompleted
            | EventType::MissionFailed
            | EventType::GlobalEventEnded => EventCategory::Other,
        }
    }

    /// Returns the wire name of the event type.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventType::CombatAction => "COMBAT_ACTION",
            EventType::CharacterDeath => "CHARACTER_DEATH",
            EventType::CharacterBirth => "CHARACTER_BIRTH",
            EventType::CharacterGather => "CHARACTER_GATHER",
            EventType::CharacterEat => "CHARACTER_EAT",
            EventType::CharacterMove => "CHARACTER_MOVE",
            EventType::CharacterFlee => "CHARACTER_FLEE",
            EventType::CharacterActionRest => "CHARACTER_ACTION_REST",
            EventType::CharacterBuildHouse => "CHARACTER_BUILD_HOUSE",
            EventType::TerritoryInvasion => "TERRITORY_INVASION",
            EventType::TerritoryConquered => "TERRITORY_CONQUERED",
            EventType::MissionCompleted => "MISSION_COMPLETED",
            EventType::MissionFailed => "MISSION_FAILED",
            EventType::GlobalEventEnded => "GLOBAL_EVENT_ENDED",
            EventType::AiDecision => "AI_DECISION",
        }
    }

    /// Returns all event type variants.
    pub fn all() -> &'static [EventType] {
        &[
            EventType::CombatAction,
            EventType::CharacterDeath,
            EventType::CharacterBirth,
            EventType::CharacterGather,
            EventType::CharacterEat,
            EventType::CharacterMove,
            EventType::CharacterFlee,
            EventType::CharacterActionRest,
            EventType::CharacterBuildHouse,
            EventType::TerritoryInvasion,
            EventType::TerritoryConquered,
            EventType::MissionCompleted,
            EventType::MissionFailed,
            EventType::GlobalEventEnded,
            EventType::AiDecision,
        ]
    }
}

/// Coarse grouping used by dashboards and reporting jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    Combat,
    Resource,
    Life,
    Movement,
    Build,
    Ai,
    Other,
}

/// Identity of an agent as recorded on an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActorRef {
    pub id: AgentId,
    pub species_id: SpeciesId,
    pub clan_id: Option<ClanId>,
}

impl ActorRef {
    pub fn new(id: AgentId, species_id: SpeciesId, clan_id: Option<ClanId>) -> Self {
        Self {
            id,
            species_id,
            clan_id,
        }
    }
}

/// A map position attached to an event.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventLocation {
    pub x: f64,
    pub y: f64,
}

/// A complete simulation event.
///
/// Events are created during the decide and resolve phases with an empty id;
/// the id is assigned when the tick is persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    /// Unique identifier, assigned at persist time
    pub event_id: String,
    pub world_id: WorldId,
    /// When the event occurred
    pub timestamp: SimTimestamp,
    pub event_type: EventType,
    pub event_category: EventCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_species_id: Option<SpeciesId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_clan_id: Option<ClanId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_id: Option<AgentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_species_id: Option<SpeciesId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_clan_id: Option<ClanId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resource_type_id: Option<ResourceTypeId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<EventLocation>,
    /// Event-type specific details
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl Event {
    /// Sets the event id.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.event_id = id.into();
        self
    }

    /// Returns true once an id has been assigned.
    pub fn has_id(&self) -> bool {
        !self.event_id.is_empty()
    }

    /// Reads a payload field as a string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// Reads a payload field as a float.
    pub fn payload_f64(&self, key: &str) -> Option<f64> {
        self.payload.get(key).and_then(|v| v.as_f64())
    }

    /// Serializes the event to a JSON line (for JSONL format).
    pub fn to_jsonl(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Deserializes an event from a JSON line.
    pub fn from_jsonl(line: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(line)
    }
}

/// Generates a fresh random event id.
pub fn generate_event_id() -> String {
    format!("evt_{}", uuid::Uuid::new_v4().simple())
}

/// Builder for creating events with a fluent API.
///
/// # Example
///
/// ```
/// use sim_events::*;
///
/// let event = EventBuilder::new(EventType::CharacterEat)
///     .actor(ActorRef::new(AgentId(1), SpeciesId(2), Some(ClanId(3))))
///     .location(10.0, 20.0)
///     .payload(serde_json::json!({ "hunger_after": 30.0 }))
///     .build(WorldId(1), SimTimestamp::from_tick(5));
/// assert_eq!(event.event_category, EventCategory::Resource);
/// ```
#[derive(Debug, Clone)]
pub struct EventBuilder {
    event_type: EventType,
    actor: Option<ActorRef>,
    target: Option<ActorRef>,
    resource_type_id: Option<ResourceTypeId>,
    location: Option<EventLocation>,
    payload: serde_json::Value,
}

impl EventBuilder {
    /// Creates a new EventBuilder for the given event type.
    pub fn new(event_type: EventType) -> Self {
        Self {
            event_type,
            actor: None,
            target: None,
            resource_type_id: None,
            location: None,
            payload: serde_json::Value::Null,
        }
    }

    /// Returns the event type being built.
    pub fn event_type(&self) -> EventType {
        self.event_type
    }

    /// Sets the acting agent.
    pub fn actor(mut self, actor: ActorRef) -> Self {
        self.actor = Some(actor);
        self
    }

    /// Sets the target agent.
    pub fn target(mut self, target: ActorRef) -> Self {
        self.target = Some(target);
        self
    }

    /// Sets the resource type involved.
    pub fn resource(mut self, resource_type_id: ResourceTypeId) -> Self {
        self.resource_type_id = Some(resource_type_id);
        self
    }

    /// Sets the location.
    pub fn location(mut self, x: f64, y: f64) -> Self {
        self.location = Some(EventLocation { x, y });
        self
    }

    /// Sets the payload.
    pub fn payload(mut self, payload: serde_json::Value) -> Self {
        self.payload = payload;
        self
    }

    /// Builds the Event with an unassigned id.
    pub fn build(self, world_id: WorldId, timestamp: SimTimestamp) -> Event {
        Event {
            event_id: String::new(),
            world_id,
            timestamp,
            event_type: self.event_type,
            event_category: self.event_type.category(),
            actor_id: self.actor.map(|a| a.id),
            actor_species_id: self.actor.map(|a| a.species_id),
            actor_clan_id: self.actor.and_then(|a| a.clan_id),
            target_id: self.target.map(|t| t.id),
            target_species_id: self.target.map(|t| t.species_id),
            target_clan_id: self.target.and_then(|t| t.clan_id),
            resource_type_id: self.resource_type_id,
            location: self.location,
            payload: self.payload,
        }
    }
}
