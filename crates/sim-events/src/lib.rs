//! Shared event types and serialization for the clan world simulation.
//!
//! This crate contains pure data structures with no simulation logic.
//! It is a dependency for the engine and for any consumer of its output.

pub mod event;
pub mod ids;
pub mod snapshot;
pub mod timestamp;

// Re-export timestamp types
pub use timestamp::{ParseDateError, SimDate, SimTimestamp, TICKS_PER_YEAR};

// Re-export ids
pub use ids::{
    AgentId, ClanId, MissionId, ResourceNodeId, ResourceTypeId, SpeciesId, TerritoryId, WorldId,
};

// Re-export event types
pub use event::*;

// Re-export snapshot types
pub use snapshot::{
    generate_snapshot_id, AgentSnapshot, MissionSnapshot, ObjectiveSnapshot, PopulationSnapshot,
    ResourceNodeSnapshot, TerritorySnapshot, WorldSnapshot,
};
