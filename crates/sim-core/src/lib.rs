//! Clan World Simulation Engine
//!
//! Tick-based agent simulation: agents decide in parallel against an
//! immutable snapshot, their intents are resolved into one atomic commit, and
//! clan missions are tracked against the committed state.

pub mod actions;
pub mod behavior;
pub mod components;
pub mod config;
pub mod error;
pub mod events;
pub mod mutation;
pub mod setup;
pub mod store;
pub mod systems;

#[cfg(test)]
mod testing;

pub use components::*;
pub use config::SimConfig;
pub use error::{ConfigError, DecisionError, Result, SimError, StoreError};
pub use events::EventLogger;
pub use store::{InMemoryStore, WorldStore};
pub use systems::{world_snapshot, TickEngine, TickReport};
