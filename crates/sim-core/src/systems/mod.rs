//! Simulation Systems
//!
//! The per-tick pipeline and the pure helpers it is built from.

pub mod decide;
pub mod mission;
pub mod relationship;
pub mod resolve;
pub mod snapshot;
pub mod spatial;
pub mod tick;

pub use decide::{agent_rng, decide_all, decide_one, AgentOutcome};
pub use mission::{clan_objective_positions, evaluate_missions, track_missions, MissionOutcome};
pub use relationship::Resolver;
pub use resolve::{resolve, DeathCause, Resolution};
pub use snapshot::{world_snapshot, WorldView};
pub use tick::{TickEngine, TickReport};
