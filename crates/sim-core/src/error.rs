//! Error Types
//!
//! One enum per failure domain, unified under [`SimError`] for callers of the
//! tick orchestrator.

use sim_events::{AgentId, MissionId, ResourceNodeId, SpeciesId, TerritoryId, WorldId};
use thiserror::Error;

/// Failures of the storage collaborator. Always fatal to the current tick.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("world {0} not found")]
    WorldNotFound(WorldId),

    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("resource node {0} not found")]
    NodeNotFound(ResourceNodeId),

    #[error("territory {0} not found")]
    TerritoryNotFound(TerritoryId),

    #[error("mission {0} not found")]
    MissionNotFound(MissionId),

    #[error("commit rejected: {0}")]
    CommitRejected(String),

    #[error("storage backend failure: {0}")]
    Backend(String),
}

/// Failures while evaluating a single agent. Recovered by the orchestrator.
#[derive(Debug, Error)]
pub enum DecisionError {
    #[error("species {species} of agent {agent} is missing from the snapshot")]
    UnknownSpecies { agent: AgentId, species: SpeciesId },

    #[error("agent {0} is missing from the snapshot")]
    UnknownAgent(AgentId),

    #[error("decision for agent {agent} panicked: {message}")]
    Panicked { agent: AgentId, message: String },
}

/// Failures loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level error returned by engine entry points.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    #[error("worker pool error: {0}")]
    WorkerPool(#[from] rayon::ThreadPoolBuildError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SimError>;
