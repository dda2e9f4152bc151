//! Deferred Mutations
//!
//! Decisions never write world state. They append intents to a [`TickBuffer`]
//! which the resolve phase folds into a single commit after every agent has
//! been evaluated.

use sim_events::{AgentId, Event, ResourceNodeId, ResourceTypeId};

use crate::components::Position;

/// One buffered state change.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    /// Combat damage against `target`, credited to `attacker`
    Damage {
        target: AgentId,
        attacker: AgentId,
        amount: f64,
    },
    Energy {
        agent: AgentId,
        delta: f64,
    },
    Hunger {
        agent: AgentId,
        delta: f64,
    },
    /// Moves the agent; suppresses idle energy regen for the tick
    Move {
        agent: AgentId,
        to: Position,
    },
    /// Marks the tick as spent resting
    Rest {
        agent: AgentId,
    },
    Inventory {
        agent: AgentId,
        resource: ResourceTypeId,
        delta: i64,
    },
    /// Requests `amount` units from a node; settled against what remains
    Harvest {
        agent: AgentId,
        node: ResourceNodeId,
        resource: ResourceTypeId,
        amount: u32,
    },
    /// Adds to the personal score of the unordered pair
    Relationship {
        a: AgentId,
        b: AgentId,
        delta: f64,
    },
    /// Requests a child of the two parents
    Birth {
        parent_a: AgentId,
        parent_b: AgentId,
    },
}

/// Events and mutations produced by one agent's evaluation.
#[derive(Debug, Clone, Default)]
pub struct TickBuffer {
    mutations: Vec<Mutation>,
    events: Vec<Event>,
}

impl TickBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.mutations.push(mutation);
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn mutations(&self) -> &[Mutation] {
        &self.mutations
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty() && self.events.is_empty()
    }

    pub fn into_parts(self) -> (Vec<Mutation>, Vec<Event>) {
        (self.mutations, self.events)
    }
}
