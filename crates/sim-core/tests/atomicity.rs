//! A failing store must leave the world exactly as it was.

mod common;

use common::*;
use sim_core::components::{Agent, Mission, RelationshipTables, ResourceNode, ResourceType, Species, Territory, World};
use sim_core::store::{InMemoryStore, MissionUpdate, TickCommit, WorldStore};
use sim_core::{SimConfig, SimError, StoreError, TickEngine};
use sim_events::{AgentId, WorldId};

/// Delegates reads to an in-memory store and rejects every commit.
struct RejectingStore {
    inner: InMemoryStore,
    commits_attempted: usize,
}

impl WorldStore for RejectingStore {
    fn world(&self, world: WorldId) -> Result<World, StoreError> {
        self.inner.world(world)
    }

    fn alive_agents(&self, world: WorldId) -> Result<Vec<Agent>, StoreError> {
        self.inner.alive_agents(world)
    }

    fn agent(&self, id: AgentId) -> Result<Option<Agent>, StoreError> {
        self.inner.agent(id)
    }

    fn species(&self) -> Result<Vec<Species>, StoreError> {
        self.inner.species()
    }

    fn resource_types(&self) -> Result<Vec<ResourceType>, StoreError> {
        self.inner.resource_types()
    }

    fn territories(&self, world: WorldId) -> Result<Vec<Territory>, StoreError> {
        self.inner.territories(world)
    }

    fn undepleted_nodes(&self, world: WorldId) -> Result<Vec<ResourceNode>, StoreError> {
        self.inner.undepleted_nodes(world)
    }

    fn relationship_tables(&self, world: WorldId) -> Result<RelationshipTables, StoreError> {
        self.inner.relationship_tables(world)
    }

    fn active_missions(&self, world: WorldId) -> Result<Vec<Mission>, StoreError> {
        self.inner.active_missions(world)
    }

    fn next_agent_id(&self) -> Result<AgentId, StoreError> {
        self.inner.next_agent_id()
    }

    fn commit(&mut self, _commit: TickCommit) -> Result<(), StoreError> {
        self.commits_attempted += 1;
        Err(StoreError::Backend("disk full".into()))
    }

    fn apply_missions(&mut self, world: WorldId, update: MissionUpdate) -> Result<(), StoreError> {
        self.inner.apply_missions(world, update)
    }
}

#[test]
fn test_failed_commit_does_not_advance_tick() {
    let mut f = Fixture::new();
    let knight = f.agent(KNIGHT, 100.0, 100.0, |a| a);
    let peasant = f.agent(PEASANT, 110.0, 100.0, |mut a| {
        a.health = 20.0;
        a
    });
    let node = f.node(BERRIES, 600.0, 600.0, 10);
    let before_peasant = f.get(peasant);

    let mut store = RejectingStore {
        inner: f.store,
        commits_attempted: 0,
    };
    let engine = TickEngine::sequential(SimConfig::default()).unwrap();
    let err = engine.process_tick(&mut store, WORLD).unwrap_err();

    assert!(matches!(err, SimError::Store(StoreError::Backend(_))));
    assert_eq!(store.commits_attempted, 1);
    assert_eq!(store.inner.world(WORLD).unwrap().current_tick, 0);
    assert!(store.inner.events().is_empty());
    let after = store.inner.get_agent(peasant).unwrap();
    assert_eq!(after.health, before_peasant.health);
    assert_eq!(after.position, before_peasant.position);
    assert_eq!(store.inner.get_agent(knight).unwrap().stats.damage_dealt, 0.0);
    assert_eq!(store.inner.get_node(node).unwrap().quantity, 10);

    // The same state still ticks normally once the store accepts writes
    let report = engine.process_tick(&mut store.inner, WORLD).unwrap();
    assert_eq!(report.tick, 0);
    assert_eq!(store.inner.world(WORLD).unwrap().current_tick, 1);
    assert_eq!(store.inner.get_agent(peasant).unwrap().health, 5.0);
}

#[test]
fn test_missing_world_aborts_before_decide() {
    let mut store = InMemoryStore::new();
    let engine = TickEngine::sequential(SimConfig::default()).unwrap();
    let err = engine.process_tick(&mut store, WorldId(9)).unwrap_err();
    assert!(matches!(err, SimError::Store(StoreError::WorldNotFound(WorldId(9)))));
    assert!(store.events().is_empty());
}
