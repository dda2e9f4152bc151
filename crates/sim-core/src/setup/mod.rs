//! World Setup
//!
//! Seeds the demo scenario: species, resources, territories, clans, agents
//! and missions.

pub mod agents;
pub mod clans;
pub mod world;

pub use agents::*;
pub use clans::*;
pub use world::*;

use rand::rngs::SmallRng;
use rand::SeedableRng;
use sim_events::WorldId;

use crate::store::InMemoryStore;

/// Id of the single demo world.
pub const DEMO_WORLD: WorldId = WorldId(1);

/// Seeds the whole demo scenario into `store` and returns its world id.
pub fn seed_demo_world(store: &mut InMemoryStore, seed: u64) -> WorldId {
    let mut rng = SmallRng::seed_from_u64(seed);

    let map = create_world_map(store, DEMO_WORLD);
    create_species(store);
    create_resource_types(store);
    create_resource_nodes(store, DEMO_WORLD, &map, &mut rng);

    let clans = create_clans(store, DEMO_WORLD, &map);
    spawn_all_agents(store, DEMO_WORLD, &clans, &mut rng);
    create_missions(store, DEMO_WORLD, &clans, &map);

    DEMO_WORLD
}
