//! Agent Spawning
//!
//! Spawns clan members with randomized vitals and personality inside their
//! home territory.

use rand::rngs::SmallRng;
use rand::seq::SliceRandom;
use rand::Rng;
use std::collections::BTreeMap;

use sim_events::{AgentId, ClanId, WorldId};

use crate::components::{Agent, Gender, Personality};
use crate::store::InMemoryStore;

use super::clans::ClanSeed;
use super::world::random_point;

const NAMES: &[&str] = &[
    "Thorgar", "Elara", "Roric", "Lirael", "Grak", "Sylas", "Faelan", "Borin", "Seraphina", "Zog",
    "Morg", "Kael",
];

/// Generate a personality with every trait in [25, 75]
fn generate_personality(rng: &mut SmallRng) -> Personality {
    let mut roll = || f64::from(rng.gen_range(25u8..=75));
    Personality {
        bravery: roll(),
        caution: roll(),
        sociability: roll(),
        greed: roll(),
        intelligence: roll(),
    }
}

/// Spawn the members of one clan, returning the next free agent id
pub fn spawn_clan_agents(
    store: &mut InMemoryStore,
    world_id: WorldId,
    clan: &ClanSeed,
    clan_name: &str,
    first_id: u64,
    rng: &mut SmallRng,
) -> u64 {
    let Some(bounds) = store.get_territory(clan.home).map(|t| t.bounds) else {
        return first_id;
    };
    let Some(base_health) = store.get_species(clan.species_id).map(|s| s.base_health) else {
        return first_id;
    };
    let surname = clan_name.split(' ').last().unwrap_or(clan_name);

    let mut next_id = first_id;
    for _ in 0..clan.members {
        let first = NAMES.choose(rng).copied().unwrap_or("Nameless");
        let gender = if rng.gen_bool(0.5) {
            Gender::Male
        } else {
            Gender::Female
        };
        let position = random_point(&bounds, rng);
        let hunger = f64::from(rng.gen_range(0u8..=40));
        let energy = f64::from(rng.gen_range(80u8..=100));
        let agent = Agent::new(
            AgentId(next_id),
            world_id,
            format!("{} {}", first, surname),
            clan.species_id,
            position,
            base_health,
        )
        .with_clan(clan.id)
        .with_gender(gender)
        .with_vitals(hunger, energy, 0)
        .with_personality(generate_personality(rng));
        store.insert_agent(agent);
        next_id += 1;
    }
    next_id
}

/// Spawn every seeded clan
pub fn spawn_all_agents(
    store: &mut InMemoryStore,
    world_id: WorldId,
    clans: &[ClanSeed],
    rng: &mut SmallRng,
) {
    let mut next_id = 1;
    for clan in clans {
        let name = store
            .clans_in(world_id)
            .find(|c| c.id == clan.id)
            .map(|c| c.name.clone())
            .unwrap_or_default();
        next_id = spawn_clan_agents(store, world_id, clan, &name, next_id, rng);
    }
}

/// Population of a freshly seeded world
#[derive(Debug, Default)]
pub struct SpawnSummary {
    pub total_agents: usize,
    pub by_clan: BTreeMap<ClanId, usize>,
}

/// Count alive agents per clan
pub fn get_spawn_summary(store: &InMemoryStore, world_id: WorldId) -> SpawnSummary {
    let mut summary = SpawnSummary::default();
    for agent in store.agents_in(world_id).filter(|a| a.is_alive()) {
        summary.total_agents += 1;
        if let Some(clan) = agent.clan_id {
            *summary.by_clan.entry(clan).or_insert(0) += 1;
        }
    }
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::setup::{create_clans, create_species, create_world_map, SHARPTOOTH, VALMOR};
    use rand::SeedableRng;

    #[test]
    fn test_spawn_counts_and_ranges() {
        let mut store = InMemoryStore::new();
        let map = create_world_map(&mut store, WorldId(1));
        create_species(&mut store);
        let clans = create_clans(&mut store, WorldId(1), &map);
        let mut rng = SmallRng::seed_from_u64(11);
        spawn_all_agents(&mut store, WorldId(1), &clans, &mut rng);

        let summary = get_spawn_summary(&store, WorldId(1));
        assert_eq!(summary.total_agents, 60);
        assert_eq!(summary.by_clan[&SHARPTOOTH], 12);
        assert_eq!(summary.by_clan[&VALMOR], 8);

        let valmor_home = store.get_territory(map["valmor"]).unwrap().bounds;
        for agent in store.agents_in(WorldId(1)) {
            assert!((0.0..=40.0).contains(&agent.vitals.hunger));
            assert!((80.0..=100.0).contains(&agent.vitals.energy));
            assert!((25.0..=75.0).contains(&agent.personality.bravery));
            if agent.clan_id == Some(VALMOR) {
                assert!(valmor_home.contains(&agent.position));
                assert!(agent.name.ends_with(" Valmor"));
            }
        }
    }

    #[test]
    fn test_ids_are_contiguous() {
        let mut store = InMemoryStore::new();
        let map = create_world_map(&mut store, WorldId(1));
        create_species(&mut store);
        let clans = create_clans(&mut store, WorldId(1), &map);
        let mut rng = SmallRng::seed_from_u64(1);
        spawn_all_agents(&mut store, WorldId(1), &clans, &mut rng);

        let ids: Vec<u64> = store.agents_in(WorldId(1)).map(|a| a.id.get()).collect();
        assert_eq!(ids, (1..=60).collect::<Vec<_>>());
    }
}
