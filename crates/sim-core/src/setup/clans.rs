//! Clan Setup
//!
//! Creates the clans with their home territories, the initial diplomacy and
//! one themed mission per clan.

use sim_events::{ClanId, MissionId, SpeciesId, TerritoryId, WorldId};

use crate::components::{Clan, Diplomacy, Mission, ObjectiveKind};
use crate::store::InMemoryStore;

use super::world::*;

/// A seeded clan and where its members spawn.
#[derive(Debug, Clone)]
pub struct ClanSeed {
    pub id: ClanId,
    pub species_id: SpeciesId,
    pub home: TerritoryId,
    pub members: usize,
}

pub const VALMOR: ClanId = ClanId(1);
pub const IRONHAMMER: ClanId = ClanId(2);
pub const AETHERION_COURT: ClanId = ClanId(3);
pub const ELYNDOR_SWARM: ClanId = ClanId(4);
pub const SHARPTOOTH: ClanId = ClanId(5);
pub const BONECRUSHER: ClanId = ClanId(6);
pub const CRAWLING_HORDE: ClanId = ClanId(7);

/// Create all clans, give each its home territory and set initial diplomacy
pub fn create_clans(store: &mut InMemoryStore, world_id: WorldId, map: &TerritoryMap) -> Vec<ClanSeed> {
    // (id, name, species, home territory, members)
    let clans = [
        (VALMOR, "Kingdom of Valmor", HUMAN, "valmor", 8),
        (IRONHAMMER, "Ironhammer Clan", DWARF, "durvak", 8),
        (AETHERION_COURT, "Court of Aetherion", ELF, "aetherion", 8),
        (ELYNDOR_SWARM, "Swarm of Elyndor", FAIRY, "elyndor", 8),
        (SHARPTOOTH, "Sharptooth Legion", ORC, "snagul", 12),
        (BONECRUSHER, "Bonecrusher Clan", TROLL, "snagul", 8),
        (CRAWLING_HORDE, "The Crawling Horde", ZOMBIE, "graveyard", 8),
    ];

    let mut seeds = Vec::with_capacity(clans.len());
    for (id, name, species_id, home_key, members) in clans {
        let Some(&home) = map.get(home_key) else {
            continue;
        };
        store.insert_clan(Clan::new(id, world_id, name, species_id));
        if let Some(mut territory) = store.get_territory(home).cloned() {
            territory.owner = Some(id);
            store.insert_territory(territory);
        }
        seeds.push(ClanSeed {
            id,
            species_id,
            home,
            members,
        });
    }

    store.set_diplomacy(IRONHAMMER, AETHERION_COURT, Diplomacy::War);
    store.set_diplomacy(SHARPTOOTH, BONECRUSHER, Diplomacy::Alliance);

    seeds
}

/// Assign one themed mission to each clan that has a goal.
///
/// Must run after agents are spawned: the troll mission targets a Valmor
/// member.
pub fn create_missions(store: &mut InMemoryStore, world_id: WorldId, clans: &[ClanSeed], map: &TerritoryMap) {
    let seeded = |clan: ClanId| clans.iter().any(|c| c.id == clan);
    let mut next_id = 1;
    let mut add = |store: &mut InMemoryStore, clan: ClanId, name: &str, objectives: Vec<ObjectiveKind>| {
        if !seeded(clan) || objectives.is_empty() {
            return;
        }
        store.insert_mission(Mission::new(MissionId(next_id), world_id, clan, name, objectives));
        next_id += 1;
    };

    add(
        store,
        IRONHAMMER,
        "The Great Forge of Durvak",
        vec![
            ObjectiveKind::GatherResource {
                resource_type_id: IRON_ORE,
                target: 50,
            },
            ObjectiveKind::GatherResource {
                resource_type_id: WOOD,
                target: 25,
            },
        ],
    );
    add(
        store,
        VALMOR,
        "Raise the Walls of Valmor",
        vec![
            ObjectiveKind::GatherResource {
                resource_type_id: WOOD,
                target: 100,
            },
            ObjectiveKind::GatherResource {
                resource_type_id: STONE,
                target: 80,
            },
        ],
    );
    let conquer = |key: &str| {
        map.get(key)
            .map(|&territory_id| ObjectiveKind::ConquerTerritory { territory_id })
            .into_iter()
            .collect::<Vec<_>>()
    };
    add(store, AETHERION_COURT, "Sabotage in the Mines", conquer("durvak"));
    add(store, SHARPTOOTH, "The Great Hunt", conquer("hills"));

    let victim = store
        .agents_in(world_id)
        .filter(|a| a.clan_id == Some(VALMOR))
        .map(|a| a.id)
        .min();
    let hunt = victim
        .map(|agent_id| ObjectiveKind::DefeatCharacter { agent_id })
        .into_iter()
        .collect();
    add(store, BONECRUSHER, "Crush the Little Ones!", hunt);
}
