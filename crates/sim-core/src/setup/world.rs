//! World Map Setup
//!
//! Creates the map, species, resource types and resource nodes.

use rand::rngs::SmallRng;
use rand::Rng;
use std::collections::BTreeMap;

use sim_events::{ResourceNodeId, ResourceTypeId, SpeciesId, TerritoryId, WorldId};

use crate::components::{
    material_names, Position, Rect, RelationshipKind, ResourceCategory, ResourceNode, ResourceType,
    Species, Territory, World,
};
use crate::store::InMemoryStore;

pub const MAP_SIZE: f64 = 1000.0;

// Species
pub const DWARF: SpeciesId = SpeciesId(1);
pub const HUMAN: SpeciesId = SpeciesId(2);
pub const ELF: SpeciesId = SpeciesId(3);
pub const FAIRY: SpeciesId = SpeciesId(4);
pub const GOBLIN: SpeciesId = SpeciesId(5);
pub const ORC: SpeciesId = SpeciesId(6);
pub const TROLL: SpeciesId = SpeciesId(7);
pub const ZOMBIE: SpeciesId = SpeciesId(8);

// Resource types
pub const FISH: ResourceTypeId = ResourceTypeId(1);
pub const BERRIES: ResourceTypeId = ResourceTypeId(2);
pub const IRON_ORE: ResourceTypeId = ResourceTypeId(3);
pub const WOOD: ResourceTypeId = ResourceTypeId(4);
pub const STONE: ResourceTypeId = ResourceTypeId(5);

/// Territory ids by their short key.
pub type TerritoryMap = BTreeMap<&'static str, TerritoryId>;

/// Create the world row and its nine territories
pub fn create_world_map(store: &mut InMemoryStore, world_id: WorldId) -> TerritoryMap {
    store.insert_world(World::new(world_id, "Default World", MAP_SIZE, MAP_SIZE));

    // (key, name, start_x, end_x, start_y, end_y)
    let territories: [(&'static str, &str, f64, f64, f64, f64); 9] = [
        ("valmor", "Valmor", 350.0, 650.0, 350.0, 650.0),
        ("durvak", "Durvak Mines", 0.0, 250.0, 0.0, 250.0),
        ("aetherion", "Aetherion Forest", 750.0, 1000.0, 650.0, 900.0),
        ("snagul", "Snagul Swamp", 0.0, 300.0, 700.0, 1000.0),
        ("graveyard", "Haunted Graveyard", 750.0, 1000.0, 0.0, 250.0),
        ("elyndor", "Lake Elyndor", 300.0, 700.0, 0.0, 300.0),
        ("hills", "Rocky Hills", 0.0, 300.0, 300.0, 650.0),
        ("grove", "Ancient Grove", 700.0, 1000.0, 300.0, 600.0),
        ("plains", "Central Plains", 300.0, 700.0, 700.0, 1000.0),
    ];

    let mut map = TerritoryMap::new();
    for (i, (key, name, x0, x1, y0, y1)) in territories.into_iter().enumerate() {
        let id = TerritoryId(i as u64 + 1);
        store.insert_territory(Territory {
            id,
            world_id,
            name: name.to_string(),
            bounds: Rect::new(x0, y0, x1 - x0, y1 - y0),
            owner: None,
        });
        map.insert(key, id);
    }
    map
}

/// Create the eight species and the relations between them
pub fn create_species(store: &mut InMemoryStore) {
    let species = [
        Species::new(DWARF, "Dwarf", 120.0, 15.0).with_lifespan_years(250),
        Species::new(HUMAN, "Human", 100.0, 10.0).with_lifespan_years(80),
        Species::new(ELF, "Elf", 80.0, 12.0).with_lifespan_years(700),
        Species::new(FAIRY, "Fairy", 60.0, 8.0).with_lifespan_years(150),
        Species::new(GOBLIN, "Goblin", 70.0, 7.0).with_lifespan_years(40),
        Species::new(ORC, "Orc", 150.0, 18.0).with_lifespan_years(50),
        Species::new(TROLL, "Troll", 200.0, 25.0).with_lifespan_years(120),
        // Undead never age out and attack everyone
        Species::new(ZOMBIE, "Zombie", 100.0, 10.0).hostile_to_all(),
    ];
    for s in species {
        store.insert_species(s);
    }

    use RelationshipKind::*;
    let relations = [
        (DWARF, HUMAN, Friend),
        (DWARF, ELF, Enemy),
        (DWARF, FAIRY, Enemy),
        (DWARF, ORC, Enemy),
        (DWARF, GOBLIN, Enemy),
        (DWARF, TROLL, Enemy),
        (HUMAN, ELF, Friend),
        (HUMAN, FAIRY, Friend),
        (HUMAN, ORC, Enemy),
        (HUMAN, TROLL, Enemy),
        (HUMAN, GOBLIN, Enemy),
        (FAIRY, ELF, Indifferent),
        (FAIRY, TROLL, Enemy),
        (FAIRY, ORC, Enemy),
        (FAIRY, GOBLIN, Enemy),
        (ELF, ORC, Enemy),
        (ELF, TROLL, Enemy),
        (ELF, GOBLIN, Enemy),
        (ORC, TROLL, Friend),
        (ORC, GOBLIN, Friend),
        (GOBLIN, TROLL, Friend),
    ];
    for (a, b, kind) in relations {
        store.set_species_relation(a, b, kind);
    }
}

/// Create the five resource types
pub fn create_resource_types(store: &mut InMemoryStore) {
    let types = [
        (FISH, "Fish", ResourceCategory::Food),
        (BERRIES, "Wild Berries", ResourceCategory::Food),
        (IRON_ORE, "Iron Ore", ResourceCategory::Material),
        (WOOD, material_names::WOOD, ResourceCategory::Material),
        (STONE, material_names::STONE, ResourceCategory::Material),
    ];
    for (id, name, category) in types {
        store.insert_resource_type(ResourceType {
            id,
            name: name.to_string(),
            category,
        });
    }
}

/// Scatter resource nodes inside their territories
pub fn create_resource_nodes(
    store: &mut InMemoryStore,
    world_id: WorldId,
    map: &TerritoryMap,
    rng: &mut SmallRng,
) {
    // (territory, resource, node count, average quantity)
    let nodes = [
        ("valmor", BERRIES, 5, 20),
        ("valmor", STONE, 8, 15),
        ("durvak", IRON_ORE, 10, 30),
        ("durvak", STONE, 15, 20),
        ("aetherion", WOOD, 15, 15),
        ("aetherion", BERRIES, 8, 20),
        ("elyndor", FISH, 12, 25),
        ("hills", BERRIES, 10, 15),
        ("hills", IRON_ORE, 3, 10),
        ("grove", WOOD, 20, 10),
        ("grove", BERRIES, 5, 15),
        ("plains", BERRIES, 15, 10),
    ];

    let mut next_id = 1;
    for (key, resource, count, avg_qty) in nodes {
        let Some(bounds) = map
            .get(key)
            .and_then(|id| store.get_territory(*id))
            .map(|t| t.bounds)
        else {
            continue;
        };
        for _ in 0..count {
            let quantity = rng.gen_range(avg_qty / 2..=avg_qty * 3 / 2);
            store.insert_node(ResourceNode {
                id: ResourceNodeId(next_id),
                world_id,
                resource_type_id: resource,
                position: random_point(&bounds, rng),
                quantity,
                is_depleted: false,
            });
            next_id += 1;
        }
    }
}

/// A uniformly random point inside `bounds`.
pub fn random_point(bounds: &Rect, rng: &mut SmallRng) -> Position {
    Position::new(
        bounds.x + rng.gen::<f64>() * bounds.width,
        bounds.y + rng.gen::<f64>() * bounds.height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::WorldStore;
    use rand::SeedableRng;

    #[test]
    fn test_territories_do_not_overlap() {
        let mut store = InMemoryStore::new();
        create_world_map(&mut store, WorldId(1));
        let territories = store.territories(WorldId(1)).unwrap();
        for (i, a) in territories.iter().enumerate() {
            for b in &territories[i + 1..] {
                assert!(!a.bounds.overlaps(&b.bounds), "{} overlaps {}", a.name, b.name);
            }
        }
    }

    #[test]
    fn test_nodes_inside_their_territory() {
        let mut store = InMemoryStore::new();
        let map = create_world_map(&mut store, WorldId(1));
        create_resource_types(&mut store);
        let mut rng = SmallRng::seed_from_u64(3);
        create_resource_nodes(&mut store, WorldId(1), &map, &mut rng);

        let nodes = store.undepleted_nodes(WorldId(1)).unwrap();
        assert_eq!(nodes.len(), 126);
        let territories = store.territories(WorldId(1)).unwrap();
        for node in &nodes {
            assert!(territories.iter().any(|t| t.contains(&node.position)));
            assert!(node.quantity >= 5);
        }
    }

    #[test]
    fn test_species_relations_symmetric() {
        let mut store = InMemoryStore::new();
        store.insert_world(World::new(WorldId(1), "w", MAP_SIZE, MAP_SIZE));
        create_species(&mut store);
        let tables = store.relationship_tables(WorldId(1)).unwrap();
        assert_eq!(tables.species_relation(HUMAN, ORC), Some(RelationshipKind::Enemy));
        assert_eq!(tables.species_relation(ORC, HUMAN), Some(RelationshipKind::Enemy));
        assert_eq!(tables.species_relation(TROLL, ORC), Some(RelationshipKind::Friend));
        assert_eq!(tables.species_relation(HUMAN, HUMAN), None);
    }
}
