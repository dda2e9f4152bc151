//! Relationship Resolver
//!
//! Maps a pair of agents to FRIEND, ENEMY or INDIFFERENT. Rules are checked in
//! priority order and the first match wins:
//!
//! 1. identity
//! 2. strong personal score
//! 3. hostile-to-all species
//! 4. same clan
//! 5. clan diplomacy
//! 6. static species relation
//! 7. indifferent
//!
//! Every lookup goes through sorted-pair keys, so the answer is symmetric.

use std::collections::BTreeMap;

use sim_events::SpeciesId;

use crate::components::{Agent, Diplomacy, RelationshipKind, RelationshipTables, Species};
use crate::config::RelationshipConfig;

/// Read-only resolver over one tick's relationship tables.
#[derive(Debug, Clone, Copy)]
pub struct Resolver<'a> {
    tables: &'a RelationshipTables,
    species: &'a BTreeMap<SpeciesId, Species>,
    friend_threshold: f64,
    enemy_threshold: f64,
}

impl<'a> Resolver<'a> {
    pub fn new(
        tables: &'a RelationshipTables,
        species: &'a BTreeMap<SpeciesId, Species>,
        config: &RelationshipConfig,
    ) -> Self {
        Self {
            tables,
            species,
            friend_threshold: config.friend_threshold,
            enemy_threshold: config.enemy_threshold,
        }
    }

    pub fn relation(&self, a: &Agent, b: &Agent) -> RelationshipKind {
        if a.id == b.id {
            return RelationshipKind::Friend;
        }

        if let Some(score) = self.tables.personal_score(a.id, b.id) {
            if score > self.friend_threshold {
                return RelationshipKind::Friend;
            }
            if score < self.enemy_threshold {
                return RelationshipKind::Enemy;
            }
        }

        if self.is_hostile_to_all(a.species_id) || self.is_hostile_to_all(b.species_id) {
            return if a.species_id == b.species_id {
                RelationshipKind::Friend
            } else {
                RelationshipKind::Enemy
            };
        }

        if let (Some(ca), Some(cb)) = (a.clan_id, b.clan_id) {
            if ca == cb {
                return RelationshipKind::Friend;
            }
            match self.tables.diplomacy(ca, cb) {
                Some(Diplomacy::War) => return RelationshipKind::Enemy,
                Some(Diplomacy::Alliance) => return RelationshipKind::Friend,
                Some(Diplomacy::Neutral) | None => {}
            }
        }

        self.tables
            .species_relation(a.species_id, b.species_id)
            .unwrap_or(RelationshipKind::Indifferent)
    }

    pub fn is_enemy(&self, a: &Agent, b: &Agent) -> bool {
        self.relation(a, b) == RelationshipKind::Enemy
    }

    pub fn is_friend(&self, a: &Agent, b: &Agent) -> bool {
        self.relation(a, b) == RelationshipKind::Friend
    }

    /// Personal score of the pair, zero when they have never interacted.
    pub fn personal_score(&self, a: &Agent, b: &Agent) -> f64 {
        self.tables.personal_score(a.id, b.id).unwrap_or(0.0)
    }

    fn is_hostile_to_all(&self, species: SpeciesId) -> bool {
        self.species.get(&species).map_or(false, |s| s.hostile_to_all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::Position;
    use proptest::prelude::*;
    use sim_events::{AgentId, ClanId, WorldId};

    const HUMAN: SpeciesId = SpeciesId(1);
    const ORC: SpeciesId = SpeciesId(2);
    const ZOMBIE: SpeciesId = SpeciesId(3);

    fn species() -> BTreeMap<SpeciesId, Species> {
        let mut map = BTreeMap::new();
        map.insert(HUMAN, Species::new(HUMAN, "Human", 100.0, 10.0));
        map.insert(ORC, Species::new(ORC, "Orc", 150.0, 18.0));
        map.insert(ZOMBIE, Species::new(ZOMBIE, "Zombie", 100.0, 10.0).hostile_to_all());
        map
    }

    fn agent(id: u64, species: SpeciesId, clan: Option<u64>) -> Agent {
        let a = Agent::new(AgentId(id), WorldId(1), "x", species, Position::default(), 100.0);
        match clan {
            Some(c) => a.with_clan(ClanId(c)),
            None => a,
        }
    }

    fn resolve(tables: &RelationshipTables, a: &Agent, b: &Agent) -> RelationshipKind {
        let species = species();
        Resolver::new(tables, &species, &RelationshipConfig::default()).relation(a, b)
    }

    #[test]
    fn test_identity_is_friend() {
        let mut tables = RelationshipTables::new();
        tables.set_personal(AgentId(1), AgentId(1), -100.0);
        let a = agent(1, ZOMBIE, Some(1));
        assert_eq!(resolve(&tables, &a, &a), RelationshipKind::Friend);
    }

    #[test]
    fn test_personal_score_overrides_clan() {
        let mut tables = RelationshipTables::new();
        tables.set_personal(AgentId(1), AgentId(2), -51.0);
        let a = agent(1, HUMAN, Some(1));
        let b = agent(2, HUMAN, Some(1));
        assert_eq!(resolve(&tables, &a, &b), RelationshipKind::Enemy);

        tables.set_personal(AgentId(1), AgentId(2), 51.0);
        tables.set_diplomacy(ClanId(1), ClanId(2), Diplomacy::War);
        let c = agent(2, HUMAN, Some(2));
        assert_eq!(resolve(&tables, &a, &c), RelationshipKind::Friend);
    }

    #[test]
    fn test_thresholds_are_exclusive() {
        let mut tables = RelationshipTables::new();
        tables.set_personal(AgentId(1), AgentId(2), 50.0);
        let a = agent(1, HUMAN, None);
        let b = agent(2, HUMAN, None);
        assert_eq!(resolve(&tables, &a, &b), RelationshipKind::Indifferent);
    }

    #[test]
    fn test_hostile_to_all_species() {
        let tables = RelationshipTables::new();
        let z1 = agent(1, ZOMBIE, None);
        let z2 = agent(2, ZOMBIE, None);
        // Sharing a clan does not tame the undead
        let h = agent(3, HUMAN, None);
        let zc = agent(4, ZOMBIE, Some(7));
        let hc = agent(5, HUMAN, Some(7));
        assert_eq!(resolve(&tables, &z1, &z2), RelationshipKind::Friend);
        assert_eq!(resolve(&tables, &z1, &h), RelationshipKind::Enemy);
        assert_eq!(resolve(&tables, &zc, &hc), RelationshipKind::Enemy);
    }

    #[test]
    fn test_clan_rules() {
        let mut tables = RelationshipTables::new();
        tables.set_diplomacy(ClanId(1), ClanId(2), Diplomacy::War);
        tables.set_diplomacy(ClanId(1), ClanId(3), Diplomacy::Alliance);
        tables.set_diplomacy(ClanId(1), ClanId(4), Diplomacy::Neutral);
        tables.set_species(HUMAN, ORC, RelationshipKind::Enemy);

        let a = agent(1, HUMAN, Some(1));
        assert_eq!(resolve(&tables, &a, &agent(2, HUMAN, Some(1))), RelationshipKind::Friend);
        assert_eq!(resolve(&tables, &a, &agent(3, HUMAN, Some(2))), RelationshipKind::Enemy);
        assert_eq!(resolve(&tables, &a, &agent(4, ORC, Some(3))), RelationshipKind::Friend);
        // Neutral falls through to the species table
        assert_eq!(resolve(&tables, &a, &agent(5, ORC, Some(4))), RelationshipKind::Enemy);
        assert_eq!(resolve(&tables, &a, &agent(6, HUMAN, Some(4))), RelationshipKind::Indifferent);
    }

    #[test]
    fn test_clanless_uses_species_table() {
        let mut tables = RelationshipTables::new();
        tables.set_species(ORC, HUMAN, RelationshipKind::Enemy);
        let a = agent(1, HUMAN, None);
        let b = agent(2, ORC, Some(1));
        assert_eq!(resolve(&tables, &a, &b), RelationshipKind::Enemy);
        assert_eq!(resolve(&tables, &a, &agent(3, HUMAN, None)), RelationshipKind::Indifferent);
    }

    fn arb_agent() -> impl Strategy<Value = Agent> {
        (1u64..6, 1u64..4, proptest::option::of(1u64..4))
            .prop_map(|(id, species, clan)| agent(id, SpeciesId(species), clan))
    }

    proptest! {
        #[test]
        fn prop_resolver_symmetric_and_reflexive(
            a in arb_agent(),
            b in arb_agent(),
            score in -100.0f64..100.0,
            war in any::<bool>(),
        ) {
            let mut tables = RelationshipTables::new();
            tables.set_personal(AgentId(1), AgentId(2), score);
            tables.set_species(HUMAN, ORC, RelationshipKind::Enemy);
            let state = if war { Diplomacy::War } else { Diplomacy::Alliance };
            tables.set_diplomacy(ClanId(1), ClanId(2), state);

            prop_assert_eq!(resolve(&tables, &a, &b), resolve(&tables, &b, &a));
            prop_assert_eq!(resolve(&tables, &a, &a), RelationshipKind::Friend);
        }
    }
}
