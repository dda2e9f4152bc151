//! Social Components
//!
//! Relationship tables read by the resolver: static species relations, clan
//! diplomacy and personal scores. Every table is keyed by a sorted id pair so a
//! lookup gives the same answer from either side.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use sim_events::{AgentId, ClanId, SpeciesId};

use super::clan::Diplomacy;

/// How one agent regards another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RelationshipKind {
    Friend,
    Enemy,
    Indifferent,
}

/// Orders a pair so that `(a, b)` and `(b, a)` share one key.
pub fn pair_key<T: Ord>(a: T, b: T) -> (T, T) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RelationshipTables {
    species: BTreeMap<(SpeciesId, SpeciesId), RelationshipKind>,
    clans: BTreeMap<(ClanId, ClanId), Diplomacy>,
    personal: BTreeMap<(AgentId, AgentId), f64>,
}

impl RelationshipTables {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_species(&mut self, a: SpeciesId, b: SpeciesId, kind: RelationshipKind) {
        self.species.insert(pair_key(a, b), kind);
    }

    pub fn set_diplomacy(&mut self, a: ClanId, b: ClanId, state: Diplomacy) {
        self.clans.insert(pair_key(a, b), state);
    }

    pub fn set_personal(&mut self, a: AgentId, b: AgentId, score: f64) {
        self.personal.insert(pair_key(a, b), score);
    }

    pub fn species_relation(&self, a: SpeciesId, b: SpeciesId) -> Option<RelationshipKind> {
        self.species.get(&pair_key(a, b)).copied()
    }

    pub fn diplomacy(&self, a: ClanId, b: ClanId) -> Option<Diplomacy> {
        self.clans.get(&pair_key(a, b)).copied()
    }

    pub fn personal_score(&self, a: AgentId, b: AgentId) -> Option<f64> {
        self.personal.get(&pair_key(a, b)).copied()
    }

    /// Clans at war with `clan`, in id order.
    pub fn enemies_of(&self, clan: ClanId) -> Vec<ClanId> {
        self.clans
            .iter()
            .filter(|(_, state)| **state == Diplomacy::War)
            .filter_map(|((a, b), _)| {
                if *a == clan {
                    Some(*b)
                } else if *b == clan {
                    Some(*a)
                } else {
                    None
                }
            })
            .collect()
    }
}
