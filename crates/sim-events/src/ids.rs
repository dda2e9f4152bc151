//! Entity Identifiers
//!
//! Typed numeric ids for every entity the engine references. Relations between
//! entities (targets, parents, owners) are always expressed through these ids.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Returns the raw numeric id.
            pub fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "_{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }
    };
}

entity_id!(
    /// Identifies one simulation instance.
    WorldId,
    "world"
);
entity_id!(
    /// Identifies a character.
    AgentId,
    "agent"
);
entity_id!(
    /// Identifies a species template.
    SpeciesId,
    "species"
);
entity_id!(
    /// Identifies a clan.
    ClanId,
    "clan"
);
entity_id!(
    /// Identifies a territory rectangle.
    TerritoryId,
    "territory"
);
entity_id!(
    /// Identifies a resource node on the map.
    ResourceNodeId,
    "node"
);
entity_id!(
    /// Identifies a kind of resource (Wood, Berries, ...).
    ResourceTypeId,
    "resource"
);
entity_id!(
    /// Identifies a clan mission.
    MissionId,
    "mission"
);
