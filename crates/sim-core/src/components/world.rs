//! World Components
//!
//! The world row, map geometry, territories and resource nodes.

use serde::{Deserialize, Serialize};

use sim_events::{ClanId, ResourceNodeId, ResourceTypeId, TerritoryId, WorldId};

/// A point on the map.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance_to(&self, other: &Position) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// An axis-aligned rectangle, anchored at its top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Inclusive on all edges.
    pub fn contains(&self, p: &Position) -> bool {
        p.x >= self.x && p.x <= self.x + self.width && p.y >= self.y && p.y <= self.y + self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// True when the two rectangles share any interior area.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.x + other.width
            && other.x < self.x + self.width
            && self.y < other.y + other.height
            && other.y < self.y + self.height
    }
}

/// A world-wide condition with a limited duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalEvent {
    pub name: String,
    pub remaining_ticks: u64,
}

/// One simulation instance.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct World {
    pub id: WorldId,
    pub name: String,
    pub map_width: f64,
    pub map_height: f64,
    pub current_tick: u64,
    #[serde(default)]
    pub global_event: Option<GlobalEvent>,
}

impl World {
    pub fn new(id: WorldId, name: impl Into<String>, map_width: f64, map_height: f64) -> Self {
        Self {
            id,
            name: name.into(),
            map_width,
            map_height,
            current_tick: 0,
            global_event: None,
        }
    }

    pub fn bounds(&self) -> Rect {
        Rect::new(0.0, 0.0, self.map_width, self.map_height)
    }
}

/// A claimable region of the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub id: TerritoryId,
    pub world_id: WorldId,
    pub name: String,
    pub bounds: Rect,
    #[serde(default)]
    pub owner: Option<ClanId>,
}

impl Territory {
    pub fn contains(&self, p: &Position) -> bool {
        self.bounds.contains(p)
    }

    pub fn center(&self) -> Position {
        self.bounds.center()
    }
}

/// Broad resource grouping used by the AI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResourceCategory {
    Food,
    Material,
}

/// A kind of resource (Berries, Wood, ...).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceType {
    pub id: ResourceTypeId,
    pub name: String,
    pub category: ResourceCategory,
}

/// Names of the materials consumed by building.
pub mod material_names {
    pub const WOOD: &str = "Wood";
    pub const STONE: &str = "Stone";
}

/// A harvestable deposit on the map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResourceNode {
    pub id: ResourceNodeId,
    pub world_id: WorldId,
    pub resource_type_id: ResourceTypeId,
    pub position: Position,
    pub quantity: u32,
    #[serde(default)]
    pub is_depleted: bool,
}

impl ResourceNode {
    pub fn is_available(&self) -> bool {
        !self.is_depleted && self.quantity > 0
    }
}
