//! Test fixtures: a small world builder and a way to run nodes against it.

use rand::rngs::SmallRng;
use rand::SeedableRng;
use sim_events::{AgentId, ClanId, ResourceNodeId, ResourceTypeId, SpeciesId, TerritoryId, WorldId};

use crate::behavior::{Blackboard, TickContext};
use crate::components::{
    Agent, Clan, Diplomacy, Position, Rect, RelationshipKind, ResourceCategory, ResourceNode,
    ResourceType, Species, Territory, World,
};
use crate::config::SimConfig;
use crate::mutation::TickBuffer;
use crate::store::InMemoryStore;
use crate::systems::snapshot::WorldView;

pub const WORLD: WorldId = WorldId(1);
pub const HUMAN: SpeciesId = SpeciesId(1);
pub const ORC: SpeciesId = SpeciesId(2);
pub const BERRIES: ResourceTypeId = ResourceTypeId(1);
pub const WOOD: ResourceTypeId = ResourceTypeId(2);
pub const STONE: ResourceTypeId = ResourceTypeId(3);
pub const CLAN_RED: ClanId = ClanId(1);
pub const CLAN_BLUE: ClanId = ClanId(2);

/// A 1000x1000 world with humans, orcs, berries, wood, stone and two clans.
pub struct Scenario {
    pub store: InMemoryStore,
    pub config: SimConfig,
    next_agent: u64,
    next_node: u64,
    next_territory: u64,
}

impl Scenario {
    pub fn new() -> Self {
        let mut store = InMemoryStore::new();
        store.insert_world(World::new(WORLD, "Fixture", 1000.0, 1000.0));
        store.insert_species(Species::new(HUMAN, "Human", 100.0, 10.0).with_lifespan_years(90));
        store.insert_species(Species::new(ORC, "Orc", 120.0, 18.0).with_lifespan_years(60));
        for (id, name, category) in [
            (BERRIES, "Berries", ResourceCategory::Food),
            (WOOD, "Wood", ResourceCategory::Material),
            (STONE, "Stone", ResourceCategory::Material),
        ] {
            store.insert_resource_type(ResourceType {
                id,
                name: name.into(),
                category,
            });
        }
        store.insert_clan(Clan::new(CLAN_RED, WORLD, "Red", HUMAN));
        store.insert_clan(Clan::new(CLAN_BLUE, WORLD, "Blue", HUMAN));
        Self {
            store,
            config: SimConfig::default(),
            next_agent: 1,
            next_node: 1,
            next_territory: 1,
        }
    }

    /// Adds a full-health agent of `species`, letting `edit` adjust it first.
    pub fn add_agent(
        &mut self,
        species: SpeciesId,
        clan: Option<ClanId>,
        position: Position,
        edit: impl FnOnce(Agent) -> Agent,
    ) -> AgentId {
        let id = AgentId(self.next_agent);
        self.next_agent += 1;
        let health = self
            .store
            .get_species(species)
            .map_or(100.0, |s| s.base_health);
        let mut agent = Agent::new(id, WORLD, format!("agent {}", id.get()), species, position, health);
        agent.clan_id = clan;
        self.store.insert_agent(edit(agent));
        id
    }

    pub fn add_node(&mut self, resource: ResourceTypeId, position: Position, quantity: u32) -> ResourceNodeId {
        let id = ResourceNodeId(self.next_node);
        self.next_node += 1;
        self.store.insert_node(ResourceNode {
            id,
            world_id: WORLD,
            resource_type_id: resource,
            position,
            quantity,
            is_depleted: false,
        });
        id
    }

    pub fn add_territory(&mut self, owner: Option<ClanId>, (x, y, w, h): (f64, f64, f64, f64)) -> TerritoryId {
        let id = TerritoryId(self.next_territory);
        self.next_territory += 1;
        self.store.insert_territory(Territory {
            id,
            world_id: WORLD,
            name: format!("territory {}", id.get()),
            bounds: Rect::new(x, y, w, h),
            owner,
        });
        id
    }

    pub fn war(&mut self, a: ClanId, b: ClanId) {
        self.diplomacy(a, b, Diplomacy::War);
    }

    pub fn diplomacy(&mut self, a: ClanId, b: ClanId, state: Diplomacy) {
        self.store.set_diplomacy(a, b, state);
    }

    pub fn personal(&mut self, a: AgentId, b: AgentId, score: f64) {
        self.store.set_personal_score(a, b, score);
    }

    pub fn tables_species_friendly(&mut self, species: SpeciesId) {
        self.store.set_species_relation(species, species, RelationshipKind::Friend);
    }

    pub fn move_agent(&mut self, id: AgentId, to: Position) {
        self.edit_agent(id, |a| a.position = to);
    }

    pub fn edit_agent(&mut self, id: AgentId, edit: impl FnOnce(&mut Agent)) {
        if let Some(mut agent) = self.store.get_agent(id).cloned() {
            edit(&mut agent);
            self.store.insert_agent(agent);
        }
    }

    pub fn set_tick(&mut self, tick: u64) {
        if let Some(world) = self.store.world_mut(WORLD) {
            world.current_tick = tick;
        }
    }

    pub fn view(&self) -> WorldView {
        WorldView::load(&self.store, WORLD, &self.config).unwrap()
    }
}

/// Runs `f` with a freshly perceived context for `agent`; returns its result
/// and whatever the agent wrote to its buffer.
pub fn with_buffer<R>(
    scenario: &Scenario,
    agent: AgentId,
    f: impl FnOnce(&mut TickContext<'_>) -> R,
) -> (R, TickBuffer) {
    let view = scenario.view();
    let config = &scenario.config;
    let me = view.agent(agent).unwrap();
    let species = view.species(me.species_id).unwrap();
    let mut blackboard = Blackboard::new();
    let mut buffer = TickBuffer::new();
    let mut rng = SmallRng::seed_from_u64(7);
    let resolver = view.resolver(config);
    blackboard.perceive(me, &view, &resolver, config);

    let mut ctx = TickContext {
        agent: me,
        species,
        view: &view,
        config,
        resolver,
        blackboard: &mut blackboard,
        buffer: &mut buffer,
        rng: &mut rng,
    };
    let result = f(&mut ctx);
    (result, buffer)
}

pub fn with_context<R>(scenario: &Scenario, agent: AgentId, f: impl FnOnce(&mut TickContext<'_>) -> R) -> R {
    with_buffer(scenario, agent, f).0
}
