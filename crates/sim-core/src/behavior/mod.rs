//! Behavior Tree
//!
//! A closed set of node kinds evaluated once per agent per tick. Control nodes
//! (`Selector`, `Sequence`) and the utility selector compose conditions and
//! leaf actions; every leaf writes only to the agent's [`TickBuffer`].

pub mod blackboard;
pub mod query;
pub mod utility;

pub use blackboard::{AllyDanger, Blackboard};
pub use utility::{default_tree, Consideration, UtilitySelector};

use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};
use sim_events::{AgentId, Event, EventBuilder, EventType};

use crate::actions;
use crate::components::{Agent, Species};
use crate::config::SimConfig;
use crate::error::DecisionError;
use crate::mutation::{Mutation, TickBuffer};
use crate::systems::relationship::Resolver;
use crate::systems::snapshot::WorldView;

/// Result of ticking a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NodeStatus {
    Success,
    Failure,
    Running,
}

impl NodeStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            NodeStatus::Success => "SUCCESS",
            NodeStatus::Failure => "FAILURE",
            NodeStatus::Running => "RUNNING",
        }
    }
}

/// Everything a node can read and write while one agent is being evaluated.
pub struct TickContext<'a> {
    pub agent: &'a Agent,
    pub species: &'a Species,
    pub view: &'a WorldView,
    pub config: &'a SimConfig,
    pub resolver: Resolver<'a>,
    pub blackboard: &'a mut Blackboard,
    pub buffer: &'a mut TickBuffer,
    pub rng: &'a mut SmallRng,
}

impl<'a> TickContext<'a> {
    /// An event builder with this agent as actor at its snapshot position.
    pub fn event(&self, event_type: EventType) -> EventBuilder {
        EventBuilder::new(event_type)
            .actor(self.agent.actor_ref())
            .location(self.agent.position.x, self.agent.position.y)
    }

    pub fn emit(&mut self, builder: EventBuilder) {
        let event: Event = builder.build(self.view.world_id(), self.view.timestamp());
        self.buffer.emit(event);
    }

    pub fn push(&mut self, mutation: Mutation) {
        self.buffer.push(mutation);
    }

    /// Looks up another agent in the snapshot.
    pub fn other(&self, id: AgentId) -> Option<&'a Agent> {
        self.view.agent(id)
    }

    pub fn life_fraction(&self) -> f64 {
        self.view.life_fraction(self.agent)
    }
}

/// Leaf checks. On success most of them record a target on the blackboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Condition {
    IsEnemyNear,
    IsIntruderInTerritory,
    IsAllyInDanger,
    HasFoodInInventory,
    FindFoodResource,
    FindStrategicResource,
    FindRaidTarget,
    HasPartner,
    HasBuildMaterials,
}

impl Condition {
    pub fn check(&self, ctx: &mut TickContext<'_>) -> bool {
        match self {
            Condition::IsEnemyNear => match ctx.blackboard.nearest_enemy {
                Some((enemy, _)) => {
                    ctx.blackboard.target_agent = Some(enemy);
                    true
                }
                None => false,
            },
            Condition::IsIntruderInTerritory => match ctx.blackboard.intruder {
                Some(intruder) => {
                    ctx.blackboard.target_agent = Some(intruder);
                    true
                }
                None => false,
            },
            Condition::IsAllyInDanger => match ctx.blackboard.ally_danger {
                Some(danger) => {
                    ctx.blackboard.target_agent = Some(danger.threat);
                    ctx.blackboard.protected_ally = Some(danger.ally);
                    true
                }
                None => false,
            },
            Condition::HasFoodInInventory => query::inventory_food(ctx).is_some(),
            Condition::FindFoodResource => match query::visible_food_node(ctx) {
                Some(node) => {
                    ctx.blackboard.target_node = Some(node.id);
                    true
                }
                None => false,
            },
            Condition::FindStrategicResource => match query::strategic_node(ctx) {
                Some(node) => {
                    ctx.blackboard.target_node = Some(node.id);
                    true
                }
                None => false,
            },
            Condition::FindRaidTarget => match query::raid_target(ctx) {
                Some(territory) => {
                    ctx.blackboard.target_territory = Some(territory.id);
                    true
                }
                None => false,
            },
            Condition::HasPartner => match query::partner(ctx) {
                Some(partner) => {
                    ctx.blackboard.partner = Some(partner.id);
                    true
                }
                None => false,
            },
            Condition::HasBuildMaterials => query::has_build_materials(ctx),
        }
    }
}

/// Leaf behaviors, implemented in [`crate::actions`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionKind {
    Flee,
    Attack,
    EatFromInventory,
    MoveToAndGather,
    Rest,
    GroupOrFollowObjective,
    Invade,
    Reproduce,
    Build,
    Wander,
}

impl ActionKind {
    pub fn run(&self, ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
        match self {
            ActionKind::Flee => actions::movement::flee(ctx),
            ActionKind::Attack => actions::conflict::attack(ctx),
            ActionKind::EatFromInventory => actions::resource::eat_from_inventory(ctx),
            ActionKind::MoveToAndGather => actions::resource::move_to_and_gather(ctx),
            ActionKind::Rest => actions::movement::rest(ctx),
            ActionKind::GroupOrFollowObjective => actions::movement::group_or_follow_objective(ctx),
            ActionKind::Invade => actions::conflict::invade(ctx),
            ActionKind::Reproduce => actions::social::reproduce(ctx),
            ActionKind::Build => actions::resource::build(ctx),
            ActionKind::Wander => actions::movement::wander(ctx),
        }
    }
}

/// A behavior tree node.
#[derive(Debug, Clone)]
pub enum Node {
    /// First child that does not fail
    Selector(Vec<Node>),
    /// Runs children until one does not succeed
    Sequence(Vec<Node>),
    Utility(UtilitySelector),
    Condition(Condition),
    Action(ActionKind),
}

impl Node {
    pub fn tick(&self, ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
        match self {
            Node::Selector(children) => {
                for child in children {
                    let status = child.tick(ctx)?;
                    if status != NodeStatus::Failure {
                        return Ok(status);
                    }
                }
                Ok(NodeStatus::Failure)
            }
            Node::Sequence(children) => {
                for child in children {
                    let status = child.tick(ctx)?;
                    if status != NodeStatus::Success {
                        return Ok(status);
                    }
                }
                Ok(NodeStatus::Success)
            }
            Node::Utility(selector) => selector.tick(ctx),
            Node::Condition(condition) => Ok(if condition.check(ctx) {
                NodeStatus::Success
            } else {
                NodeStatus::Failure
            }),
            Node::Action(action) => action.run(ctx),
        }
    }

    pub fn sequence(children: Vec<Node>) -> Self {
        Node::Sequence(children)
    }

    pub fn selector(children: Vec<Node>) -> Self {
        Node::Selector(children)
    }
}
