//! Resource Actions
//!
//! Eating from the pack, harvesting nodes and building with gathered materials.

use serde_json::json;
use sim_events::EventType;

use super::step_to;
use crate::behavior::{query, NodeStatus, TickContext};
use crate::error::DecisionError;
use crate::mutation::Mutation;

/// Eats one unit of the lowest-id food item carried.
pub fn eat_from_inventory(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let Some(food) = query::inventory_food(ctx) else {
        return Ok(NodeStatus::Failure);
    };
    let me = ctx.agent.id;
    let reduction = ctx.config.vitals.eat_hunger_reduction;
    let hunger = ctx.agent.vitals.hunger;

    ctx.push(Mutation::Inventory {
        agent: me,
        resource: food,
        delta: -1,
    });
    ctx.push(Mutation::Hunger {
        agent: me,
        delta: -reduction,
    });

    let builder = ctx.event(EventType::CharacterEat).resource(food).payload(json!({
        "source": "inventory",
        "hunger_before": hunger,
        "hunger_after": (hunger - reduction).max(0.0),
    }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}

/// Walks to the blackboard node and requests a harvest once within reach.
///
/// The amount actually granted depends on what other agents took from the
/// same node this tick and is settled in the resolve phase.
pub fn move_to_and_gather(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    let Some(node) = ctx.blackboard.target_node.and_then(|id| ctx.view.node(id)) else {
        return Ok(NodeStatus::Failure);
    };
    if !node.is_available() {
        return Ok(NodeStatus::Failure);
    }

    let range = ctx.config.movement.gather_range;
    if ctx.agent.position.distance_to(&node.position) > range {
        step_to(ctx, node.position, range * 0.8);
        return Ok(NodeStatus::Running);
    }

    let me = ctx.agent.id;
    let amount = ctx.config.economy.gather_amount;
    ctx.push(Mutation::Harvest {
        agent: me,
        node: node.id,
        resource: node.resource_type_id,
        amount,
    });
    ctx.push(Mutation::Energy {
        agent: me,
        delta: -ctx.config.vitals.gather_energy_cost,
    });

    let builder = ctx
        .event(EventType::CharacterGather)
        .resource(node.resource_type_id)
        .payload(json!({
            "node_id": node.id,
            "requested": amount,
        }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}

/// Spends wood and stone on a house.
pub fn build(ctx: &mut TickContext<'_>) -> Result<NodeStatus, DecisionError> {
    if !query::has_build_materials(ctx) {
        return Ok(NodeStatus::Failure);
    }
    let (Some(wood), Some(stone)) = (ctx.view.wood_id(), ctx.view.stone_id()) else {
        return Ok(NodeStatus::Failure);
    };
    let me = ctx.agent.id;
    let wood_cost = ctx.config.economy.house_wood_cost;
    let stone_cost = ctx.config.economy.house_stone_cost;

    ctx.push(Mutation::Inventory {
        agent: me,
        resource: wood,
        delta: -i64::from(wood_cost),
    });
    ctx.push(Mutation::Inventory {
        agent: me,
        resource: stone,
        delta: -i64::from(stone_cost),
    });

    let builder = ctx.event(EventType::CharacterBuildHouse).payload(json!({
        "structure": "house",
        "wood": wood_cost,
        "stone": stone_cost,
    }));
    ctx.emit(builder);
    Ok(NodeStatus::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::behavior::Condition;
    use crate::components::Position;
    use crate::testing::{with_buffer, Scenario, BERRIES, CLAN_RED, HUMAN, STONE, WOOD};

    #[test]
    fn test_eat_consumes_one_food() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, None, Position::new(100.0, 100.0), |a| {
            a.with_vitals(30.0, 100.0, 0).with_item(WOOD, 4).with_item(BERRIES, 2)
        });

        let (status, buffer) = with_buffer(&s, a, |ctx| {
            assert!(Condition::HasFoodInInventory.check(ctx));
            eat_from_inventory(ctx).unwrap()
        });
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(
            buffer.mutations(),
            &[
                Mutation::Inventory {
                    agent: a,
                    resource: BERRIES,
                    delta: -1
                },
                Mutation::Hunger { agent: a, delta: -50.0 },
            ]
        );
        let event = &buffer.events()[0];
        assert_eq!(event.event_type, EventType::CharacterEat);
        assert_eq!(event.payload_f64("hunger_after"), Some(0.0));
    }

    #[test]
    fn test_eat_without_food_fails() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, None, Position::new(100.0, 100.0), |a| a.with_item(WOOD, 4));
        let (status, buffer) = with_buffer(&s, a, |ctx| eat_from_inventory(ctx).unwrap());
        assert_eq!(status, NodeStatus::Failure);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_gather_in_range_requests_harvest() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, None, Position::new(100.0, 100.0), |a| a);
        let node = s.add_node(BERRIES, Position::new(110.0, 100.0), 6);

        let (status, buffer) = with_buffer(&s, a, |ctx| {
            assert!(Condition::FindFoodResource.check(ctx));
            move_to_and_gather(ctx).unwrap()
        });
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(
            buffer.mutations()[0],
            Mutation::Harvest {
                agent: a,
                node,
                resource: BERRIES,
                amount: 6
            }
        );
        assert_eq!(buffer.events()[0].event_type, EventType::CharacterGather);
    }

    #[test]
    fn test_gather_out_of_range_approaches() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, None, Position::new(100.0, 100.0), |a| a);
        s.add_node(BERRIES, Position::new(100.0, 200.0), 6);

        let (status, buffer) = with_buffer(&s, a, |ctx| {
            assert!(Condition::FindFoodResource.check(ctx));
            move_to_and_gather(ctx).unwrap()
        });
        assert_eq!(status, NodeStatus::Running);
        assert!(buffer.mutations().contains(&Mutation::Move {
            agent: a,
            to: Position::new(100.0, 115.0)
        }));
    }

    #[test]
    fn test_strategic_resource_only_when_home_lacks_it() {
        let mut s = Scenario::new();
        s.add_territory(Some(CLAN_RED), (0.0, 0.0, 200.0, 200.0));
        let a = s.add_agent(HUMAN, Some(CLAN_RED), Position::new(100.0, 100.0), |a| a);
        let far = s.add_node(WOOD, Position::new(600.0, 600.0), 20);

        let found = with_buffer(&s, a, |ctx| {
            Condition::FindStrategicResource.check(ctx);
            ctx.blackboard.target_node
        })
        .0;
        assert_eq!(found, Some(far));

        s.add_node(STONE, Position::new(50.0, 50.0), 20);
        let found = with_buffer(&s, a, |ctx| Condition::FindStrategicResource.check(ctx)).0;
        assert!(!found);
    }

    #[test]
    fn test_build_spends_materials() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, None, Position::new(100.0, 100.0), |a| {
            a.with_item(WOOD, 12).with_item(STONE, 5)
        });
        let (status, buffer) = with_buffer(&s, a, |ctx| build(ctx).unwrap());
        assert_eq!(status, NodeStatus::Success);
        assert_eq!(
            buffer.mutations(),
            &[
                Mutation::Inventory {
                    agent: a,
                    resource: WOOD,
                    delta: -10
                },
                Mutation::Inventory {
                    agent: a,
                    resource: STONE,
                    delta: -5
                },
            ]
        );
        assert_eq!(buffer.events()[0].event_type, EventType::CharacterBuildHouse);
    }

    #[test]
    fn test_build_short_on_stone_fails() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, None, Position::new(100.0, 100.0), |a| {
            a.with_item(WOOD, 12).with_item(STONE, 4)
        });
        let (status, _) = with_buffer(&s, a, |ctx| build(ctx).unwrap());
        assert_eq!(status, NodeStatus::Failure);
    }
}
