//! End-to-end tick scenarios against the in-memory store.

mod common;

use common::*;
use sim_core::components::{LifeStatus, MissionStatus, ObjectiveKind};
use sim_core::store::WorldStore;
use sim_events::{ClanId, EventType, MissionId};

#[test]
fn test_attack_leaves_wounded_target_alive() {
    let mut f = Fixture::new();
    let knight = f.agent(KNIGHT, 100.0, 100.0, |a| a);
    let peasant = f.agent(PEASANT, 110.0, 100.0, |mut a| {
        a.health = 20.0;
        a
    });

    f.tick();

    let b = f.get(peasant);
    assert_eq!(b.health, 5.0);
    assert_eq!(b.status, LifeStatus::Alive);

    let combat = events_of(&f.store, 0, EventType::CombatAction);
    assert_eq!(combat.len(), 1);
    assert_eq!(combat[0].actor_id, Some(knight));
    assert_eq!(combat[0].target_id, Some(peasant));
    assert_eq!(combat[0].payload_f64("damage"), Some(15.0));
    assert!(events_of(&f.store, 0, EventType::CharacterDeath).is_empty());
    assert_eq!(f.get(knight).stats.damage_dealt, 15.0);
}

#[test]
fn test_lethal_attack_kills_once() {
    let mut f = Fixture::new();
    let knight = f.agent(KNIGHT, 100.0, 100.0, |a| a);
    let peasant = f.agent(PEASANT, 110.0, 100.0, |mut a| {
        a.health = 20.0;
        a
    });
    f.tick();

    // Second blow from contact range
    f.edit(peasant, |a| {
        a.health = 10.0;
        a.position.x = 110.0;
        a.position.y = 100.0;
    });
    f.tick();

    let b = f.get(peasant);
    assert_eq!(b.status, LifeStatus::Dead);
    assert_eq!(b.health, 0.0);
    assert_eq!(b.stats.deaths, 1);
    assert_eq!(f.get(knight).stats.kills, 1);

    let deaths = events_of(&f.store, 1, EventType::CharacterDeath);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].actor_id, Some(peasant));
    assert_eq!(deaths[0].target_id, Some(knight));
    assert_eq!(deaths[0].payload_str("reason"), Some("combat"));

    // The dead are never evaluated again
    let report = f.tick();
    assert_eq!(report.agents_evaluated, 1);
    assert!(events_of(&f.store, 2, EventType::CharacterDeath).is_empty());
    assert_eq!(f.get(knight).stats.kills, 1);
    assert_eq!(f.store.population(WORLD).unwrap().total_alive, 1);
}

#[test]
fn test_multiple_attackers_credit_last_in_merge_order() {
    let mut f = Fixture::new();
    f.clan(ClanId(1), KNIGHT);
    let first = f.agent(KNIGHT, 100.0, 100.0, |a| a.with_clan(ClanId(1)));
    let second = f.agent(KNIGHT, 120.0, 100.0, |a| a.with_clan(ClanId(1)));
    let victim = f.agent(PEASANT, 110.0, 100.0, |mut a| {
        a.health = 20.0;
        a
    });

    f.tick();

    let combat = events_of(&f.store, 0, EventType::CombatAction);
    assert_eq!(combat.len(), 2);
    let recorded: f64 = combat
        .iter()
        .filter(|e| e.target_id == Some(victim))
        .filter_map(|e| e.payload_f64("damage"))
        .sum();
    assert_eq!(recorded, 30.0);
    // Health is clamped at zero rather than going 10 below it
    assert_eq!(f.get(victim).health, 0.0);
    let deaths = events_of(&f.store, 0, EventType::CharacterDeath);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].target_id, Some(second));
    assert_eq!(f.get(second).stats.kills, 1);
    assert_eq!(f.get(first).stats.kills, 0);
    assert_eq!(f.get(victim).stats.deaths, 1);
}

#[test]
fn test_single_gather_depletes_node() {
    let mut f = Fixture::new();
    let gatherer = f.agent(PEASANT, 100.0, 100.0, |a| a.with_vitals(50.0, 100.0, 0));
    let node = f.node(BERRIES, 105.0, 100.0, 6);

    f.tick();

    let n = f.store.get_node(node).unwrap();
    assert_eq!(n.quantity, 0);
    assert!(n.is_depleted);
    assert!(f.store.undepleted_nodes(WORLD).unwrap().is_empty());

    let agent = f.get(gatherer);
    assert_eq!(agent.quantity_of(BERRIES), 6);
    assert_eq!(agent.stats.resources_collected, 6);

    let gathers = events_of(&f.store, 0, EventType::CharacterGather);
    assert_eq!(gathers.len(), 1);
    assert_eq!(gathers[0].payload_f64("granted"), Some(6.0));
}

#[test]
fn test_gather_contention_favors_lower_id() {
    let mut f = Fixture::new();
    let a = f.agent(PEASANT, 100.0, 100.0, |a| a.with_vitals(50.0, 100.0, 0));
    let b = f.agent(PEASANT, 104.0, 100.0, |a| a.with_vitals(50.0, 100.0, 0));
    let node = f.node(BERRIES, 102.0, 100.0, 8);

    f.tick();

    assert_eq!(f.get(a).quantity_of(BERRIES), 6);
    assert_eq!(f.get(b).quantity_of(BERRIES), 2);
    assert!(f.store.get_node(node).unwrap().is_depleted);
}

#[test]
fn test_gather_objective_completes_at_target() {
    let mut f = Fixture::new();
    let clan = ClanId(1);
    f.clan(clan, PEASANT);
    f.agent(PEASANT, 100.0, 100.0, |a| a.with_clan(clan).with_item(IRON, 30));
    let smith = f.agent(PEASANT, 300.0, 300.0, |a| a.with_clan(clan).with_item(IRON, 19));
    f.mission(
        MissionId(1),
        clan,
        vec![ObjectiveKind::GatherResource {
            resource_type_id: IRON,
            target: 50,
        }],
    );

    let report = f.tick();
    let mission = f.store.get_mission(MissionId(1)).unwrap();
    assert_eq!(mission.status, MissionStatus::Active);
    assert!(!mission.objectives[0].is_complete);
    assert_eq!(report.missions.objectives_completed, 0);

    f.edit(smith, |a| {
        a.inventory.insert(IRON, 20);
    });
    let report = f.tick();
    let mission = f.store.get_mission(MissionId(1)).unwrap();
    assert!(mission.objectives[0].is_complete);
    assert_eq!(mission.status, MissionStatus::Completed);
    assert_eq!(report.missions.missions_completed, 1);
    assert_eq!(events_of(&f.store, 1, EventType::MissionCompleted).len(), 1);
}

#[test]
fn test_starvation_kills_over_two_ticks() {
    let mut f = Fixture::new();
    let starving = f.agent(PEASANT, 500.0, 500.0, |mut a| {
        a.health = 2.0;
        a.with_vitals(100.0, 100.0, 0)
    });

    f.tick();
    let agent = f.get(starving);
    assert_eq!(agent.status, LifeStatus::Alive);
    assert_eq!(agent.health, 1.0);
    assert_eq!(agent.vitals.hunger, 100.0);

    f.tick();
    let agent = f.get(starving);
    assert_eq!(agent.status, LifeStatus::Dead);
    assert_eq!(agent.health, 0.0);

    let deaths = events_of(&f.store, 1, EventType::CharacterDeath);
    assert_eq!(deaths.len(), 1);
    assert_eq!(deaths[0].payload_str("reason"), Some("starvation"));
    assert_eq!(deaths[0].target_id, None);
}

#[test]
fn test_every_alive_agent_decides_once_per_tick() {
    let mut f = Fixture::new();
    for i in 0..6 {
        f.agent(PEASANT, 100.0 + 40.0 * i as f64, 400.0, |a| a);
    }
    let report = f.tick();
    assert_eq!(report.agents_evaluated, 6);
    assert_eq!(report.failed_agents, 0);

    let decisions = events_of(&f.store, 0, EventType::AiDecision);
    let mut actors: Vec<_> = decisions.iter().filter_map(|e| e.actor_id).collect();
    actors.sort();
    actors.dedup();
    assert_eq!(decisions.len(), 6);
    assert_eq!(actors.len(), 6);
    assert_eq!(f.current_tick(), 1);
}
