//! Mission Tracker
//!
//! Re-evaluates every active clan mission against the state the tick just
//! committed. Objectives that reference something that no longer exists are
//! left incomplete rather than treated as errors.

use std::collections::BTreeMap;

use serde_json::json;
use sim_events::{generate_event_id, ClanId, EventBuilder, EventType, SimTimestamp, WorldId};
use tracing::{debug, warn};

use crate::components::{Agent, Mission, MissionStatus, ObjectiveKind, Position, Territory};
use crate::error::StoreError;
use crate::store::{MissionPatch, MissionUpdate, WorldStore};

/// Where each clan's members should rally.
///
/// The centre of the first unmet conquest target of the clan's lowest-id
/// active mission, otherwise the centre of the first territory it owns.
pub fn clan_objective_positions(missions: &[Mission], territories: &[Territory]) -> BTreeMap<ClanId, Position> {
    let mut positions = BTreeMap::new();

    let mut active: Vec<&Mission> = missions.iter().filter(|m| m.is_active()).collect();
    active.sort_by_key(|m| m.id);
    for mission in active {
        if positions.contains_key(&mission.clan_id) {
            continue;
        }
        let target = mission.objectives.iter().filter(|o| !o.is_complete).find_map(|o| match o.kind {
            ObjectiveKind::ConquerTerritory { territory_id } => {
                territories.iter().find(|t| t.id == territory_id)
            }
            _ => None,
        });
        if let Some(territory) = target {
            positions.insert(mission.clan_id, territory.center());
        }
    }

    for territory in territories {
        if let Some(owner) = territory.owner {
            positions.entry(owner).or_insert_with(|| territory.center());
        }
    }
    positions
}

/// Counts from one tracker pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MissionOutcome {
    pub objectives_completed: usize,
    pub missions_completed: usize,
    pub missions_failed: usize,
    pub territories_conquered: usize,
}

/// Computes mission progress for `world_id` without writing anything.
///
/// `timestamp` is the tick that was just simulated; deadlines are compared
/// against it.
pub fn evaluate_missions<S: WorldStore + ?Sized>(
    store: &S,
    world_id: WorldId,
    timestamp: SimTimestamp,
) -> Result<(MissionUpdate, MissionOutcome), StoreError> {
    let agents = store.alive_agents(world_id)?;
    let mut territories = store.territories(world_id)?;
    territories.sort_by_key(|t| t.id);
    let mut missions = store.active_missions(world_id)?;
    missions.sort_by_key(|m| m.id);

    let mut update = MissionUpdate::default();
    let mut outcome = MissionOutcome::default();

    for mission in &missions {
        let clan = mission.clan_id;
        let mut completed = Vec::new();
        let mut progress = Vec::new();

        for (index, objective) in mission.objectives.iter().enumerate() {
            if objective.is_complete {
                continue;
            }
            let done = match objective.kind {
                ObjectiveKind::GatherResource {
                    resource_type_id,
                    target,
                } => {
                    let held: u64 = agents
                        .iter()
                        .filter(|a| a.clan_id == Some(clan))
                        .map(|a| u64::from(a.quantity_of(resource_type_id)))
                        .sum();
                    let held_units = u32::try_from(held).unwrap_or(u32::MAX);
                    if held_units != objective.current_progress {
                        progress.push((index, held_units));
                    }
                    held >= u64::from(target)
                }
                ObjectiveKind::ConquerTerritory { territory_id } => {
                    let Some(territory) = territories.iter_mut().find(|t| t.id == territory_id) else {
                        warn!(mission = %mission.id, territory = %territory_id, "Objective references a missing territory");
                        continue;
                    };
                    if territory.owner == Some(clan) {
                        true
                    } else if holds_majority(&agents, territory, clan) {
                        update.territory_owners.push((territory.id, clan));
                        update.events.push(
                            EventBuilder::new(EventType::TerritoryConquered)
                                .location(territory.center().x, territory.center().y)
                                .payload(json!({
                                    "territory_id": territory.id,
                                    "territory_name": territory.name,
                                    "clan_id": clan,
                                    "previous_owner": territory.owner,
                                    "mission_id": mission.id,
                                }))
                                .build(world_id, timestamp),
                        );
                        territory.owner = Some(clan);
                        outcome.territories_conquered += 1;
                        true
                    } else {
                        false
                    }
                }
                ObjectiveKind::DefeatCharacter { agent_id } => match store.agent(agent_id)? {
                    Some(target) => !target.is_alive(),
                    None => {
                        warn!(mission = %mission.id, agent = %agent_id, "Objective references a missing character");
                        false
                    }
                },
            };
            if done {
                completed.push(index);
            }
        }

        outcome.objectives_completed += completed.len();
        let all_done = mission
            .objectives
            .iter()
            .enumerate()
            .all(|(i, o)| o.is_complete || completed.contains(&i));

        let status = if all_done {
            outcome.missions_completed += 1;
            update.events.push(mission_event(EventType::MissionCompleted, mission, None, world_id, timestamp));
            Some(MissionStatus::Completed)
        } else if let Some(reason) = failure_reason(mission, &agents, timestamp.tick) {
            outcome.missions_failed += 1;
            update
                .events
                .push(mission_event(EventType::MissionFailed, mission, Some(reason), world_id, timestamp));
            Some(MissionStatus::Failed)
        } else {
            None
        };

        if !completed.is_empty() || !progress.is_empty() || status.is_some() {
            update.missions.push(MissionPatch {
                id: mission.id,
                completed_objectives: completed,
                progress,
                status,
            });
        }
    }

    Ok((update, outcome))
}

/// Evaluates and writes mission progress.
pub fn track_missions<S: WorldStore + ?Sized>(
    store: &mut S,
    world_id: WorldId,
    timestamp: SimTimestamp,
) -> Result<MissionOutcome, StoreError> {
    let (mut update, outcome) = evaluate_missions(store, world_id, timestamp)?;
    if update.is_empty() {
        return Ok(outcome);
    }
    for event in &mut update.events {
        event.event_id = generate_event_id();
    }
    store.apply_missions(world_id, update)?;
    debug!(
        world = %world_id,
        objectives = outcome.objectives_completed,
        completed = outcome.missions_completed,
        failed = outcome.missions_failed,
        "Missions updated"
    );
    Ok(outcome)
}

/// Strictly more than half of the living agents inside belong to `clan`.
fn holds_majority(agents: &[Agent], territory: &Territory, clan: ClanId) -> bool {
    let (ours, total) = agents
        .iter()
        .filter(|a| territory.contains(&a.position))
        .fold((0usize, 0usize), |(ours, total), a| {
            (ours + usize::from(a.clan_id == Some(clan)), total + 1)
        });
    ours > 0 && ours * 2 > total
}

fn failure_reason(mission: &Mission, agents: &[Agent], tick: u64) -> Option<&'static str> {
    if mission.deadline_tick.map_or(false, |deadline| tick > deadline) {
        return Some("deadline");
    }
    if !agents.iter().any(|a| a.clan_id == Some(mission.clan_id)) {
        return Some("clan_extinct");
    }
    None
}

fn mission_event(
    event_type: EventType,
    mission: &Mission,
    reason: Option<&str>,
    world_id: WorldId,
    timestamp: SimTimestamp,
) -> sim_events::Event {
    let mut payload = json!({
        "mission_id": mission.id,
        "mission_name": mission.name,
        "clan_id": mission.clan_id,
    });
    if let Some(reason) = reason {
        payload["reason"] = json!(reason);
    }
    EventBuilder::new(event_type).payload(payload).build(world_id, timestamp)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Objective, Rect};
    use crate::store::InMemoryStore;
    use crate::testing::{Scenario, BERRIES, CLAN_BLUE, CLAN_RED, HUMAN, WORLD, WOOD};
    use sim_events::{AgentId, MissionId, TerritoryId};

    fn ts(tick: u64) -> SimTimestamp {
        SimTimestamp::new(tick, 13)
    }

    fn territory(id: u64, owner: Option<ClanId>, rect: Rect) -> Territory {
        Territory {
            id: TerritoryId(id),
            world_id: WORLD,
            name: format!("t{}", id),
            bounds: rect,
            owner,
        }
    }

    fn status_of(store: &InMemoryStore, id: MissionId) -> MissionStatus {
        store.get_mission(id).unwrap().status
    }

    #[test]
    fn test_objective_positions_prefer_conquest_target() {
        let territories = vec![
            territory(1, Some(CLAN_RED), Rect::new(0.0, 0.0, 100.0, 100.0)),
            territory(2, Some(CLAN_BLUE), Rect::new(200.0, 0.0, 100.0, 100.0)),
        ];
        let mut mission = Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Take the east",
            vec![ObjectiveKind::ConquerTerritory {
                territory_id: TerritoryId(2),
            }],
        );
        let positions = clan_objective_positions(&[mission.clone()], &territories);
        assert_eq!(positions.get(&CLAN_RED), Some(&Position::new(250.0, 50.0)));
        assert_eq!(positions.get(&CLAN_BLUE), Some(&Position::new(250.0, 50.0)));

        mission.objectives[0] = Objective {
            is_complete: true,
            ..mission.objectives[0]
        };
        let positions = clan_objective_positions(&[mission], &territories);
        assert_eq!(positions.get(&CLAN_RED), Some(&Position::new(50.0, 50.0)));
    }

    #[test]
    fn test_gather_objective_completes_at_target() {
        let mut s = Scenario::new();
        let a = s.add_agent(HUMAN, Some(CLAN_RED), Position::new(10.0, 10.0), |a| a.with_item(WOOD, 30));
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(20.0, 10.0), |a| a.with_item(WOOD, 19));
        s.add_agent(HUMAN, Some(CLAN_BLUE), Position::new(30.0, 10.0), |a| a.with_item(WOOD, 40));
        s.store.insert_mission(Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Stockpile",
            vec![ObjectiveKind::GatherResource {
                resource_type_id: WOOD,
                target: 50,
            }],
        ));

        let outcome = track_missions(&mut s.store, WORLD, ts(0)).unwrap();
        assert_eq!(outcome.objectives_completed, 0);
        assert_eq!(status_of(&s.store, MissionId(1)), MissionStatus::Active);
        // Partial progress is kept even though the objective is still open
        let objective = &s.store.get_mission(MissionId(1)).unwrap().objectives[0];
        assert_eq!(objective.current_progress, 49);
        assert!(!objective.is_complete);

        s.edit_agent(a, |agent| {
            agent.inventory.insert(WOOD, 31);
        });
        let outcome = track_missions(&mut s.store, WORLD, ts(1)).unwrap();
        assert_eq!(outcome.objectives_completed, 1);
        assert_eq!(outcome.missions_completed, 1);
        assert_eq!(status_of(&s.store, MissionId(1)), MissionStatus::Completed);
        assert_eq!(s.store.get_mission(MissionId(1)).unwrap().objectives[0].current_progress, 50);
        let event = s.store.events().last().unwrap();
        assert_eq!(event.event_type, EventType::MissionCompleted);
        assert!(event.has_id());
    }

    #[test]
    fn test_unchanged_progress_writes_nothing() {
        let mut s = Scenario::new();
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(10.0, 10.0), |a| a.with_item(WOOD, 5));
        s.store.insert_mission(Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Stockpile",
            vec![ObjectiveKind::GatherResource {
                resource_type_id: WOOD,
                target: 50,
            }],
        ));
        let (update, _) = evaluate_missions(&s.store, WORLD, ts(0)).unwrap();
        assert_eq!(update.missions[0].progress, vec![(0, 5)]);
        s.store.apply_missions(WORLD, update).unwrap();

        let (update, _) = evaluate_missions(&s.store, WORLD, ts(1)).unwrap();
        assert!(update.is_empty());
    }

    #[test]
    fn test_majority_presence_conquers() {
        let mut s = Scenario::new();
        let t = s.add_territory(Some(CLAN_BLUE), (0.0, 0.0, 100.0, 100.0));
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(10.0, 10.0), |a| a);
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(20.0, 10.0), |a| a);
        s.add_agent(HUMAN, Some(CLAN_BLUE), Position::new(30.0, 10.0), |a| a);
        s.store.insert_mission(Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Raid",
            vec![
                ObjectiveKind::ConquerTerritory { territory_id: t },
                ObjectiveKind::GatherResource {
                    resource_type_id: BERRIES,
                    target: 10,
                },
            ],
        ));

        let outcome = track_missions(&mut s.store, WORLD, ts(0)).unwrap();
        assert_eq!(outcome.territories_conquered, 1);
        assert_eq!(s.store.get_territory(t).unwrap().owner, Some(CLAN_RED));
        assert_eq!(status_of(&s.store, MissionId(1)), MissionStatus::Active);
        assert!(s.store.get_mission(MissionId(1)).unwrap().objectives[0].is_complete);
        assert!(s
            .store
            .events()
            .iter()
            .any(|e| e.event_type == EventType::TerritoryConquered));
    }

    #[test]
    fn test_tied_presence_does_not_conquer() {
        let mut s = Scenario::new();
        let t = s.add_territory(Some(CLAN_BLUE), (0.0, 0.0, 100.0, 100.0));
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(10.0, 10.0), |a| a);
        s.add_agent(HUMAN, Some(CLAN_BLUE), Position::new(30.0, 10.0), |a| a);
        s.store.insert_mission(Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Raid",
            vec![ObjectiveKind::ConquerTerritory { territory_id: t }],
        ));
        let outcome = track_missions(&mut s.store, WORLD, ts(0)).unwrap();
        assert_eq!(outcome, MissionOutcome::default());
        assert_eq!(s.store.get_territory(t).unwrap().owner, Some(CLAN_BLUE));
    }

    #[test]
    fn test_missing_references_stay_incomplete() {
        let mut s = Scenario::new();
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(10.0, 10.0), |a| a);
        s.store.insert_mission(Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Ghosts",
            vec![
                ObjectiveKind::ConquerTerritory {
                    territory_id: TerritoryId(404),
                },
                ObjectiveKind::DefeatCharacter { agent_id: AgentId(404) },
            ],
        ));
        let outcome = track_missions(&mut s.store, WORLD, ts(0)).unwrap();
        assert_eq!(outcome, MissionOutcome::default());
        assert_eq!(status_of(&s.store, MissionId(1)), MissionStatus::Active);
    }

    #[test]
    fn test_defeat_objective_and_failures() {
        let mut s = Scenario::new();
        s.add_agent(HUMAN, Some(CLAN_RED), Position::new(10.0, 10.0), |a| a);
        let target = s.add_agent(HUMAN, Some(CLAN_BLUE), Position::new(50.0, 10.0), |a| a);
        s.store.insert_mission(Mission::new(
            MissionId(1),
            WORLD,
            CLAN_RED,
            "Duel",
            vec![ObjectiveKind::DefeatCharacter { agent_id: target }],
        ));
        s.store.insert_mission(
            Mission::new(
                MissionId(2),
                WORLD,
                CLAN_RED,
                "Hoard",
                vec![ObjectiveKind::GatherResource {
                    resource_type_id: WOOD,
                    target: 500,
                }],
            )
            .with_deadline(5),
        );
        s.store.insert_mission(Mission::new(
            MissionId(3),
            WORLD,
            ClanId(9),
            "Nobody home",
            vec![ObjectiveKind::GatherResource {
                resource_type_id: WOOD,
                target: 1,
            }],
        ));

        s.edit_agent(target, |a| a.status = crate::components::LifeStatus::Dead);
        let outcome = track_missions(&mut s.store, WORLD, ts(6)).unwrap();
        assert_eq!(outcome.missions_completed, 1);
        assert_eq!(outcome.missions_failed, 2);
        assert_eq!(status_of(&s.store, MissionId(1)), MissionStatus::Completed);
        assert_eq!(status_of(&s.store, MissionId(2)), MissionStatus::Failed);
        assert_eq!(status_of(&s.store, MissionId(3)), MissionStatus::Failed);
        let reasons: Vec<_> = s
            .store
            .events()
            .iter()
            .filter(|e| e.event_type == EventType::MissionFailed)
            .filter_map(|e| e.payload_str("reason"))
            .collect();
        assert_eq!(reasons, vec!["deadline", "clan_extinct"]);
    }
}
