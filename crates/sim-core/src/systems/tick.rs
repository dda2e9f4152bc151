//! Tick Orchestrator
//!
//! One call runs a full tick: Snapshot, Decide, Resolve, Persist, then the
//! mission tracker. Any storage error before Persist finishes aborts the tick
//! with the world exactly as it was.

use rayon::ThreadPool;
use sim_events::{generate_event_id, WorldId};
use tracing::{debug, error, info, warn};

use crate::behavior::{default_tree, Node};
use crate::config::SimConfig;
use crate::error::{Result, SimError};
use crate::store::WorldStore;
use crate::systems::decide::decide_all;
use crate::systems::mission::{track_missions, MissionOutcome};
use crate::systems::resolve::{resolve, DeathCause};
use crate::systems::snapshot::WorldView;

/// Summary of one processed tick.
#[derive(Debug, Clone)]
pub struct TickReport {
    pub world_id: WorldId,
    /// The tick that was simulated
    pub tick: u64,
    pub agents_evaluated: usize,
    pub failed_agents: usize,
    pub events: usize,
    pub deaths: Vec<(sim_events::AgentId, DeathCause)>,
    pub births: usize,
    pub missions: MissionOutcome,
}

/// Owns the behavior tree and the decide worker pool.
pub struct TickEngine {
    config: SimConfig,
    tree: Node,
    pool: Option<ThreadPool>,
}

impl TickEngine {
    /// Builds an engine that decides in parallel once the population reaches
    /// `engine.parallel_threshold`.
    pub fn new(config: SimConfig) -> Result<Self> {
        config.validate()?;
        let mut builder = rayon::ThreadPoolBuilder::new().thread_name(|i| format!("decide-{}", i));
        if config.engine.worker_count > 0 {
            builder = builder.num_threads(config.engine.worker_count);
        }
        let pool = builder.build()?;
        Ok(Self {
            config,
            tree: default_tree(),
            pool: Some(pool),
        })
    }

    /// An engine that always decides on the calling thread.
    pub fn sequential(config: SimConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            tree: default_tree(),
            pool: None,
        })
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn is_parallel(&self) -> bool {
        self.pool.is_some()
    }

    /// Simulates the world's current tick and advances it by one.
    pub fn process_tick<S: WorldStore + ?Sized>(&self, store: &mut S, world_id: WorldId) -> Result<TickReport> {
        let view = WorldView::load(&*store, world_id, &self.config).map_err(|err| {
            error!(world = %world_id, error = %err, "Snapshot failed, tick aborted");
            SimError::from(err)
        })?;
        let tick = view.tick();
        let timestamp = view.timestamp();
        debug!(world = %world_id, tick, agents = view.agents().len(), "Snapshot loaded");

        let outcomes = decide_all(&view, &self.tree, &self.config, self.pool.as_ref());
        let agents_evaluated = outcomes.len();
        let failed_agents = outcomes.iter().filter(|o| !o.is_ok()).count();
        debug!(tick, agents_evaluated, failed_agents, "Decisions collected");

        let mut resolution = resolve(&view, outcomes, &self.config);
        for event in &mut resolution.commit.events {
            event.event_id = generate_event_id();
        }
        let events = resolution.commit.events.len();
        drop(view);

        store.commit(resolution.commit).map_err(|err| {
            error!(world = %world_id, tick, error = %err, "Persist failed, tick aborted");
            SimError::from(err)
        })?;

        let missions = match track_missions(store, world_id, timestamp) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(world = %world_id, tick, error = %err, "Mission tracking failed");
                MissionOutcome::default()
            }
        };

        info!(
            world = %world_id,
            tick,
            date = %timestamp.date,
            agents = agents_evaluated,
            events,
            births = resolution.births.len(),
            deaths = resolution.deaths.len(),
            "Tick complete"
        );

        Ok(TickReport {
            world_id,
            tick,
            agents_evaluated,
            failed_agents,
            events,
            deaths: resolution.deaths,
            births: resolution.births.len(),
            missions,
        })
    }
}
