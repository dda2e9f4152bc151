//! Decide Phase
//!
//! Runs the behavior tree once for every living agent against the shared
//! snapshot. Agents are split into contiguous chunks in ascending id order, so
//! the outcomes come back in that order whether the chunks ran on one thread
//! or many.

use std::panic::{catch_unwind, AssertUnwindSafe};

use rand::rngs::SmallRng;
use rand::SeedableRng;
use rayon::prelude::*;
use rayon::ThreadPool;
use sim_events::AgentId;
use tracing::warn;

use crate::behavior::{Blackboard, Node, NodeStatus, TickContext};
use crate::components::Agent;
use crate::config::SimConfig;
use crate::error::DecisionError;
use crate::mutation::TickBuffer;
use crate::systems::snapshot::WorldView;

/// What one agent's evaluation produced.
#[derive(Debug)]
pub struct AgentOutcome {
    pub agent: AgentId,
    /// Empty when the evaluation failed
    pub buffer: TickBuffer,
    pub result: Result<NodeStatus, DecisionError>,
}

impl AgentOutcome {
    pub fn is_ok(&self) -> bool {
        self.result.is_ok()
    }
}

/// A random stream private to one agent on one tick.
pub fn agent_rng(seed: u64, tick: u64, agent: AgentId) -> SmallRng {
    let mut x = seed ^ tick.wrapping_mul(0x9E37_79B9_7F4A_7C15) ^ agent.get().rotate_left(32);
    x = (x ^ (x >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    SmallRng::seed_from_u64(x ^ (x >> 31))
}

/// Evaluates every agent in the snapshot.
///
/// Runs on `pool` when one is given and the population reaches the configured
/// threshold, otherwise on the calling thread.
pub fn decide_all(view: &WorldView, tree: &Node, config: &SimConfig, pool: Option<&ThreadPool>) -> Vec<AgentOutcome> {
    let agents = view.agents();
    match pool {
        Some(pool) if agents.len() >= config.engine.parallel_threshold.max(2) => {
            let chunk = agents.len().div_ceil(pool.current_num_threads().max(1)).max(1);
            pool.install(|| {
                agents
                    .par_chunks(chunk)
                    .map(|slice| {
                        slice
                            .iter()
                            .map(|agent| evaluate_agent(view, tree, config, agent))
                            .collect::<Vec<_>>()
                    })
                    .collect::<Vec<_>>()
            })
            .into_iter()
            .flatten()
            .collect()
        }
        _ => agents
            .iter()
            .map(|agent| evaluate_agent(view, tree, config, agent))
            .collect(),
    }
}

/// Evaluates one agent by id.
pub fn decide_one(
    view: &WorldView,
    tree: &Node,
    config: &SimConfig,
    agent: AgentId,
) -> Result<(NodeStatus, TickBuffer), DecisionError> {
    let agent = view.agent(agent).ok_or(DecisionError::UnknownAgent(agent))?;
    run_tree(view, tree, config, agent)
}

/// Runs the tree for one agent, isolating failures. A failed agent contributes
/// nothing to the tick.
fn evaluate_agent(view: &WorldView, tree: &Node, config: &SimConfig, agent: &Agent) -> AgentOutcome {
    let result = catch_unwind(AssertUnwindSafe(|| run_tree(view, tree, config, agent)))
        .unwrap_or_else(|panic| {
            Err(DecisionError::Panicked {
                agent: agent.id,
                message: panic_message(panic.as_ref()),
            })
        });

    match result {
        Ok((status, buffer)) => AgentOutcome {
            agent: agent.id,
            buffer,
            result: Ok(status),
        },
        Err(err) => {
            warn!(agent = %agent.id, tick = view.tick(), error = %err, "Agent decision failed, skipping");
            AgentOutcome {
                agent: agent.id,
                buffer: TickBuffer::new(),
                result: Err(err),
            }
        }
    }
}

fn run_tree(
    view: &WorldView,
    tree: &Node,
    config: &SimConfig,
    agent: &Agent,
) -> Result<(NodeStatus, TickBuffer), DecisionError> {
    let species = view.species(agent.species_id).ok_or(DecisionError::UnknownSpecies {
        agent: agent.id,
        species: agent.species_id,
    })?;

    let mut blackboard = Blackboard::new();
    let mut buffer = TickBuffer::new();
    let mut rng = agent_rng(config.engine.seed, view.tick(), agent.id);
    let mut ctx = TickContext {
        agent,
        species,
        view,
        config,
        resolver: view.resolver(config),
        blackboard: &mut blackboard,
        buffer: &mut buffer,
        rng: &mut rng,
    };
    let status = tree.tick(&mut ctx)?;
    Ok((status, buffer))
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
