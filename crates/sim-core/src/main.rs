//! Clan World Simulation
//!
//! Seeds the demo world into an in-memory store and runs it for a number of
//! ticks, writing the event log and the final world snapshot.

use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use sim_core::events::EventLogger;
use sim_core::setup::{get_spawn_summary, seed_demo_world};
use sim_core::store::InMemoryStore;
use sim_core::systems::{world_snapshot, TickEngine};
use sim_core::{Result, SimConfig};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "world_sim")]
#[command(about = "A tick-based clan world simulation")]
struct Args {
    /// Random seed for the scenario and the engine
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Number of ticks to simulate
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// TOML configuration file (defaults apply when omitted)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every event as JSONL to this file
    #[arg(long)]
    events_out: Option<PathBuf>,

    /// Write the final world snapshot as JSON to this file
    #[arg(long)]
    snapshot_out: Option<PathBuf>,

    /// Decide on a single thread
    #[arg(long)]
    sequential: bool,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("sim_core=info")),
        )
        .init();

    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!(error = %e, "Simulation aborted");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let mut config = match &args.config {
        Some(path) => SimConfig::from_file(path)?,
        None => SimConfig::default(),
    };
    config.engine.seed = args.seed;

    println!("Clan World Simulation");
    println!("=====================");
    println!("Seed: {}", args.seed);
    println!("Ticks: {}", args.ticks);
    println!();

    let mut store = InMemoryStore::new();
    let world_id = seed_demo_world(&mut store, args.seed);
    let summary = get_spawn_summary(&store, world_id);
    println!("Spawned {} agents", summary.total_agents);
    for (clan, count) in &summary.by_clan {
        let name = store
            .clans_in(world_id)
            .find(|c| c.id == *clan)
            .map_or("?", |c| c.name.as_str());
        println!("  {}: {}", name, count);
    }
    println!();

    let engine = if args.sequential {
        TickEngine::sequential(config)?
    } else {
        TickEngine::new(config)?
    };
    info!(
        parallel = engine.is_parallel(),
        workers = engine.config().engine.worker_count,
        "Engine ready"
    );

    let mut logger = match &args.events_out {
        Some(path) => EventLogger::new(path)?,
        None => EventLogger::null(),
    };
    let mut logged = 0;

    for _ in 0..args.ticks {
        let report = engine.process_tick(&mut store, world_id)?;

        // Mission events are appended after the tick commit, so read the log
        // from the store rather than the report.
        let events = store.events();
        logger.log_batch(&events[logged..])?;
        logged = events.len();

        let alive = store.population(world_id).map_or(0, |p| p.total_alive);
        println!(
            "[Tick {:>4}] alive: {:>3}  events: {:>3}  births: {}  deaths: {}  missions: +{} / -{}",
            report.tick,
            alive,
            report.events,
            report.births,
            report.deaths.len(),
            report.missions.missions_completed,
            report.missions.missions_failed,
        );
        if report.failed_agents > 0 {
            println!("             {} agents failed to decide", report.failed_agents);
        }
        if alive == 0 {
            println!("Every agent has died, stopping early.");
            break;
        }
    }
    logger.flush()?;

    let snapshot = world_snapshot(&store, world_id, engine.config())?;
    if let Some(path) = &args.snapshot_out {
        std::fs::write(path, snapshot.to_json()?)?;
        println!("Wrote snapshot to {}", path.display());
    }

    println!();
    println!(
        "Simulation complete at {} with {} agents alive. Logged {} events.",
        snapshot.timestamp.date,
        snapshot.population.total_alive,
        logger.event_count()
    );
    Ok(())
}
