//! Classroom Sim - Headless runner
//!
//! Builds a classroom from a TOML config (or the defaults), runs a fixed number
//! of ticks and prints ASCII frames and a summary, or the final state as JSON.

use std::path::PathBuf;

use clap::Parser;
use serde::Serialize;
use tracing_subscriber::EnvFilter;

use classroom_sim::classroom::{ClassroomSnapshot, EventLog};
use classroom_sim::core::config::load_or_create_config;
use classroom_sim::{Classroom, ClassroomConfig, Result};

/// Classroom Sim - children chase candy, teachers chase children
#[derive(Parser, Debug)]
#[command(name = "classroom-sim")]
#[command(about = "Run the classroom candy-chase simulation headless")]
struct Args {
    /// TOML config file; written with the defaults if it does not exist
    #[arg(long)]
    config: Option<PathBuf>,

    /// Number of ticks to run
    #[arg(long, default_value_t = 100)]
    ticks: u64,

    /// Override the config seed
    #[arg(long)]
    seed: Option<u64>,

    /// Simulation seconds per tick
    #[arg(long, default_value_t = 1.0)]
    dt: f64,

    /// Print an ASCII frame every N ticks (0 disables frames)
    #[arg(long, default_value_t = 0)]
    print_every: u64,

    /// Print the final snapshot and run totals as JSON
    #[arg(long)]
    json: bool,
}

/// JSON output structure
#[derive(Serialize)]
struct RunReport {
    seed: u64,
    ticks: u64,
    captures: usize,
    deliveries: usize,
    candies_spawned: usize,
    candies_collected: usize,
    final_state: ClassroomSnapshot,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("classroom_sim=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let mut config = match &args.config {
        Some(path) => load_or_create_config(path)?,
        None => ClassroomConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }
    let seed = config.seed;

    let mut classroom = Classroom::from_config(config)?;
    let mut log = EventLog::new();

    tracing::info!(ticks = args.ticks, dt = args.dt, "Starting run");

    for _ in 0..args.ticks {
        let events = classroom.advance(args.dt);
        log.record(classroom.tick_count(), classroom.time(), events);

        if !args.json && args.print_every > 0 && classroom.tick_count() % args.print_every == 0 {
            println!("--- tick {} ---", classroom.tick_count());
            print!("{}", classroom.render_ascii());
        }
    }

    tracing::info!(
        captures = log.captures(),
        deliveries = log.deliveries(),
        candies = log.candies_collected(),
        "Run finished"
    );

    let snapshot = classroom.snapshot();
    if args.json {
        let report = RunReport {
            seed,
            ticks: args.ticks,
            captures: log.captures(),
            deliveries: log.deliveries(),
            candies_spawned: log.candies_spawned(),
            candies_collected: log.candies_collected(),
            final_state: snapshot,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", snapshot.summary());
        println!(
            "{} captures, {} deliveries, {} candies spawned",
            log.captures(),
            log.deliveries(),
            log.candies_spawned()
        );
    }

    Ok(())
}
