//! Acoustics Simulation
//!
//! Runs the demo village for a number of turns and prints what the player
//! hears and which hordes were signalled.

use bevy_ecs::prelude::*;
use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use acoustics::audio::{AudioCues, TracingSink};
use acoustics::config::{default_config_toml, AcousticsConfig};
use acoustics::events::SoundLogger;
use acoustics::systems::HordeSignals;
use acoustics::output::MessageLog;
use acoustics::setup;
use acoustics::systems::absorption::refresh_absorption;
use acoustics::{build_turn_schedule, insert_sound_resources, SimRng, SimulationState};

/// Command line arguments for the simulation
#[derive(Parser, Debug)]
#[command(name = "acoustics_sim")]
#[command(about = "Sound propagation and hearing in a small village")]
struct Args {
    /// Random seed for reproducibility (overrides the config file)
    #[arg(long)]
    seed: Option<u64>,

    /// Number of turns to simulate (overrides the config file)
    #[arg(long)]
    turns: Option<u64>,

    /// Map side in submaps (overrides the config file)
    #[arg(long)]
    submaps: Option<usize>,

    /// Configuration file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write every propagated sound to this JSONL file
    #[arg(long)]
    log: Option<PathBuf>,

    /// Print the default configuration and exit
    #[arg(long)]
    print_config: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    if args.print_config {
        match default_config_toml() {
            Ok(text) => print!("{}", text),
            Err(e) => eprintln!("Could not render the default config: {}", e),
        }
        return;
    }

    let mut config = match &args.config {
        Some(path) => AcousticsConfig::from_file(path).unwrap_or_else(|e| {
            warn!(error = %e, path = %path.display(), "Could not load config, using defaults");
            AcousticsConfig::default()
        }),
        None => AcousticsConfig::load_or_default(),
    };
    if let Some(seed) = args.seed {
        config.simulation.seed = seed;
    }
    if let Some(turns) = args.turns {
        config.simulation.turns = turns;
    }
    if let Some(submaps) = args.submaps {
        config.simulation.map_submaps = submaps;
    }
    let sim = &config.simulation;

    println!("Acoustics Simulation");
    println!("====================");
    println!("Seed: {}", sim.seed);
    println!("Turns: {}", sim.turns);
    println!("Season: {}", config.weather.season);
    println!();

    let mut world = World::new();

    if config.audio.worker_enabled {
        match AudioCues::start(Arc::new(TracingSink), config.audio.sfx_volume_multiplier) {
            Ok(cues) => {
                world.insert_resource(cues);
            }
            Err(e) => warn!(error = %e, "Audio worker failed to start, running headless"),
        }
    }

    println!("Creating village map...");
    let map = setup::create_village_map(sim.map_submaps);
    let map_size = map.size() as i32;
    println!("  {0}x{0} tiles", map_size);
    insert_sound_resources(&mut world, map, config.weather.to_weather(), sim.seed);
    world.resource_mut::<SimulationState>().max_turns = sim.turns;

    if let Some(path) = &args.log {
        match SoundLogger::new(path) {
            Ok(logger) => {
                world.insert_resource(logger);
                println!("  Logging sounds to {}", path.display());
            }
            Err(e) => eprintln!("  Warning: Could not open sound log: {}", e),
        }
    }

    println!("Spawning listeners...");
    let summary = {
        // Take the RNG out to avoid borrow conflicts
        let Some(mut sim_rng) = world.remove_resource::<SimRng>() else {
            eprintln!("Simulation RNG missing");
            return;
        };
        let summary = setup::spawn_all_listeners(&mut world, map_size, &mut sim_rng.0);
        world.insert_resource(sim_rng);
        summary
    };
    println!("  {}", summary);

    let mut schedule = build_turn_schedule();
    schedule.add_systems(
        (
            setup::wander_monsters,
            setup::make_village_noise,
            setup::villagers_fight,
        )
            .chain()
            .before(refresh_absorption),
    );

    println!();
    println!("Starting simulation...");
    println!();

    let mut signal_count = 0;
    for turn in 0..sim.turns {
        world.resource_mut::<SimulationState>().current_turn = turn;

        schedule.run(&mut world);

        for message in world.resource_mut::<MessageLog>().drain() {
            println!("[Turn {:>4}] {}", turn, message);
        }
        for signal in world.resource_mut::<HordeSignals>().drain() {
            signal_count += 1;
            println!(
                "[Turn {:>4}] Hordes near {} signalled (strength {})",
                turn, signal.region, signal.strength
            );
        }
    }

    if let Some(mut logger) = world.get_resource_mut::<SoundLogger>() {
        if let Err(e) = logger.flush() {
            eprintln!("Warning: Could not flush sound log: {}", e);
        }
        info!(records = logger.record_count(), "Sound log written");
    }
    if let Some(mut cues) = world.get_resource_mut::<AudioCues>() {
        cues.shutdown();
    }

    println!();
    println!(
        "Simulation complete. Ran {} turns, {} horde signals.",
        sim.turns, signal_count
    );
}
