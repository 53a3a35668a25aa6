//! Headless runner for the boids simulation.
//!
//! Loads configuration, builds the flock, then ticks it at the configured
//! frame rate, publishing snapshots through the configured transport until
//! Ctrl+C or the tick budget is reached.

mod stats;

use boids_config::{load_config, Config, ConfigLoader};
use boids_simulation::Flock;
use boids_transport::TransportController;
use clap::Parser;
use log::{debug, info, warn};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::stats::TickStats;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the simulation configuration file (.json or .toml); built-in defaults when omitted
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Stop after this many ticks instead of running until Ctrl+C
    #[arg(short, long)]
    ticks: Option<u64>,

    /// Override the RNG seed from the configuration
    #[arg(long)]
    seed: Option<u64>,

    /// Update agents on all cores
    #[arg(long)]
    parallel: bool,

    /// Tick as fast as possible instead of pacing to the configured framerate
    #[arg(long)]
    unpaced: bool,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = resolve_config(&args)?;

    let mut flock = Flock::new(&config.simulation)?;
    let mut transport = TransportController::from_config(&config.transport)?;

    let running = Arc::new(AtomicBool::new(true));
    {
        let running = Arc::clone(&running);
        ctrlc::set_handler(move || running.store(false, Ordering::SeqCst))?;
    }

    let frame_duration = (!args.unpaced)
        .then(|| Duration::from_secs_f64(1.0 / f64::from(config.framerate)));
    match frame_duration {
        Some(duration) => info!("Running at {} FPS ({:?} per tick)", config.framerate, duration),
        None => info!("Running unpaced"),
    }

    let stats = run(&mut flock, &mut transport, &running, frame_duration, args.ticks)?;
    transport.flush()?;

    stats.report();
    info!("Published {} frames.", transport.frames_sent());
    Ok(())
}

/// Loads the configuration file (or defaults) and applies command line overrides.
fn resolve_config(args: &Args) -> Result<Config, boids_config::ConfigError> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from {}", path.display());
            load_config(path)?
        }
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(seed) = args.seed {
        config.simulation.flock.seed = Some(seed);
    }
    if args.parallel {
        config.simulation.flock.parallel = true;
    }

    ConfigLoader::validate(&config)?;
    Ok(config)
}

/// Ticks until `running` is cleared or `max_ticks` is reached.
fn run(
    flock: &mut Flock,
    transport: &mut TransportController,
    running: &AtomicBool,
    frame_duration: Option<Duration>,
    max_ticks: Option<u64>,
) -> Result<TickStats, Box<dyn std::error::Error>> {
    let mut stats = TickStats::new()?;

    while running.load(Ordering::SeqCst) {
        if max_ticks.is_some_and(|max| flock.tick_count() >= max) {
            break;
        }

        let frame_start = Instant::now();
        flock.tick();
        stats.record(frame_start.elapsed());

        transport.publish(&flock.snapshot())?;

        if flock.tick_count() % 100 == 0 {
            debug!("frame {} done", flock.tick_count());
        }

        if let Some(target) = frame_duration {
            let elapsed = frame_start.elapsed();
            if elapsed < target {
                spin_sleep::sleep(target - elapsed);
            } else {
                stats.record_lag();
                warn!(
                    "Frame lag detected: {:?} > {:?} at tick {}",
                    elapsed,
                    target,
                    flock.tick_count()
                );
            }
        }
    }

    if !running.load(Ordering::SeqCst) {
        info!("Interrupted after {} ticks", flock.tick_count());
    }
    Ok(stats)
}
