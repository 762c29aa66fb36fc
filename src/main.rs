//! Headless particle accelerator simulation
//!
//! Runs a scenario (parameters plus a timed command schedule) through the
//! source chamber, LINAC, booster, transfer tubes and collider ring, logging
//! stage transitions and collision readings.

mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use particle_physics::Stage;
use particle_simulation::SimulationWorld;
use script::{override_params, Playback, Scenario};

#[derive(Parser, Debug)]
#[command(name = "collider-sim")]
#[command(about = "Fixed-timestep particle accelerator simulation")]
struct Args {
    /// Scenario file (YAML)
    #[arg(short, long, default_value = "scenarios/default.yaml")]
    file: PathBuf,

    /// Run length in ticks, overriding the scenario
    #[arg(long)]
    ticks: Option<u64>,

    /// RNG seed for energy sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Integration rate in Hz
    #[arg(long)]
    rate: Option<f64>,
}

/// Resolve relative scenario names against the bundled `scenarios/` directory
fn scenario_path(file: PathBuf) -> PathBuf {
    if file.exists() || file.is_absolute() {
        return file;
    }
    let bundled = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join(&file);
    if bundled.exists() {
        return bundled;
    }
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("scenarios").join(file)
}

fn stage_counts(world: &SimulationWorld) -> [usize; 6] {
    let mut counts = [0; 6];
    for p in world.particles() {
        counts[p.stage as usize] += 1;
    }
    counts
}

fn log_stages(world: &SimulationWorld) {
    let [free, boosting, tube, ring, colliding, frozen] = stage_counts(world);
    log::debug!(
        "[tick {}] free {} | boosting {} | tube {} | ring {} | colliding {} | frozen {}",
        world.tick(),
        free,
        boosting,
        tube,
        ring,
        colliding,
        frozen
    );
}

fn main() -> Result<()> {
    // Initialize logger (RUST_LOG=debug for verbose output)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let path = scenario_path(args.file);
    let mut scenario = Scenario::load(&path)?;
    override_params(&mut scenario.params, args.seed, args.rate);
    let ticks = args.ticks.unwrap_or(scenario.ticks);

    log::info!("Running {} for {} ticks", path.display(), ticks);

    let report_every = (scenario.params.integration.rate.round() as u64).max(1);
    let mut world = SimulationWorld::new(scenario.params).context("invalid simulation parameters")?;
    let mut playback = Playback::new(scenario.schedule);

    for _ in 0..ticks {
        playback.apply_due(&mut world);
        world.step();

        if world.tick() % report_every == 0 {
            log_stages(&world);
        }
        if world.has_collided() && playback.is_finished() {
            log::info!("Collision recorded with nothing left to schedule, stopping");
            break;
        }
    }

    let estimate = world.estimate();
    log::info!(
        "Finished at tick {}: {} reading(s), {} live particle(s), mean Higgs probability {:.4}",
        world.tick(),
        world.reports().len(),
        world.particle_count(),
        estimate.mean_probability()
    );
    if world.reports().is_empty() {
        log_stages(&world);
        let ring = stage_counts(&world)[Stage::RingOrbit as usize];
        log::warn!("No collision recorded ({} particle(s) on the collider ring)", ring);
    }

    Ok(())
}
