//! Scenario files: simulation parameters plus a timed command schedule

use std::collections::VecDeque;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use particle_simulation::{Command, SimulationParams, SimulationWorld};
use serde::Deserialize;

fn default_ticks() -> u64 {
    8000
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    /// Partial parameter overrides on top of the defaults
    #[serde(default)]
    pub params: SimulationParams,
    #[serde(default)]
    pub schedule: Vec<ScheduledCommand>,
    /// Run length in ticks
    #[serde(default = "default_ticks")]
    pub ticks: u64,
}

/// One schedule entry, e.g. `{ at: 300, command: activate_chamber, retry: true }`
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ScheduledCommand {
    pub at: u64,
    #[serde(flatten)]
    pub command: Command,
    /// Keep re-applying every tick until the command is accepted
    #[serde(default)]
    pub retry: bool,
}

impl Scenario {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open scenario {}", path.display()))?;
        let scenario = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse scenario {}", path.display()))?;
        Ok(scenario)
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("failed to parse scenario")
    }
}

/// Feeds scheduled commands into a world as their ticks come due
pub struct Playback {
    due: VecDeque<ScheduledCommand>,
    waiting: Vec<ScheduledCommand>,
}

impl Playback {
    pub fn new(mut schedule: Vec<ScheduledCommand>) -> Self {
        schedule.sort_by_key(|entry| entry.at);
        Self {
            due: schedule.into(),
            waiting: Vec::new(),
        }
    }

    /// Apply everything scheduled up to the world's current tick.
    /// Call once before each `step`.
    pub fn apply_due(&mut self, world: &mut SimulationWorld) {
        let tick = world.tick();

        self.waiting.retain(|entry| {
            let accepted = world.apply(entry.command.clone());
            if accepted {
                log::info!("[tick {}] {} accepted after retrying", tick, entry.command.name());
            }
            !accepted
        });

        while self.due.front().is_some_and(|entry| entry.at <= tick) {
            let Some(entry) = self.due.pop_front() else {
                break;
            };
            if world.apply(entry.command.clone()) {
                log::info!("[tick {}] {}", tick, entry.command.name());
            } else if entry.retry {
                log::debug!("[tick {}] {} not ready, retrying", tick, entry.command.name());
                self.waiting.push(entry);
            } else {
                log::warn!("[tick {}] {} rejected", tick, entry.command.name());
            }
        }
    }

    pub fn waiting(&self) -> usize {
        self.waiting.len()
    }

    /// Nothing left to apply
    pub fn is_finished(&self) -> bool {
        self.due.is_empty() && self.waiting.is_empty()
    }
}

/// Apply command-line overrides to the loaded parameters
pub fn override_params(params: &mut SimulationParams, seed: Option<u64>, rate: Option<f64>) {
    if let Some(seed) = seed {
        params.seed = seed;
    }
    if let Some(rate) = rate {
        params.integration.rate = rate;
    }
}
