//! Operator commands
//!
//! Commands are queued with [`SimulationWorld::submit`](crate::SimulationWorld::submit)
//! and drained at the start of the next tick. A command whose preconditions
//! do not hold is dropped without effect.

use glam::DVec3;
use particle_physics::ParticleKind;
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "command", rename_all = "snake_case")]
pub enum Command {
    /// Place an arbitrary particle in the Free stage
    SpawnParticle {
        kind: ParticleKind,
        position: DVec3,
        #[serde(default)]
        velocity: DVec3,
    },
    /// Pump one hydrogen atom into the source chamber
    SpawnHydrogen,
    SealChamber,
    ActivateChamber,
    StartCollider,
    TriggerCollision,
    Reset,
    NextReading,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::SpawnParticle { .. } => "spawn_particle",
            Command::SpawnHydrogen => "spawn_hydrogen",
            Command::SealChamber => "seal_chamber",
            Command::ActivateChamber => "activate_chamber",
            Command::StartCollider => "start_collider",
            Command::TriggerCollision => "trigger_collision",
            Command::Reset => "reset",
            Command::NextReading => "next_reading",
        }
    }
}
