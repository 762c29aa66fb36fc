//! Error types for simulation setup

use thiserror::Error;

/// Rejected parameter sets.
///
/// Validation is the only fallible step of the simulation: once a
/// [`SimulationWorld`](crate::SimulationWorld) exists, ticks and commands never fail.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParamsError {
    #[error("Tick rate must be positive, got {0}")]
    NonPositiveRate(f64),

    #[error("Catch-up limit must allow at least one tick")]
    ZeroCatchUp,

    #[error("Invalid particle parameter {name}: {value}")]
    InvalidParticle { name: &'static str, value: f64 },

    #[error("Softening distance must be positive, got {0}")]
    NonPositiveSoftening(f64),

    #[error("Permittivity must be positive, got {0}")]
    NonPositivePermittivity(f64),

    #[error("Source chamber must hold at least one particle")]
    ZeroCapacity,

    #[error("Orbit radius of the {stage} must be positive, got {radius}")]
    NonPositiveOrbitRadius { stage: &'static str, radius: f64 },

    #[error("Beam offset {offset} does not fit inside the collider radius {radius}")]
    BeamOffsetTooLarge { offset: f64, radius: f64 },

    #[error("Accelerator zone of the {stage} has a non-positive size")]
    DegenerateZone { stage: &'static str },

    #[error("Transfer tube {beam} must have a direction and a positive length")]
    DegenerateTube { beam: &'static str },

    #[error("Energy range [{min}, {max}] is empty")]
    EmptyEnergyRange { min: f64, max: f64 },

    #[error("Playfield bounds are inverted")]
    InvertedPlayfield,
}
