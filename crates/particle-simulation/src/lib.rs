//! # Particle Simulation
//!
//! Fixed-timestep accelerator session: stage transit from the source chamber
//! through the booster and transfer tubes into the collider ring, contact
//! detection with elastic resolution, and the collision product classifier.

pub mod classifier;
pub mod collision;
pub mod command;
pub mod error;
pub mod layout;
pub mod params;
pub mod simulation;
pub mod snapshot;
pub mod transit;

pub use classifier::*;
pub use collision::*;
pub use command::*;
pub use error::*;
pub use layout::*;
pub use params::*;
pub use simulation::*;
pub use snapshot::*;
pub use transit::*;
