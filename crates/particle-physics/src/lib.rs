//! # Particle Physics
//!
//! Numerical core of the accelerator simulation: vector geometry, the
//! position-Verlet integrator, the electrostatic and centripetal force model
//! and the particle record with its kind capability table.

pub mod color;
pub mod constants;
pub mod forces;
pub mod geometry;
pub mod integrator;
pub mod particle;

pub use constants::*;
pub use forces::*;
pub use geometry::*;
pub use integrator::*;
pub use particle::*;
