//! Fixed-step position Verlet integrator
//!
//! Velocity is reconstructed from the position history rather than stored:
//! the acceleration is folded into the previous position, the velocity is
//! read off the history, and the position is advanced by one tick.

use crate::particle::Particle;

/// Advance one particle by exactly one tick of length `1 / rate`.
///
/// 1. `a = F / m`
/// 2. `x_prev -= a / rate²`
/// 3. `v = (x - x_prev) * rate`
/// 4. `x_prev = x`
/// 5. `x += v / rate`
///
/// This is a mutation with one tick's effect; call it once per tick.
pub fn verlet_step(particle: &mut Particle, rate: f64) {
    particle.acceleration = particle.force / particle.mass;
    particle.previous_position -= particle.acceleration / (rate * rate);
    particle.velocity = (particle.position - particle.previous_position) * rate;
    particle.previous_position = particle.position;
    particle.position += particle.velocity / rate;
}
