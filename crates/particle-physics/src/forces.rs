//! Force model
//!
//! Forces are evaluated as scalars and projected back onto the axes through
//! [`three_d_angle`] and [`quartile_signs`]. Electrostatic interactions are
//! applied as momentum deltas turned into positional nudges, which the Verlet
//! history then reads back as a velocity change.

use std::f64::consts::PI;

use glam::DVec3;

use crate::geometry::{project, quartile_signs, three_d_angle};
use crate::particle::Particle;

/// Coulomb's law: `F = k * q1 * q2 / r²`
///
/// Positive for like charges (repulsive). `r` is clamped to `softening`.
pub fn coulomb_magnitude(k: f64, q1: f64, q2: f64, r: f64, softening: f64) -> f64 {
    let r = r.abs().max(softening);
    k * q1 * q2 / (r * r)
}

/// Positional shift produced by a momentum delta over one tick
pub fn momentum_to_shift(momentum: DVec3, mass: f64, rate: f64) -> DVec3 {
    momentum / (mass * rate)
}

/// Momentum delta exchanged by a pair over one tick.
///
/// The returned vector is the delta for `b`; `a` receives its negation.
/// Like charges push `b` away from `a`. Callers only pair like charges.
pub fn pair_coulomb_impulse(a: &Particle, b: &Particle, k: f64, softening: f64, rate: f64) -> DVec3 {
    let r = (b.position - a.position).length();
    let force = coulomb_magnitude(k, a.charge, b.charge, r, softening);
    let change_in_momentum = force * rate;

    let angles = three_d_angle(a.position, b.position);
    let signs = quartile_signs(a.position, b.position, DVec3::ONE);
    project(change_in_momentum, angles, signs)
}

/// Applies an equal and opposite momentum delta as positional nudges.
///
/// `a` moves by `-impulse / (m_a * rate)` and `b` by `+impulse / (m_b * rate)`.
/// Only the current position moves, so the derived velocities change by
/// `∓impulse / m` and the pair's total momentum is unchanged.
pub fn apply_pair_impulse(a: &mut Particle, b: &mut Particle, impulse: DVec3, rate: f64) {
    let shift_a = momentum_to_shift(impulse, a.mass, rate);
    let shift_b = momentum_to_shift(impulse, b.mass, rate);

    a.position -= shift_a;
    a.velocity -= shift_a * rate;
    b.position += shift_b;
    b.velocity += shift_b * rate;
}

/// Repulsion from a charged plate perpendicular to `normal`.
///
/// `plate_centre` is the plate's centre and `half_thickness` half its extent
/// along `normal`. The plate acts only when the particle's axial separation
/// from the centre is below `clearance`, and only along the normal axis.
/// Returns the positional shift for this tick.
pub fn wall_coulomb_shift(
    particle: &Particle,
    plate_centre: DVec3,
    normal: DVec3,
    half_thickness: f64,
    clearance: f64,
    plate_charge: f64,
    k: f64,
    softening: f64,
    rate: f64,
) -> DVec3 {
    let normal = normal.normalize_or_zero();
    let axial = (particle.position - plate_centre).dot(normal);
    if axial.abs() >= clearance {
        return DVec3::ZERO;
    }

    let face_distance = axial.abs() - half_thickness;
    let force = coulomb_magnitude(k, particle.charge, plate_charge, face_distance, softening);
    let away = if axial < 0.0 { -normal } else { normal };

    momentum_to_shift(away * force * rate, particle.mass, rate)
}

/// Centripetal force `m * v² / R` toward `centre`, in the horizontal plane of
/// the particle.
pub fn centripetal_force(particle: &Particle, centre: DVec3, radius: f64) -> DVec3 {
    let speed = particle.velocity.length();
    let magnitude = particle.mass * speed * speed / radius;

    let centre = DVec3::new(centre.x, particle.position.y, centre.z);
    let angles = three_d_angle(particle.position, centre);
    let signs = quartile_signs(particle.position, centre, DVec3::ONE);
    project(magnitude, angles, signs)
}

/// Axial field of the linear accelerator bore, as seen at axial distance
/// `distance` from the end terminal:
/// `scale * q * d / (4π ε₀ (R² + d²)^{3/2})`.
pub fn linac_drive_force(charge: f64, distance: f64, bore_radius: f64, permittivity: f64, scale: f64) -> f64 {
    let denominator = 4.0 * PI * permittivity * (bore_radius * bore_radius + distance * distance).powf(1.5);
    charge * distance / denominator * scale
}

/// Drive force of a parallel-plate accelerator gap of height `h`:
/// `2 * q / (h² ε₀)`.
pub fn plate_drive_force(charge: f64, height: f64, permittivity: f64) -> f64 {
    2.0 * charge / (height * height * permittivity)
}
