//! Contact detection and two-body elastic resolution

use glam::DVec3;
use particle_physics::{
    apply_pair_impulse, axis_weights, magnitude, quartile_signs, three_d_angle, Particle,
};

/// Value stored on the diagonal of a [`DistanceMatrix`]
pub const DIAGONAL_SENTINEL: f64 = -1.0;

/// Symmetric all-pairs distance table, row-major
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceMatrix {
    size: usize,
    distances: Vec<f64>,
}

impl DistanceMatrix {
    pub fn build(particles: &[Particle]) -> Self {
        let size = particles.len();
        let mut distances = vec![DIAGONAL_SENTINEL; size * size];

        for i in 0..size {
            for j in (i + 1)..size {
                let d = magnitude(particles[i].position, particles[j].position);
                distances[i * size + j] = d;
                distances[j * size + i] = d;
            }
        }

        Self { size, distances }
    }

    pub fn len(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Distance between `i` and `j`; [`DIAGONAL_SENTINEL`] when `i == j`
    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.distances[i * self.size + j]
    }

    /// Unordered pairs `(i, j)`, `i < j`, in scan order
    pub fn pairs(&self) -> impl Iterator<Item = (usize, usize, f64)> + '_ {
        (0..self.size).flat_map(move |i| ((i + 1)..self.size).map(move |j| (i, j, self.get(i, j))))
    }
}

/// Contact normal from `a` to `b`, rebuilt from the angle decomposition
pub fn contact_normal(a: DVec3, b: DVec3) -> DVec3 {
    axis_weights(three_d_angle(a, b)) * quartile_signs(a, b, DVec3::ONE)
}

/// Closing speed of the pair along its contact normal (positive when approaching)
pub fn approach_speed(a: &Particle, b: &Particle) -> f64 {
    let normal = contact_normal(a.position, b.position);
    (a.velocity - b.velocity).dot(normal)
}

/// Momentum exchanged by an elastic contact:
/// `Δp = 2 * m_a * m_b / (m_a + m_b) * resultantSpeed`.
pub fn elastic_momentum(a: &Particle, b: &Particle, resultant_speed: f64) -> f64 {
    2.0 * a.mass * b.mass / (a.mass + b.mass) * resultant_speed
}

/// Resolve an elastic contact between `a` and `b` as equal and opposite
/// positional nudges along the contact normal.
///
/// Returns the momentum delta given to `b` (`a` receives its negation), or
/// `None` when the pair is already separating.
pub fn resolve_elastic(a: &mut Particle, b: &mut Particle, rate: f64) -> Option<DVec3> {
    let speed = approach_speed(a, b);
    if speed <= 0.0 {
        return None;
    }

    let normal = contact_normal(a.position, b.position);
    let impulse = normal * elastic_momentum(a, b, speed);
    apply_pair_impulse(a, b, impulse, rate);
    Some(impulse)
}

/// Mutable access to two distinct elements of a slice
pub fn pair_mut<T>(items: &mut [T], i: usize, j: usize) -> (&mut T, &mut T) {
    debug_assert!(i < j);
    let (head, tail) = items.split_at_mut(j);
    (&mut head[i], &mut tail[0])
}

#[cfg(test)]
mod tests {
    use super::*;
    use particle_physics::ParticleKind;

    const RATE: f64 = 200.0;

    fn moving(id: u64, position: DVec3, velocity: DVec3) -> Particle {
        Particle::new(id, ParticleKind::Proton, position, velocity, RATE)
    }

    #[test]
    fn matrix_is_symmetric_with_sentinel_diagonal() {
        let particles = vec![
            moving(0, DVec3::new(0.0, 0.0, 0.0), DVec3::ZERO),
            moving(1, DVec3::new(3.0, 4.0, 0.0), DVec3::ZERO),
            moving(2, DVec3::new(-1.0, 2.0, 7.0), DVec3::ZERO),
        ];
        let matrix = DistanceMatrix::build(&particles);

        assert_eq!(matrix.len(), 3);
        assert_eq!(matrix.get(0, 1), 5.0);
        for i in 0..3 {
            assert_eq!(matrix.get(i, i), DIAGONAL_SENTINEL);
            for j in 0..3 {
                assert_eq!(matrix.get(i, j), matrix.get(j, i));
            }
        }
        assert_eq!(matrix.pairs().count(), 3);
        assert!(DistanceMatrix::build(&[]).is_empty());
    }

    #[test]
    fn equal_masses_exchange_velocities_head_on() {
        let mut a = moving(0, DVec3::new(-0.2, 0.0, 0.0), DVec3::new(4.0, 0.0, 0.0));
        let mut b = moving(1, DVec3::new(0.2, 0.0, 0.0), DVec3::new(-4.0, 0.0, 0.0));

        let impulse = resolve_elastic(&mut a, &mut b, RATE);
        assert!(impulse.is_some());
        assert!((a.velocity - DVec3::new(-4.0, 0.0, 0.0)).length() < 1e-9);
        assert!((b.velocity - DVec3::new(4.0, 0.0, 0.0)).length() < 1e-9);
    }

    #[test]
    fn oblique_contact_conserves_momentum() {
        let mut a = moving(0, DVec3::new(0.0, 0.0, 0.0), DVec3::new(2.0, 1.0, -3.0));
        let mut b = moving(1, DVec3::new(0.2, 0.3, -0.1), DVec3::new(-1.0, 0.5, 0.0)).with_mass(2.5);
        let before = a.velocity * a.mass + b.velocity * b.mass;

        let impulse = resolve_elastic(&mut a, &mut b, RATE).unwrap();
        let after = a.velocity * a.mass + b.velocity * b.mass;
        assert!((after - before).length() < 1e-9);

        // Nudges are the same impulse scaled by each inverse mass
        let shift_a = a.position - DVec3::ZERO;
        let shift_b = b.position - DVec3::new(0.2, 0.3, -0.1);
        assert!((shift_a * a.mass * RATE + impulse).length() < 1e-9);
        assert!((shift_b * b.mass * RATE - impulse).length() < 1e-9);
    }

    #[test]
    fn separating_pair_is_left_alone() {
        let mut a = moving(0, DVec3::new(-0.2, 0.0, 0.0), DVec3::new(-1.0, 0.0, 0.0));
        let mut b = moving(1, DVec3::new(0.2, 0.0, 0.0), DVec3::new(1.0, 0.0, 0.0));
        assert_eq!(resolve_elastic(&mut a, &mut b, RATE), None);
        assert_eq!(a.velocity, DVec3::new(-1.0, 0.0, 0.0));
    }
}
