//! Renderer-facing particle snapshots

use bytemuck::{Pod, Zeroable};
use particle_physics::Particle;

/// Per-particle instance data, laid out for direct upload to a GPU buffer
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    pub position: [f32; 3],
    pub radius: f32,
    pub color: [f32; 4],
    /// `ParticleKind` discriminant
    pub kind: u32,
    /// `Stage` discriminant
    pub stage: u32,
    pub _padding: [u32; 2],
}

impl From<&Particle> for ParticleInstance {
    fn from(particle: &Particle) -> Self {
        Self {
            position: particle.position.as_vec3().to_array(),
            radius: particle.radius as f32,
            color: particle.kind.color(),
            kind: particle.kind as u32,
            stage: particle.stage as u32,
            _padding: [0; 2],
        }
    }
}
