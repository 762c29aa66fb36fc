//! Per-particle transit state machine
//!
//! `Free -> Boosting -> TubeTransfer -> RingOrbit -> Colliding/Frozen`
//!
//! The stage alone selects the motion regime. Orbiting stages either place
//! the particle by angle (no radius drift) or integrate a centripetal force,
//! depending on [`OrbitModel`].

use glam::DVec3;
use particle_physics::{
    centripetal_force, point_on_orbit, two_d_angle, verlet_step, Beam, OrbitState, Particle,
    ParticleKind, Stage,
};

use crate::layout::{AcceleratorLayout, AcceleratorZone};
use crate::params::OrbitModel;

/// Everything a stage update reads besides the particle itself
#[derive(Debug, Clone, Copy)]
pub struct TransitContext<'a> {
    pub layout: &'a AcceleratorLayout,
    pub rate: f64,
    pub permittivity: f64,
    pub orbit_model: OrbitModel,
}

impl TransitContext<'_> {
    fn dt(&self) -> f64 {
        1.0 / self.rate
    }
}

/// Stage changes reported back to the session for logging
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    EnteredBooster,
    EnteredTube(Beam),
    EnteredCollider(Beam),
}

/// Run one tick of the particle's current stage, including its exit test.
pub fn advance_particle(particle: &mut Particle, ctx: &TransitContext) -> Option<Transition> {
    match particle.stage {
        Stage::Free => {
            verlet_step(particle, ctx.rate);
            if leaves_linac(particle, ctx.layout.linac.exit_z) {
                enter_booster(particle, ctx.layout);
                return Some(Transition::EnteredBooster);
            }
            None
        }
        Stage::Boosting => {
            if let Some(beam) = ready_for_tube(particle, ctx.layout) {
                enter_tube(particle, ctx.layout, beam, ctx.rate);
                return Some(Transition::EnteredTube(beam));
            }
            let booster = &ctx.layout.booster;
            orbit_step(particle, &booster.accelerator, ctx);
            None
        }
        Stage::TubeTransfer => {
            let Some(beam) = particle.beam else {
                particle.move_to(particle.position + particle.velocity * ctx.dt(), ctx.rate);
                return None;
            };
            let tube = ctx.layout.tube(beam);
            let next = particle.position + tube.direction * particle.orbit.speed * ctx.dt();
            particle.move_to(next, ctx.rate);

            if tube.passed_end(particle.position) {
                enter_collider(particle, ctx.layout, beam, ctx.rate);
                return Some(Transition::EnteredCollider(beam));
            }
            None
        }
        Stage::RingOrbit => {
            orbit_step(particle, &ctx.layout.collider.accelerator, ctx);
            None
        }
        Stage::Colliding => {
            particle.halt();
            None
        }
        Stage::Frozen => None,
    }
}

fn leaves_linac(particle: &Particle, exit_z: f64) -> bool {
    particle.kind == ParticleKind::Proton && !particle.completed_linac && particle.position.z < exit_z
}

/// LINAC exit: angular velocity is fixed from the entry speed.
pub fn enter_booster(particle: &mut Particle, layout: &AcceleratorLayout) {
    let booster = &layout.booster;
    let speed = particle.velocity.length();

    particle.completed_linac = true;
    particle.force = DVec3::ZERO;
    particle.orbit = OrbitState::new(booster.centre, booster.orbit_radius, booster.direction, speed);
    particle.stage = Stage::Boosting;
}

fn ready_for_tube(particle: &Particle, layout: &AcceleratorLayout) -> Option<Beam> {
    let beam = particle.beam?;
    let booster = &layout.booster;
    if particle.orbit.speed < booster.boost_complete_speed {
        return None;
    }
    let exit_z = layout.tube(beam).start.z;
    ((particle.position.z - exit_z).abs() < booster.exit_tolerance).then_some(beam)
}

fn enter_tube(particle: &mut Particle, layout: &AcceleratorLayout, beam: Beam, rate: f64) {
    let tube = layout.tube(beam);
    particle.force = DVec3::ZERO;
    particle.teleport(tube.start, tube.direction * particle.orbit.speed, rate);
    particle.stage = Stage::TubeTransfer;
}

/// Snap onto the beam's lane at the nearest angle and start circulating.
fn enter_collider(particle: &mut Particle, layout: &AcceleratorLayout, beam: Beam, rate: f64) {
    let collider = &layout.collider;
    let radius = collider.beam_radius(beam);
    let direction = collider.beam_direction(beam);
    let speed = particle.orbit.speed;

    let angle = two_d_angle(collider.centre, particle.position);
    let entry = point_on_orbit(collider.centre, radius, angle);

    particle.teleport(entry, direction.tangent(angle) * speed, rate);
    particle.orbit = OrbitState::new(collider.centre, radius, direction, speed);
    particle.stage = Stage::RingOrbit;
}

/// One tick around the particle's current orbit, with a linear boost while
/// inside the ring's accelerator zone.
fn orbit_step(particle: &mut Particle, zone: &AcceleratorZone, ctx: &TransitContext) {
    let dt = ctx.dt();
    let orbit = particle.orbit;
    let angle = two_d_angle(orbit.centre, particle.position);
    let tangent = orbit.direction.tangent(angle);
    let in_zone = zone.contains(particle.position);
    let drive = if in_zone {
        zone.drive_force(particle.charge, ctx.permittivity)
    } else {
        0.0
    };

    match ctx.orbit_model {
        OrbitModel::Placement => {
            if in_zone {
                let speed = orbit.speed + drive / particle.mass * dt;
                particle.orbit.speed = speed;
                particle.orbit.angular_velocity = speed / orbit.radius;

                let axis = zone.axis();
                let along = if tangent.dot(axis) < 0.0 { -axis } else { axis };
                particle.move_to(particle.position + along * speed * dt, ctx.rate);
            } else {
                let next_angle = angle + orbit.angle_step(dt);
                particle.move_to(point_on_orbit(orbit.centre, orbit.radius, next_angle), ctx.rate);
            }
        }
        OrbitModel::ForceDriven => {
            particle.force = centripetal_force(particle, orbit.centre, orbit.radius) + tangent * drive;
            verlet_step(particle, ctx.rate);
            let speed = particle.velocity.length();
            particle.orbit.speed = speed;
            particle.orbit.angular_velocity = speed / orbit.radius;
        }
    }
}
