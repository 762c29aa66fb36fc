//! Accelerator simulation session
//!
//! One [`SimulationWorld`] owns every particle, the accelerator layout and the
//! running estimate. The host drives it with [`SimulationWorld::advance`] (or
//! [`SimulationWorld::step`] for exactly one tick) and queues operator actions
//! with [`SimulationWorld::submit`]; queued commands are applied at the start
//! of the next tick.

use std::collections::VecDeque;
use std::f64::consts::TAU;

use glam::DVec3;
use particle_physics::{
    apply_pair_impulse, linac_drive_force, midpoint, pair_coulomb_impulse, two_d_angle,
    wall_coulomb_shift, Beam, OrbitDirection, Particle, ParticleId, ParticleKind, Stage,
};
use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::classifier::{classify, sample_energy, CollisionCategory, CollisionReport, RunningEstimate};
use crate::collision::{approach_speed, pair_mut, resolve_elastic, DistanceMatrix};
use crate::command::Command;
use crate::error::ParamsError;
use crate::layout::{AcceleratorLayout, Plate};
use crate::params::{PairMode, SimulationParams};
use crate::snapshot::ParticleInstance;
use crate::transit::{advance_particle, Transition, TransitContext};

/// A resolved collider collision
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionEvent {
    pub participants: (ParticleId, ParticleId),
    pub midpoint: DVec3,
    pub category: CollisionCategory,
    pub products: Vec<&'static str>,
    pub energy: f64,
}

pub struct SimulationWorld {
    params: SimulationParams,
    layout: AcceleratorLayout,
    particles: Vec<Particle>,
    commands: VecDeque<Command>,
    distances: DistanceMatrix,

    next_id: ParticleId,
    tick: u64,
    accumulator: f64,
    last_spawn_tick: Option<u64>,

    /// Beam particles are routed to the classifier instead of bouncing
    armed: bool,
    /// A terminal collision happened; physics waits for reset/next reading
    collided: bool,

    estimate: RunningEstimate,
    reading_number: u32,
    events: Vec<CollisionEvent>,
    reports: Vec<CollisionReport>,
    rng: StdRng,
}

impl SimulationWorld {
    pub fn new(params: SimulationParams) -> Result<Self, ParamsError> {
        params.validate()?;
        log::info!(
            "Initializing SimulationWorld at {} Hz ({:?} orbits, seed {})",
            params.integration.rate,
            params.orbit_model,
            params.seed
        );

        Ok(Self {
            layout: AcceleratorLayout::new(&params),
            rng: StdRng::seed_from_u64(params.seed),
            params,
            particles: Vec::new(),
            commands: VecDeque::new(),
            distances: DistanceMatrix::default(),
            next_id: 0,
            tick: 0,
            accumulator: 0.0,
            last_spawn_tick: None,
            armed: false,
            collided: false,
            estimate: RunningEstimate::new(),
            reading_number: 1,
            events: Vec::new(),
            reports: Vec::new(),
        })
    }

    // Accessors

    pub fn params(&self) -> &SimulationParams {
        &self.params
    }

    pub fn layout(&self) -> &AcceleratorLayout {
        &self.layout
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn particle(&self, id: ParticleId) -> Option<&Particle> {
        self.particles.iter().find(|p| p.id == id)
    }

    pub fn particle_count(&self) -> usize {
        self.particles.len()
    }

    /// Renderer snapshot of every live particle
    pub fn instances(&self) -> Vec<ParticleInstance> {
        self.particles.iter().map(ParticleInstance::from).collect()
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    /// Distances computed by the last tick
    pub fn distance_matrix(&self) -> &DistanceMatrix {
        &self.distances
    }

    pub fn estimate(&self) -> &RunningEstimate {
        &self.estimate
    }

    pub fn reading_number(&self) -> u32 {
        self.reading_number
    }

    pub fn last_event(&self) -> Option<&CollisionEvent> {
        self.events.last()
    }

    pub fn events(&self) -> &[CollisionEvent] {
        &self.events
    }

    pub fn last_report(&self) -> Option<&CollisionReport> {
        self.reports.last()
    }

    pub fn reports(&self) -> &[CollisionReport] {
        &self.reports
    }

    pub fn is_armed(&self) -> bool {
        self.armed
    }

    pub fn has_collided(&self) -> bool {
        self.collided
    }

    pub fn pending_commands(&self) -> usize {
        self.commands.len()
    }

    // Time stepping

    /// Queue a command for the start of the next tick
    pub fn submit(&mut self, command: Command) {
        self.commands.push_back(command);
    }

    /// Advance by `dt` seconds of host time, running as many whole ticks as
    /// have accumulated (at most `max_catch_up_ticks`).
    pub fn advance(&mut self, dt: f64) {
        let rate = self.params.integration.rate;
        let max_ticks = self.params.integration.max_catch_up_ticks;
        self.accumulator += dt.max(0.0);

        let mut ran = 0;
        while self.accumulator * rate >= 1.0 && ran < max_ticks {
            self.step();
            self.accumulator -= 1.0 / rate;
            ran += 1;
        }

        if ran == max_ticks && self.accumulator * rate >= 1.0 {
            log::debug!(
                "Dropping {:.0} ticks of backlog at tick {}",
                (self.accumulator * rate).floor(),
                self.tick
            );
            self.accumulator %= 1.0 / rate;
        }
    }

    /// Run exactly one tick
    pub fn step(&mut self) {
        while let Some(command) = self.commands.pop_front() {
            self.apply(command);
        }
        self.tick += 1;

        if !self.collided {
            self.run_transit();
            self.cull_out_of_bounds();
            if !self.layout.source.activated {
                self.apply_coulomb_pairs();
                self.apply_plate_repulsion();
            }
            if self.params.collider.auto_arm && !self.armed && self.beams_ready() {
                self.armed = true;
                log::info!("Collider armed automatically at tick {}", self.tick);
            }
        }

        self.distances = DistanceMatrix::build(&self.particles);
        if !self.collided {
            self.detect_collisions();
        }
    }

    fn run_transit(&mut self) {
        let ctx = TransitContext {
            layout: &self.layout,
            rate: self.params.integration.rate,
            permittivity: self.params.electrostatics.permittivity,
            orbit_model: self.params.orbit_model,
        };

        for particle in &mut self.particles {
            match advance_particle(particle, &ctx) {
                Some(Transition::EnteredBooster) => log::info!(
                    "Particle {} left the LINAC at {:.1} u/s (ω = {:.3} rad/s)",
                    particle.id,
                    particle.orbit.speed,
                    particle.orbit.angular_velocity
                ),
                Some(Transition::EnteredTube(beam)) => log::info!(
                    "Particle {} left the booster into tube {} at {:.1} u/s",
                    particle.id,
                    beam.symbol(),
                    particle.orbit.speed
                ),
                Some(Transition::EnteredCollider(beam)) => log::info!(
                    "Particle {} entered the collider on beam {} ({:?})",
                    particle.id,
                    beam.symbol(),
                    particle.orbit.direction
                ),
                None => {}
            }
        }
    }

    fn cull_out_of_bounds(&mut self) {
        let playfield = &self.params.playfield;
        let before = self.particles.len();
        self.particles.retain(|p| playfield.contains(p.position));
        let removed = before - self.particles.len();
        if removed > 0 {
            log::debug!("Removed {} particle(s) outside the playfield", removed);
        }
    }

    fn apply_coulomb_pairs(&mut self) {
        let e = &self.params.electrostatics;
        let rate = self.params.integration.rate;
        let n = self.particles.len();

        let pairs: Vec<(usize, usize)> = match e.pair_mode {
            PairMode::Adjacent => (1..n).map(|j| (j - 1, j)).collect(),
            PairMode::AllPairs => (0..n)
                .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
                .collect(),
        };

        for (i, j) in pairs {
            let (a, b) = pair_mut(&mut self.particles, i, j);
            // Only like charges interact; the pair force is always repulsive
            if a.stage != Stage::Free || b.stage != Stage::Free || a.charge * b.charge <= 0.0 {
                continue;
            }
            let distance = (b.position - a.position).length();
            if distance == 0.0 || distance >= e.pair_cutoff {
                continue;
            }
            let impulse = pair_coulomb_impulse(a, b, e.coulomb_constant, e.softening, rate);
            apply_pair_impulse(a, b, impulse, rate);
        }
    }

    fn apply_plate_repulsion(&mut self) {
        let source = &self.layout.source;
        let mut plates: Vec<&Plate> = vec![&source.nozzle];
        if source.sealed {
            plates.push(&source.seal_wall);
        }

        let e = &self.params.electrostatics;
        let rate = self.params.integration.rate;
        let plate_charge = self.params.particle.charge;

        for particle in self.particles.iter_mut().filter(|p| p.stage == Stage::Free) {
            for plate in &plates {
                let shift = wall_coulomb_shift(
                    particle,
                    plate.centre,
                    plate.normal,
                    plate.half_thickness(),
                    plate.clearance(e.wall_clearance),
                    plate_charge,
                    e.coulomb_constant,
                    e.softening,
                    rate,
                );
                particle.position += shift;
                particle.velocity += shift * rate;
            }
        }
    }

    /// Fast beam particles on both lanes of the collider
    fn beams_ready(&self) -> bool {
        let fast = |beam: Beam| {
            self.particles.iter().any(|p| {
                p.stage == Stage::RingOrbit
                    && p.beam == Some(beam)
                    && p.orbit.speed > self.layout.collider.min_collision_speed
            })
        };
        self.layout.collider.started && fast(Beam::Positive) && fast(Beam::Negative)
    }

    // Collisions

    fn detect_collisions(&mut self) {
        let rate = self.params.integration.rate;

        if !self.armed {
            let contacts: Vec<(usize, usize)> = self
                .distances
                .pairs()
                .filter(|&(i, j, d)| {
                    let (a, b) = (&self.particles[i], &self.particles[j]);
                    a.is_active() && b.is_active() && d <= a.radius + b.radius
                })
                .map(|(i, j, _)| (i, j))
                .collect();

            for (i, j) in contacts {
                let (a, b) = pair_mut(&mut self.particles, i, j);
                if let Some(impulse) = resolve_elastic(a, b, rate) {
                    log::debug!("Elastic contact {} <-> {} (|Δp| = {:.4})", a.id, b.id, impulse.length());
                }
            }
            return;
        }

        let min_speed = self.layout.collider.min_collision_speed;
        let capture = self.layout.collider.capture_distance;
        let terminal = self.params.collider.terminal;
        let mut captured = vec![false; self.particles.len()];
        let mut pairs = Vec::new();

        for (i, j, d) in self.distances.pairs() {
            let (a, b) = (&self.particles[i], &self.particles[j]);
            let ready = |p: &Particle| p.stage == Stage::RingOrbit && p.orbit.speed > min_speed;
            if captured[i] || captured[j] || !ready(a) || !ready(b) {
                continue;
            }
            // A deflected pair is still inside the capture distance next tick
            if !terminal && approach_speed(a, b) <= 0.0 {
                continue;
            }
            if d < capture || d <= a.radius + b.radius {
                captured[i] = true;
                captured[j] = true;
                pairs.push((i, j));
            }
        }

        for &(i, j) in &pairs {
            self.particles[i].stage = Stage::Colliding;
            self.particles[j].stage = Stage::Colliding;
        }

        if terminal {
            if let Some(&(i, j)) = pairs.first() {
                self.resolve_terminal(i, j);
            }
        } else {
            for (i, j) in pairs {
                self.resolve_deflection(i, j);
            }
        }
    }

    fn draw_energy(&mut self) -> f64 {
        let classifier = &self.params.classifier;
        match classifier.fixed_energy {
            Some(energy) => energy,
            None => sample_energy(&mut self.rng, classifier.min_energy, classifier.max_energy),
        }
    }

    /// Classify a collision and record its reading
    fn record_reading(&mut self, a: ParticleId, b: ParticleId, at: DVec3, labels: Vec<&'static str>, energy: f64) {
        let category = classify(energy);
        self.estimate.record(energy);

        let report = CollisionReport {
            reading_number: self.reading_number,
            category,
            initial_energy: self.params.classifier.initial_beam_energy,
            energy,
            products: labels.clone(),
            mean_probability: self.estimate.mean_probability(),
        };
        log::info!("Collision between {a} and {b}:\n{report}");

        self.events.push(CollisionEvent {
            participants: (a, b),
            midpoint: at,
            category,
            products: labels,
            energy,
        });
        self.reports.push(report);
    }

    /// Replace the whole system with frozen products at the collision point.
    fn resolve_terminal(&mut self, i: usize, j: usize) {
        let (a, b) = (self.particles[i].clone(), self.particles[j].clone());
        let at = midpoint(a.position, b.position);
        let energy = self.draw_energy();
        let category = classify(energy);

        let (products, labels) = self.materialise(category, at, [&a, &b]);
        self.record_reading(a.id, b.id, at, labels, energy);

        self.particles = products;
        self.armed = false;
        self.collided = true;
    }

    /// Build frozen product particles and the label list shown on the panel.
    fn materialise(&mut self, category: CollisionCategory, at: DVec3, incoming: [&Particle; 2]) -> (Vec<Particle>, Vec<&'static str>) {
        let rate = self.params.integration.rate;
        let particle = self.params.particle.clone();
        let classifier = &self.params.classifier;
        let (spread, multiplicity) = (classifier.product_spread, classifier.jet_multiplicity.max(1));

        let mut labels = Vec::new();
        let mut drawn = Vec::new();
        for spec in category.products() {
            let (charge, label) = spec.draw_charge(&mut self.rng);
            labels.push(label);
            let copies = if spec.cluster { multiplicity } else { 1 };
            drawn.extend(std::iter::repeat((spec.kind, charge, label)).take(copies));
        }

        let total = drawn.len();
        let mut products = Vec::with_capacity(total);
        for (k, (kind, charge, label)) in drawn.into_iter().enumerate() {
            let position = if category == CollisionCategory::ElasticScattering && k < 2 {
                // Scattered protons stay one unit back along their incoming paths
                let from = incoming[k];
                from.position - from.velocity.normalize_or_zero()
            } else {
                let angle = TAU * k as f64 / total as f64;
                at + DVec3::new(angle.cos(), angle.sin(), 0.0) * spread
            };

            let mut product = Particle::new(self.next_id, kind, position, DVec3::ZERO, rate)
                .with_mass(particle.mass)
                .with_radius(particle.radius)
                .with_charge(charge * particle.charge)
                .with_label(label);
            product.stage = Stage::Frozen;
            self.next_id += 1;
            products.push(product);
        }

        (products, labels)
    }

    /// Non-terminal collider hit: record the reading and bounce the pair
    /// elastically along the ring.
    fn resolve_deflection(&mut self, i: usize, j: usize) {
        let rate = self.params.integration.rate;
        let energy = self.draw_energy();
        let category = classify(energy);
        let labels: Vec<&'static str> = category
            .products()
            .iter()
            .map(|spec| spec.draw_charge(&mut self.rng).1)
            .collect();

        let (ida, idb) = (self.particles[i].id, self.particles[j].id);
        let at = midpoint(self.particles[i].position, self.particles[j].position);
        self.record_reading(ida, idb, at, labels, energy);

        let (a, b) = pair_mut(&mut self.particles, i, j);
        let signed = |p: &Particle| p.orbit.direction.sign() * p.orbit.speed;
        let (sa, sb) = (signed(a), signed(b));
        let total = a.mass + b.mass;
        let new_a = ((a.mass - b.mass) * sa + 2.0 * b.mass * sb) / total;
        let new_b = ((b.mass - a.mass) * sb + 2.0 * a.mass * sa) / total;

        for (p, s) in [(a, new_a), (b, new_b)] {
            p.orbit.direction = if s < 0.0 {
                OrbitDirection::Clockwise
            } else {
                OrbitDirection::Anticlockwise
            };
            p.orbit.speed = s.abs();
            p.orbit.angular_velocity = p.orbit.speed / p.orbit.radius;

            let angle = two_d_angle(p.orbit.centre, p.position);
            let velocity = p.orbit.direction.tangent(angle) * p.orbit.speed;
            p.teleport(p.position, velocity, rate);
            p.stage = Stage::RingOrbit;
        }

        self.armed = false;
        self.reading_number += 1;
    }

    // Commands

    /// Apply a command immediately; `false` when its preconditions fail.
    pub fn apply(&mut self, command: Command) -> bool {
        let name = command.name();
        let accepted = match command {
            Command::SpawnParticle { kind, position, velocity } => {
                self.spawn_particle(kind, position, velocity);
                true
            }
            Command::SpawnHydrogen => self.spawn_hydrogen(),
            Command::SealChamber => self.seal_chamber(),
            Command::ActivateChamber => self.activate_chamber(),
            Command::StartCollider => self.start_collider(),
            Command::TriggerCollision => self.trigger_collision(),
            Command::Reset => {
                self.reset();
                true
            }
            Command::NextReading => self.next_reading(),
        };

        if !accepted {
            log::debug!("Ignored {} at tick {}: preconditions not met", name, self.tick);
        }
        accepted
    }

    /// Add a Free particle with the configured mass, radius and charge scale.
    pub fn spawn_particle(&mut self, kind: ParticleKind, position: DVec3, velocity: DVec3) -> ParticleId {
        let id = self.next_id;
        self.next_id += 1;

        let p = &self.params.particle;
        let particle = Particle::new(id, kind, position, velocity, self.params.integration.rate)
            .with_mass(p.mass)
            .with_radius(p.radius)
            .with_charge(kind.default_charge() * p.charge);
        self.particles.push(particle);

        log::debug!("Spawned {:?} {} at {:?}", kind, id, position);
        id
    }

    /// Pump a hydrogen atom from the gas pump outlet.
    ///
    /// Requires an unsealed chamber with room left and an elapsed cooldown.
    pub fn spawn_hydrogen(&mut self) -> bool {
        let source = &self.params.source;
        let cooled_down = self
            .last_spawn_tick
            .is_none_or(|last| self.tick.saturating_sub(last) >= source.spawn_cooldown_ticks);

        if self.collided
            || self.layout.source.sealed
            || self.particles.len() >= source.max_particles
            || !cooled_down
        {
            return false;
        }

        let (outlet, velocity) = (source.pump_outlet, source.spawn_velocity);
        let id = self.spawn_particle(ParticleKind::HydrogenAtom, outlet, velocity);
        self.last_spawn_tick = Some(self.tick);
        log::info!("Hydrogen atom {} pumped into the source chamber", id);
        true
    }

    /// Close the chamber: particles past the seal wall are discarded and the
    /// remaining hydrogen atoms are ionised into protons at rest.
    pub fn seal_chamber(&mut self) -> bool {
        if self.layout.source.sealed || self.collided {
            return false;
        }
        self.layout.source.sealed = true;

        let chamber = &self.layout.source;
        let before = self.particles.len();
        self.particles.retain(|p| !chamber.is_outside(p.position, p.radius));
        let discarded = before - self.particles.len();

        let proton_charge = ParticleKind::Proton.default_charge() * self.params.particle.charge;
        for particle in &mut self.particles {
            if particle.kind == ParticleKind::HydrogenAtom {
                particle.kind = ParticleKind::Proton;
                particle.charge = proton_charge;
                particle.halt();
            }
        }

        log::info!(
            "Source chamber sealed: {} particle(s) inside, {} discarded",
            self.particles.len(),
            discarded
        );
        true
    }

    /// Switch on the LINAC field for every proton still in the chamber.
    pub fn activate_chamber(&mut self) -> bool {
        let source = &self.layout.source;
        if !source.sealed || source.activated || self.particles.len() <= 1 {
            return false;
        }
        self.layout.source.activated = true;

        let linac = &self.layout.linac;
        let permittivity = self.params.electrostatics.permittivity;
        for particle in &mut self.particles {
            if particle.kind != ParticleKind::Proton || particle.stage != Stage::Free {
                continue;
            }
            let distance = linac.exit_z - particle.position.z;
            let force = linac_drive_force(particle.charge, distance, linac.bore_radius, permittivity, linac.field_scale);
            particle.force = DVec3::new(0.0, 0.0, force);
        }

        log::info!("Source chamber activated, LINAC field applied");
        true
    }

    /// Assign beams: the first half of the protons take the "+" beam, the
    /// rest the "-" beam. Needs at least one particle in the booster.
    pub fn start_collider(&mut self) -> bool {
        let source = &self.layout.source;
        let boosting = self.particles.iter().any(|p| p.stage == Stage::Boosting);
        if !source.sealed || !source.activated || self.layout.collider.started || !boosting {
            return false;
        }
        self.layout.collider.started = true;

        let mut protons: Vec<&mut Particle> = self
            .particles
            .iter_mut()
            .filter(|p| p.kind == ParticleKind::Proton && matches!(p.stage, Stage::Free | Stage::Boosting))
            .collect();
        let half = protons.len().div_ceil(2);
        for (index, particle) in protons.iter_mut().enumerate() {
            particle.beam = Some(if index < half { Beam::Positive } else { Beam::Negative });
        }

        log::info!("Collider started, {} proton(s) assigned to beams", protons.len());
        true
    }

    /// Arm the collider once both beams circulate above the collision speed.
    pub fn trigger_collision(&mut self) -> bool {
        if self.armed || self.collided || !self.beams_ready() {
            return false;
        }
        self.armed = true;
        log::info!("Collision triggered at tick {}", self.tick);
        true
    }

    /// Clear particles, stage flags and the running estimate.
    pub fn reset(&mut self) {
        self.clear_session();
        self.estimate.clear();
        self.events.clear();
        self.reports.clear();
        self.reading_number = 1;
        self.accumulator = 0.0;
        log::info!("Simulation reset");
    }

    /// Start the next reading: like [`reset`](Self::reset) but the running
    /// estimate and past readings are kept. Only valid once the current
    /// reading has been recorded.
    pub fn next_reading(&mut self) -> bool {
        let recorded = self
            .reports
            .last()
            .is_some_and(|report| report.reading_number == self.reading_number);
        if !recorded {
            return false;
        }

        self.clear_session();
        self.reading_number += 1;
        log::info!("Ready for reading {}", self.reading_number);
        true
    }

    fn clear_session(&mut self) {
        self.particles.clear();
        self.distances = DistanceMatrix::default();
        self.layout.reset_flags();
        self.armed = false;
        self.collided = false;
        self.last_spawn_tick = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn world() -> SimulationWorld {
        SimulationWorld::new(SimulationParams::default()).unwrap()
    }

    #[test]
    fn hydrogen_spawn_respects_cooldown_and_capacity() {
        let mut world = world();
        assert!(world.spawn_hydrogen());
        assert!(!world.spawn_hydrogen(), "cooldown should block an immediate respawn");

        for _ in 0..40 {
            world.step();
        }
        assert!(world.spawn_hydrogen());
        for _ in 0..40 {
            world.step();
        }
        assert!(!world.spawn_hydrogen(), "chamber holds two particles");
        assert_eq!(world.particle_count(), 2);
    }

    #[test]
    fn seal_converts_hydrogen_and_discards_outsiders() {
        let mut world = world();
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -4.0), DVec3::new(0.0, 0.0, -1.0));
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, 10.0), DVec3::ZERO);

        assert!(world.seal_chamber());
        assert!(!world.seal_chamber());
        assert_eq!(world.particle_count(), 1);

        let p = &world.particles()[0];
        assert_eq!(p.kind, ParticleKind::Proton);
        assert_eq!(p.derived_velocity(200.0), DVec3::ZERO);
        assert!(!world.spawn_hydrogen());
    }

    #[test]
    fn activation_needs_a_sealed_chamber_with_two_particles() {
        let mut world = world();
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -3.0), DVec3::ZERO);
        assert!(!world.activate_chamber());

        world.seal_chamber();
        assert!(!world.activate_chamber(), "a single proton is not enough");

        world.reset();
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -3.0), DVec3::ZERO);
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -5.0), DVec3::ZERO);
        world.seal_chamber();
        assert!(world.activate_chamber());
        assert!(world.particles().iter().all(|p| p.force.z < 0.0));
        assert!(!world.activate_chamber());
    }

    #[test]
    fn queued_commands_apply_on_next_tick() {
        let mut world = world();
        world.submit(Command::SpawnHydrogen);
        assert_eq!(world.particle_count(), 0);
        assert_eq!(world.pending_commands(), 1);

        world.step();
        assert_eq!(world.particle_count(), 1);
        assert_eq!(world.pending_commands(), 0);
    }

    #[test]
    fn advance_runs_whole_ticks_with_bounded_catch_up() {
        let mut world = world();
        world.advance(0.0125);
        assert_eq!(world.tick(), 2);
        world.advance(0.004);
        assert_eq!(world.tick(), 3);

        world.advance(10.0);
        assert_eq!(world.tick(), 3 + 8);
        world.advance(0.0);
        assert_eq!(world.tick(), 11);
    }

    #[test]
    fn start_collider_splits_protons_into_beams() {
        let mut world = world();
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -3.0), DVec3::ZERO);
        world.spawn_particle(ParticleKind::HydrogenAtom, DVec3::new(0.0, 5.0, -5.0), DVec3::ZERO);
        world.seal_chamber();
        world.activate_chamber();
        assert!(!world.start_collider(), "nothing in the booster yet");

        world.particles[0].stage = Stage::Boosting;
        assert!(world.start_collider());
        assert_eq!(world.particles()[0].beam, Some(Beam::Positive));
        assert_eq!(world.particles()[1].beam, Some(Beam::Negative));
        assert!(!world.start_collider());
    }

    /// Two counter-rotating beam particles `half_gap` radians either side of
    /// the top of the ring, closing on each other
    fn beam_pair(params: SimulationParams, half_gap: f64, speed: f64) -> (SimulationWorld, ParticleId, ParticleId) {
        let mut world = SimulationWorld::new(params).unwrap();
        world.layout.source.sealed = true;
        world.layout.source.activated = true;
        world.layout.collider.started = true;

        let mut place = |beam: Beam, angle: f64| {
            let collider = world.layout.collider.clone();
            let radius = collider.beam_radius(beam);
            let direction = collider.beam_direction(beam);
            let position = particle_physics::point_on_orbit(collider.centre, radius, angle);
            let id = world.spawn_particle(ParticleKind::Proton, position, DVec3::ZERO);
            let p = world.particles.last_mut().unwrap();
            p.completed_linac = true;
            p.beam = Some(beam);
            p.stage = Stage::RingOrbit;
            p.orbit = particle_physics::OrbitState::new(collider.centre, radius, direction, speed);
            id
        };
        let a = place(Beam::Positive, std::f64::consts::FRAC_PI_2 + half_gap);
        let b = place(Beam::Negative, std::f64::consts::FRAC_PI_2 - half_gap);
        (world, a, b)
    }

    /// Still approaching after one tick, inside the capture distance
    fn armed_collider(params: SimulationParams) -> (SimulationWorld, ParticleId, ParticleId) {
        let (mut world, a, b) = beam_pair(params, 0.14, 3600.0);
        assert!(world.trigger_collision());
        assert!(!world.trigger_collision());
        (world, a, b)
    }

    #[test]
    fn terminal_collision_freezes_products() {
        let mut params = SimulationParams::default();
        params.classifier.fixed_energy = Some(125.0);
        let (mut world, a, b) = armed_collider(params);

        world.step();

        assert!(world.has_collided());
        assert!(!world.is_armed());
        let event = world.last_event().unwrap();
        assert_eq!(event.participants, (a, b));
        assert_eq!(event.category, CollisionCategory::HiggsProduction);
        assert_eq!(event.products.len(), 8);

        assert_eq!(world.particle_count(), 8);
        assert!(world.particles().iter().all(|p| p.stage == Stage::Frozen));
        assert_eq!(world.particles()[0].label(), "Higgs Boson");

        let report = world.last_report().unwrap();
        assert_eq!(report.reading_number, 1);
        assert_eq!(report.mean_probability, 1.0);

        // Physics stays suspended until the next reading
        let frozen: Vec<DVec3> = world.particles().iter().map(|p| p.position).collect();
        world.step();
        let after: Vec<DVec3> = world.particles().iter().map(|p| p.position).collect();
        assert_eq!(frozen, after);

        assert!(world.next_reading());
        assert!(!world.next_reading());
        assert_eq!(world.reading_number(), 2);
        assert_eq!(world.particle_count(), 0);
        assert_eq!(world.estimate().count(), 1);
        assert!(!world.has_collided());
        assert!(!world.layout().collider.started);
    }

    #[test]
    fn jets_expand_into_clusters() {
        let mut params = SimulationParams::default();
        params.classifier.fixed_energy = Some(25.0);
        params.classifier.jet_multiplicity = 4;
        let (mut world, _, _) = armed_collider(params);

        world.step();
        assert_eq!(world.last_event().unwrap().category, CollisionCategory::JetsFormation);
        assert_eq!(world.last_event().unwrap().products, vec!["Pion Jet", "Kaon Jet"]);
        assert_eq!(world.particle_count(), 8);
    }

    #[test]
    fn non_terminal_collision_deflects_and_disarms() {
        let mut params = SimulationParams::default();
        params.collider.terminal = false;
        params.classifier.fixed_energy = Some(0.5);
        let (mut world, a, b) = armed_collider(params);

        world.step();

        assert!(!world.has_collided());
        assert!(!world.is_armed());
        assert_eq!(world.reports().len(), 1);
        assert_eq!(world.reading_number(), 2);
        assert_eq!(world.particle_count(), 2);

        let (pa, pb) = (world.particle(a).unwrap(), world.particle(b).unwrap());
        assert_eq!(pa.stage, Stage::RingOrbit);
        assert_eq!(pa.orbit.direction, OrbitDirection::Anticlockwise);
        assert_eq!(pb.orbit.direction, OrbitDirection::Clockwise);
        assert!((pa.orbit.speed - 3600.0).abs() < 1e-9);
        assert!((pa.derived_velocity(200.0) - pa.velocity).length() < 1e-6);
    }

    #[test]
    fn fixed_seed_repeats_energy_samples() {
        let run = || {
            let (mut world, _, _) = armed_collider(SimulationParams::default());
            world.step();
            world.last_event().unwrap().energy
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn deflection_skips_separating_pairs() {
        let mut params = SimulationParams::default();
        params.collider.terminal = false;
        params.classifier.fixed_energy = Some(0.5);
        // Wide enough apart that the pair has already crossed after one tick
        let (mut world, a, b) = beam_pair(params, 0.1, 3600.0);
        assert!(world.trigger_collision());

        world.step();

        assert!(world.reports().is_empty());
        assert!(world.is_armed());
        assert_eq!(world.particle(a).unwrap().orbit.direction, OrbitDirection::Clockwise);
        assert_eq!(world.particle(b).unwrap().stage, Stage::RingOrbit);
    }

    #[test]
    fn auto_arm_waits_for_fast_beams() {
        let mut params = SimulationParams::default();
        params.collider.auto_arm = true;

        let (mut slow, _, _) = beam_pair(params.clone(), 1.0, 3000.0);
        slow.step();
        assert!(!slow.is_armed());

        let (mut fast, _, _) = beam_pair(params, 1.0, 3600.0);
        fast.step();
        assert!(fast.is_armed());
        assert!(fast.reports().is_empty());
        assert!(!fast.trigger_collision(), "already armed");
    }
}
