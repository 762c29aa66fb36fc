//! Particle record, kinds and transit stages for the accelerator simulation

use glam::DVec3;
use serde::Deserialize;

use crate::constants::{SIMULATED_PROTON_CHARGE, SIMULATED_PROTON_MASS, SIMULATED_PROTON_RADIUS};

/// Stable identifier handed out by the simulation when a particle is created
pub type ParticleId = u64;

/// Particle kinds
///
/// Motion is selected by [`Stage`], never by kind; the kind only carries the
/// capability table (default charge, palette colour, label).
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParticleKind {
    HydrogenAtom = 0,
    Proton = 1,
    Baryon = 2,
    Pion = 3,
    Kaon = 4,
    Neutron = 5,
    Meson = 6,
    Neutrino = 7,
    Lepton = 8,
    // Collision products without a hadron/lepton counterpart
    Boson = 9,
    Quark = 10,
    Photon = 11,
}

impl ParticleKind {
    /// Default charge in units of the simulated proton charge
    pub fn default_charge(self) -> f64 {
        match self {
            ParticleKind::HydrogenAtom | ParticleKind::Proton | ParticleKind::Baryon => 1.0,
            ParticleKind::Lepton => -1.0,
            _ => 0.0,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ParticleKind::HydrogenAtom => "Hydrogen",
            ParticleKind::Proton => "Proton",
            ParticleKind::Baryon => "Baryon",
            ParticleKind::Pion => "Pion",
            ParticleKind::Kaon => "Kaon",
            ParticleKind::Neutron => "Neutron",
            ParticleKind::Meson => "Meson",
            ParticleKind::Neutrino => "Neutrino",
            ParticleKind::Lepton => "Lepton",
            ParticleKind::Boson => "Boson",
            ParticleKind::Quark => "Quark",
            ParticleKind::Photon => "Photon",
        }
    }
}

/// Force/motion regime a particle is currently in
#[repr(u32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Stage {
    /// Integrator-only motion under constant and Coulomb forces
    #[default]
    Free = 0,
    /// Orbiting the booster ring
    Boosting = 1,
    /// Straight run through a transfer tube
    TubeTransfer = 2,
    /// Orbiting the collider ring
    RingOrbit = 3,
    /// Captured by an armed collision, waiting for resolution
    Colliding = 4,
    /// No further physics
    Frozen = 5,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitDirection {
    /// Angle decreases every tick
    #[default]
    Clockwise,
    /// Angle increases every tick
    Anticlockwise,
}

impl OrbitDirection {
    pub fn sign(self) -> f64 {
        match self {
            OrbitDirection::Clockwise => -1.0,
            OrbitDirection::Anticlockwise => 1.0,
        }
    }

    /// Unit direction of travel at `angle` on a horizontal orbit
    pub fn tangent(self, angle: f64) -> DVec3 {
        match self {
            OrbitDirection::Clockwise => DVec3::new(angle.sin(), 0.0, -angle.cos()),
            OrbitDirection::Anticlockwise => DVec3::new(-angle.sin(), 0.0, angle.cos()),
        }
    }
}

/// Deflection sign assigned when the collider is started.
/// Selects the transfer tube and the collider beam a particle ends up in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Beam {
    Positive,
    Negative,
}

impl Beam {
    pub fn symbol(self) -> &'static str {
        match self {
            Beam::Positive => "+",
            Beam::Negative => "-",
        }
    }
}

/// Scratch state used by the orbiting stages
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OrbitState {
    pub centre: DVec3,
    pub radius: f64,
    pub direction: OrbitDirection,
    /// Tangential speed; authoritative while orbiting
    pub speed: f64,
    pub angular_velocity: f64,
}

impl OrbitState {
    pub fn new(centre: DVec3, radius: f64, direction: OrbitDirection, speed: f64) -> Self {
        Self {
            centre,
            radius,
            direction,
            speed,
            angular_velocity: speed / radius,
        }
    }

    /// Change in angle over one tick of length `dt`
    pub fn angle_step(&self, dt: f64) -> f64 {
        self.direction.sign() * self.angular_velocity * dt
    }
}

/// A charged point particle.
///
/// Velocity is never stored authoritatively while the integrator drives the
/// particle: `position` and `previous_position` together define it through
/// `velocity = (position - previous_position) * rate`.
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub id: ParticleId,
    pub kind: ParticleKind,
    pub stage: Stage,

    pub position: DVec3,
    pub previous_position: DVec3,
    /// Reconstructed by the last integrator step or stage update
    pub velocity: DVec3,
    pub acceleration: DVec3,
    /// Net force used by the next integrator step
    pub force: DVec3,

    pub mass: f64,
    pub charge: f64,
    pub radius: f64,

    /// Set once the particle has left the linear accelerator
    pub completed_linac: bool,
    pub beam: Option<Beam>,
    pub orbit: OrbitState,

    /// Display label override used by collision products
    pub label: Option<&'static str>,
}

impl Particle {
    /// Create a particle at `position` moving with `velocity` (units per second).
    ///
    /// The previous position is seeded one tick back along the velocity so
    /// the first integrator step reproduces it.
    pub fn new(id: ParticleId, kind: ParticleKind, position: DVec3, velocity: DVec3, rate: f64) -> Self {
        Self {
            id,
            kind,
            stage: Stage::Free,
            position,
            previous_position: position - velocity / rate,
            velocity,
            acceleration: DVec3::ZERO,
            force: DVec3::ZERO,
            mass: SIMULATED_PROTON_MASS,
            charge: kind.default_charge() * SIMULATED_PROTON_CHARGE,
            radius: SIMULATED_PROTON_RADIUS,
            completed_linac: false,
            beam: None,
            orbit: OrbitState::default(),
            label: None,
        }
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_charge(mut self, charge: f64) -> Self {
        self.charge = charge;
        self
    }

    pub fn with_radius(mut self, radius: f64) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_label(mut self, label: &'static str) -> Self {
        self.label = Some(label);
        self
    }

    /// Velocity implied by the position history
    pub fn derived_velocity(&self, rate: f64) -> DVec3 {
        (self.position - self.previous_position) * rate
    }

    pub fn speed(&self) -> f64 {
        self.velocity.length()
    }

    /// Move to `position`, keeping the position history consistent with
    /// `velocity = (position - previous_position) * rate`.
    pub fn move_to(&mut self, position: DVec3, rate: f64) {
        self.previous_position = self.position;
        self.position = position;
        self.velocity = (self.position - self.previous_position) * rate;
    }

    /// Jump to `position` already moving with `velocity`; the history is
    /// rebuilt one tick back along the new velocity.
    pub fn teleport(&mut self, position: DVec3, velocity: DVec3, rate: f64) {
        self.position = position;
        self.previous_position = position - velocity / rate;
        self.velocity = velocity;
    }

    /// Drop any motion: position history collapses onto the current position.
    pub fn halt(&mut self) {
        self.previous_position = self.position;
        self.velocity = DVec3::ZERO;
        self.acceleration = DVec3::ZERO;
        self.force = DVec3::ZERO;
    }

    pub fn label(&self) -> &'static str {
        self.label.unwrap_or_else(|| self.kind.label())
    }

    /// Frozen and colliding particles take no part in physics
    pub fn is_active(&self) -> bool {
        !matches!(self.stage, Stage::Colliding | Stage::Frozen)
    }
}
