//! Simulation parameters for runtime tuning
//!
//! Every group implements `Default` with the reference accelerator layout and
//! deserializes with `#[serde(default)]`, so a scenario file only needs to
//! name the values it changes:
//!
//! ```yaml
//! integration:
//!   rate: 400.0
//! collider:
//!   min_collision_speed: 3000.0
//!   terminal: false
//! classifier:
//!   fixed_energy: 125.0
//! seed: 7
//! ```

use glam::DVec3;
use particle_physics::{
    OrbitDirection, COULOMB_LAW_CONSTANT, INITIAL_BEAM_ENERGY_GEV, MAX_ENERGY_SAMPLE_GEV,
    MIN_ENERGY_SAMPLE_GEV, PERMITTIVITY_OF_FREE_SPACE, RATE_OF_CALCULATIONS,
    SIMULATED_PROTON_CHARGE, SIMULATED_PROTON_MASS, SIMULATED_PROTON_RADIUS, SOFTENING,
};
use serde::Deserialize;

use crate::error::ParamsError;

#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(default)]
pub struct SimulationParams {
    pub integration: IntegrationParams,
    pub particle: ParticleParams,
    pub electrostatics: ElectrostaticParams,
    pub source: SourceParams,
    pub linac: LinacParams,
    pub booster: BoosterParams,
    pub tubes: TubeParams,
    pub collider: ColliderParams,
    pub orbit_model: OrbitModel,
    pub classifier: ClassifierParams,
    pub playfield: PlayfieldParams,
    /// Seed for energy sampling and random product charges
    pub seed: u64,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct IntegrationParams {
    /// Ticks per simulated second
    pub rate: f64,
    /// Upper bound on ticks run by a single `advance` call
    pub max_catch_up_ticks: u32,
}

impl Default for IntegrationParams {
    fn default() -> Self {
        Self {
            rate: RATE_OF_CALCULATIONS,
            max_catch_up_ticks: 8,
        }
    }
}

/// Simulated proton properties, shared by every spawned particle
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ParticleParams {
    pub mass: f64,
    pub radius: f64,
    pub charge: f64,
}

impl Default for ParticleParams {
    fn default() -> Self {
        Self {
            mass: SIMULATED_PROTON_MASS,
            radius: SIMULATED_PROTON_RADIUS,
            charge: SIMULATED_PROTON_CHARGE,
        }
    }
}

/// Which pairs feel the Coulomb interaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PairMode {
    /// Neighbours in spawn order only
    #[default]
    Adjacent,
    /// Every unordered pair within the cutoff
    AllPairs,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ElectrostaticParams {
    pub coulomb_constant: f64,
    pub permittivity: f64,
    /// Minimum separation used by Coulomb's law
    pub softening: f64,
    /// Pairs further apart than this feel no force
    pub pair_cutoff: f64,
    pub pair_mode: PairMode,
    /// Extra clearance around a plate's half thickness
    pub wall_clearance: f64,
}

impl Default for ElectrostaticParams {
    fn default() -> Self {
        Self {
            coulomb_constant: COULOMB_LAW_CONSTANT,
            permittivity: PERMITTIVITY_OF_FREE_SPACE,
            softening: SOFTENING,
            pair_cutoff: 4.0,
            pair_mode: PairMode::Adjacent,
            wall_clearance: 1.0,
        }
    }
}

/// Source chamber, gas pump and the two charged plates
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SourceParams {
    pub chamber_centre: DVec3,
    pub chamber_radius: f64,
    pub chamber_length: f64,
    pub nozzle_centre: DVec3,
    pub nozzle_thickness: f64,
    pub seal_wall_centre: DVec3,
    pub seal_wall_thickness: f64,
    pub pump_outlet: DVec3,
    /// Units per second
    pub spawn_velocity: DVec3,
    pub spawn_cooldown_ticks: u64,
    pub max_particles: usize,
}

impl Default for SourceParams {
    fn default() -> Self {
        Self {
            chamber_centre: DVec3::new(0.0, 5.0, -4.0),
            chamber_radius: 3.0,
            chamber_length: 5.0,
            nozzle_centre: DVec3::new(0.0, 5.0, -9.0),
            nozzle_thickness: 5.0,
            seal_wall_centre: DVec3::new(0.0, 5.0, -1.5),
            seal_wall_thickness: 0.25,
            pump_outlet: DVec3::new(0.0, 5.0, 18.5),
            spawn_velocity: DVec3::new(0.0, 0.0, -20.0),
            spawn_cooldown_ticks: 40,
            max_particles: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LinacParams {
    /// Protons beyond this z leave the linear accelerator
    pub exit_z: f64,
    pub bore_radius: f64,
    pub field_scale: f64,
}

impl Default for LinacParams {
    fn default() -> Self {
        Self {
            exit_z: -95.0,
            bore_radius: 0.75,
            field_scale: 100.0,
        }
    }
}

/// Axis-aligned accelerating gap inside a ring
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ZoneParams {
    pub centre: DVec3,
    pub size: DVec3,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct BoosterParams {
    pub centre: DVec3,
    pub orbit_radius: f64,
    pub tube_radius: f64,
    pub direction: OrbitDirection,
    pub accelerator: ZoneParams,
    /// Speed at which a beam particle may leave for its transfer tube
    pub boost_complete_speed: f64,
    /// Axial distance from the tube entrance that counts as "at the exit"
    pub exit_tolerance: f64,
}

impl Default for BoosterParams {
    fn default() -> Self {
        Self {
            centre: DVec3::new(-31.0, 6.5, -100.0),
            orbit_radius: 31.0,
            tube_radius: 2.5,
            direction: OrbitDirection::Clockwise,
            accelerator: ZoneParams {
                centre: DVec3::new(0.0, 6.5, -100.0),
                size: DVec3::new(6.0, 6.0, 10.0),
            },
            boost_complete_speed: 2500.0,
            exit_tolerance: 5.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TubeSpec {
    pub start: DVec3,
    pub direction: DVec3,
    pub length: f64,
}

/// One transfer tube per beam
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TubeParams {
    pub positive: TubeSpec,
    pub negative: TubeSpec,
}

impl Default for TubeParams {
    fn default() -> Self {
        Self {
            positive: TubeSpec {
                start: DVec3::new(-31.0, 8.0, -69.0),
                direction: DVec3::X,
                length: 131.0,
            },
            negative: TubeSpec {
                start: DVec3::new(-31.0, 8.0, -131.0),
                direction: DVec3::NEG_X,
                length: 103.0,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ColliderParams {
    pub centre: DVec3,
    pub orbit_radius: f64,
    pub tube_radius: f64,
    /// Radial separation of each beam from the nominal orbit
    pub beam_offset: f64,
    pub accelerator: ZoneParams,
    pub min_collision_speed: f64,
    /// Armed beam particles closer than this collide
    pub capture_distance: f64,
    /// Collisions replace the pair with products instead of deflecting it
    pub terminal: bool,
    /// Arm automatically as soon as both beams are fast enough
    pub auto_arm: bool,
}

impl Default for ColliderParams {
    fn default() -> Self {
        Self {
            centre: DVec3::new(0.0, 12.0, -180.0),
            orbit_radius: 140.0,
            tube_radius: 6.0,
            beam_offset: 2.0,
            accelerator: ZoneParams {
                centre: DVec3::new(0.0, 12.0, -320.0),
                size: DVec3::new(50.0, 14.0, 14.0),
            },
            min_collision_speed: 3500.0,
            capture_distance: 30.0,
            terminal: true,
            auto_arm: false,
        }
    }
}

/// How orbiting stages move particles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrbitModel {
    /// Position parameterised by angle; radius never drifts
    #[default]
    Placement,
    /// Centripetal force integrated by the Verlet step
    ForceDriven,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ClassifierParams {
    pub min_energy: f64,
    pub max_energy: f64,
    /// Use this rest-mass energy for every collision instead of sampling
    pub fixed_energy: Option<f64>,
    pub initial_beam_energy: f64,
    /// Particles materialised per jet product
    pub jet_multiplicity: usize,
    /// Radius of the ring products are laid out on around the collision point
    pub product_spread: f64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            min_energy: MIN_ENERGY_SAMPLE_GEV,
            max_energy: MAX_ENERGY_SAMPLE_GEV,
            fixed_energy: None,
            initial_beam_energy: INITIAL_BEAM_ENERGY_GEV,
            jet_multiplicity: 3,
            product_spread: 1.5,
        }
    }
}

/// Particles outside these bounds are removed
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlayfieldParams {
    pub min: DVec3,
    pub max: DVec3,
}

impl Default for PlayfieldParams {
    fn default() -> Self {
        Self {
            min: DVec3::new(-200.0, -50.0, -400.0),
            max: DVec3::new(200.0, 50.0, 18.5),
        }
    }
}

impl PlayfieldParams {
    pub fn contains(&self, position: DVec3) -> bool {
        position.cmpge(self.min).all() && position.cmple(self.max).all()
    }
}

impl SimulationParams {
    pub fn validate(&self) -> Result<(), ParamsError> {
        let rate = self.integration.rate;
        if !(rate > 0.0) {
            return Err(ParamsError::NonPositiveRate(rate));
        }
        if self.integration.max_catch_up_ticks == 0 {
            return Err(ParamsError::ZeroCatchUp);
        }

        for (name, value) in [("mass", self.particle.mass), ("radius", self.particle.radius)] {
            if !(value > 0.0) {
                return Err(ParamsError::InvalidParticle { name, value });
            }
        }
        if !self.particle.charge.is_finite() {
            return Err(ParamsError::InvalidParticle {
                name: "charge",
                value: self.particle.charge,
            });
        }

        if !(self.electrostatics.softening > 0.0) {
            return Err(ParamsError::NonPositiveSoftening(self.electrostatics.softening));
        }
        if !(self.electrostatics.permittivity > 0.0) {
            return Err(ParamsError::NonPositivePermittivity(self.electrostatics.permittivity));
        }
        if self.source.max_particles == 0 {
            return Err(ParamsError::ZeroCapacity);
        }

        for (stage, radius) in [
            ("booster", self.booster.orbit_radius),
            ("collider", self.collider.orbit_radius),
        ] {
            if !(radius > 0.0) {
                return Err(ParamsError::NonPositiveOrbitRadius { stage, radius });
            }
        }
        if self.collider.beam_offset.abs() >= self.collider.orbit_radius {
            return Err(ParamsError::BeamOffsetTooLarge {
                offset: self.collider.beam_offset,
                radius: self.collider.orbit_radius,
            });
        }

        for (stage, zone) in [
            ("booster", &self.booster.accelerator),
            ("collider", &self.collider.accelerator),
        ] {
            if !zone.size.cmpgt(DVec3::ZERO).all() {
                return Err(ParamsError::DegenerateZone { stage });
            }
        }

        for (beam, tube) in [("+", &self.tubes.positive), ("-", &self.tubes.negative)] {
            if !(tube.length > 0.0) || tube.direction.length_squared() == 0.0 {
                return Err(ParamsError::DegenerateTube { beam });
            }
        }

        let (min, max) = (self.classifier.min_energy, self.classifier.max_energy);
        if !(min < max) {
            return Err(ParamsError::EmptyEnergyRange { min, max });
        }

        if !self.playfield.min.cmplt(self.playfield.max).all() {
            return Err(ParamsError::InvertedPlayfield);
        }

        Ok(())
    }
}
