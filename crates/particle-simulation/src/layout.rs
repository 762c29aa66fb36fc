//! Accelerator geometry
//!
//! Immutable descriptors for every stage, built once from [`SimulationParams`],
//! plus the few activation flags the operator toggles. Particles only read
//! from here.

use glam::DVec3;
use particle_physics::{plate_drive_force, Beam, OrbitDirection};

use crate::params::{SimulationParams, TubeSpec, ZoneParams};

/// Charged plate perpendicular to `normal`
#[derive(Debug, Clone, PartialEq)]
pub struct Plate {
    pub centre: DVec3,
    pub normal: DVec3,
    pub thickness: f64,
}

impl Plate {
    pub fn half_thickness(&self) -> f64 {
        self.thickness / 2.0
    }

    /// Axial distance from the plate centre within which it repels
    pub fn clearance(&self, wall_clearance: f64) -> f64 {
        wall_clearance + self.half_thickness()
    }

    /// Coordinate of the face looking along `-normal`
    pub fn near_face(&self) -> f64 {
        self.centre.dot(self.normal) - self.half_thickness()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceChamber {
    pub centre: DVec3,
    pub radius: f64,
    pub length: f64,
    pub nozzle: Plate,
    pub seal_wall: Plate,
    pub pump_outlet: DVec3,
    pub sealed: bool,
    pub activated: bool,
}

impl SourceChamber {
    /// Particles whose leading edge reaches past the seal wall are outside.
    pub fn is_outside(&self, position: DVec3, radius: f64) -> bool {
        position.dot(self.seal_wall.normal) + radius > self.seal_wall.near_face()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Linac {
    pub exit_z: f64,
    pub bore_radius: f64,
    pub field_scale: f64,
}

/// Axis-aligned accelerating gap.
///
/// Particles inside move along the box's longest axis and gain
/// `2 q / (h² ε₀)` of drive, `h` being the box height.
#[derive(Debug, Clone, PartialEq)]
pub struct AcceleratorZone {
    pub centre: DVec3,
    pub size: DVec3,
}

impl AcceleratorZone {
    fn from_params(params: &ZoneParams) -> Self {
        Self {
            centre: params.centre,
            size: params.size,
        }
    }

    pub fn contains(&self, position: DVec3) -> bool {
        let half = self.size / 2.0;
        (position - self.centre).abs().cmple(half).all()
    }

    /// Unit vector of the longest side
    pub fn axis(&self) -> DVec3 {
        let s = self.size;
        if s.x >= s.y && s.x >= s.z {
            DVec3::X
        } else if s.z >= s.y {
            DVec3::Z
        } else {
            DVec3::Y
        }
    }

    pub fn height(&self) -> f64 {
        self.size.y
    }

    pub fn drive_force(&self, charge: f64, permittivity: f64) -> f64 {
        plate_drive_force(charge.abs(), self.height(), permittivity)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoosterRing {
    pub centre: DVec3,
    pub orbit_radius: f64,
    pub tube_radius: f64,
    pub direction: OrbitDirection,
    pub accelerator: AcceleratorZone,
    pub boost_complete_speed: f64,
    pub exit_tolerance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConnectingTube {
    pub beam: Beam,
    pub start: DVec3,
    /// Unit direction of travel
    pub direction: DVec3,
    pub length: f64,
}

impl ConnectingTube {
    fn new(beam: Beam, spec: &TubeSpec) -> Self {
        Self {
            beam,
            start: spec.start,
            direction: spec.direction.normalize_or_zero(),
            length: spec.length,
        }
    }

    pub fn end(&self) -> DVec3 {
        self.start + self.direction * self.length
    }

    /// Distance travelled along the tube axis
    pub fn progress(&self, position: DVec3) -> f64 {
        (position - self.start).dot(self.direction)
    }

    pub fn passed_end(&self, position: DVec3) -> bool {
        self.progress(position) >= self.length
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColliderRing {
    pub centre: DVec3,
    pub orbit_radius: f64,
    pub tube_radius: f64,
    pub beam_offset: f64,
    pub accelerator: AcceleratorZone,
    pub min_collision_speed: f64,
    pub capture_distance: f64,
    pub started: bool,
}

impl ColliderRing {
    /// "+" runs on the outer lane, "-" on the inner lane
    pub fn beam_radius(&self, beam: Beam) -> f64 {
        match beam {
            Beam::Positive => self.orbit_radius + self.beam_offset,
            Beam::Negative => self.orbit_radius - self.beam_offset,
        }
    }

    pub fn beam_direction(&self, beam: Beam) -> OrbitDirection {
        match beam {
            Beam::Positive => OrbitDirection::Clockwise,
            Beam::Negative => OrbitDirection::Anticlockwise,
        }
    }
}

/// All stages of the accelerator
#[derive(Debug, Clone, PartialEq)]
pub struct AcceleratorLayout {
    pub source: SourceChamber,
    pub linac: Linac,
    pub booster: BoosterRing,
    pub positive_tube: ConnectingTube,
    pub negative_tube: ConnectingTube,
    pub collider: ColliderRing,
}

impl AcceleratorLayout {
    pub fn new(params: &SimulationParams) -> Self {
        let source = &params.source;
        Self {
            source: SourceChamber {
                centre: source.chamber_centre,
                radius: source.chamber_radius,
                length: source.chamber_length,
                nozzle: Plate {
                    centre: source.nozzle_centre,
                    normal: DVec3::Z,
                    thickness: source.nozzle_thickness,
                },
                seal_wall: Plate {
                    centre: source.seal_wall_centre,
                    normal: DVec3::Z,
                    thickness: source.seal_wall_thickness,
                },
                pump_outlet: source.pump_outlet,
                sealed: false,
                activated: false,
            },
            linac: Linac {
                exit_z: params.linac.exit_z,
                bore_radius: params.linac.bore_radius,
                field_scale: params.linac.field_scale,
            },
            booster: BoosterRing {
                centre: params.booster.centre,
                orbit_radius: params.booster.orbit_radius,
                tube_radius: params.booster.tube_radius,
                direction: params.booster.direction,
                accelerator: AcceleratorZone::from_params(&params.booster.accelerator),
                boost_complete_speed: params.booster.boost_complete_speed,
                exit_tolerance: params.booster.exit_tolerance,
            },
            positive_tube: ConnectingTube::new(Beam::Positive, &params.tubes.positive),
            negative_tube: ConnectingTube::new(Beam::Negative, &params.tubes.negative),
            collider: ColliderRing {
                centre: params.collider.centre,
                orbit_radius: params.collider.orbit_radius,
                tube_radius: params.collider.tube_radius,
                beam_offset: params.collider.beam_offset,
                accelerator: AcceleratorZone::from_params(&params.collider.accelerator),
                min_collision_speed: params.collider.min_collision_speed,
                capture_distance: params.collider.capture_distance,
                started: false,
            },
        }
    }

    pub fn tube(&self, beam: Beam) -> &ConnectingTube {
        match beam {
            Beam::Positive => &self.positive_tube,
            Beam::Negative => &self.negative_tube,
        }
    }

    /// Clear the operator flags, keeping the geometry
    pub fn reset_flags(&mut self) {
        self.source.sealed = false;
        self.source.activated = false;
        self.collider.started = false;
    }
}
