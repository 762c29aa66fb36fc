//! Physical constants for the accelerator simulation
//!
//! These are artificially scaled so that a proton can be carried from the
//! source chamber to the collider ring in a few thousand ticks while keeping
//! the relative relationships between the stages.

/// Default number of physics ticks per simulated second
pub const RATE_OF_CALCULATIONS: f64 = 200.0;

/// Length of one tick at the default rate
pub const TIME_PERIOD: f64 = 1.0 / RATE_OF_CALCULATIONS;

/// Permittivity of free space (F/m)
pub const PERMITTIVITY_OF_FREE_SPACE: f64 = 8.85418782e-12;

/// Coulomb constant (k = 1/(4πε₀))
pub const COULOMB_LAW_CONSTANT: f64 = 8.9875517923e9;

/// Simulated proton mass (simulation units)
pub const SIMULATED_PROTON_MASS: f64 = 1.0;

/// Simulated proton charge
/// Scaled down so the electrostatic nudges stay in the sub-unit range
pub const SIMULATED_PROTON_CHARGE: f64 = 1.0e-6;

/// Simulated proton radius, also used for every product particle
pub const SIMULATED_PROTON_RADIUS: f64 = 0.25;

/// Minimum separation used by the Coulomb law to prevent singularities at r→0
pub const SOFTENING: f64 = 0.05;

/// Angle returned by the angle helpers when the two points coincide
pub const DEGENERATE_ANGLE: f64 = std::f64::consts::FRAC_PI_2;

/// Energy of each beam before the collision (GeV)
pub const INITIAL_BEAM_ENERGY_GEV: f64 = 13000.0;

/// Rest-mass energy the running estimate is centred on (GeV)
pub const HIGGS_MASS_GEV: f64 = 125.0;

/// Smallest rest-mass energy sample the classifier expects (GeV)
pub const MIN_ENERGY_SAMPLE_GEV: f64 = 0.1;

/// Largest rest-mass energy sample the classifier expects (GeV)
pub const MAX_ENERGY_SAMPLE_GEV: f64 = 10000.0;
