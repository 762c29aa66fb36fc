//! Collision product classifier and the running Higgs-probability estimate

use std::fmt;

use particle_physics::{ParticleKind, HIGGS_MASS_GEV, MAX_ENERGY_SAMPLE_GEV, MIN_ENERGY_SAMPLE_GEV};
use rand::Rng;

/// Collision-type categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CollisionCategory {
    ElasticScattering,
    ResonanceProduction,
    DeepInelasticScattering,
    JetsFormation,
    QuarkAntiquarkAnnihilation,
    GluonGluonFusion,
    HiggsProduction,
    InelasticScattering,
    PartonPartonScattering,
}

impl CollisionCategory {
    pub fn name(self) -> &'static str {
        match self {
            CollisionCategory::ElasticScattering => "Elastic Scattering",
            CollisionCategory::ResonanceProduction => "Resonance Production",
            CollisionCategory::DeepInelasticScattering => "Deep Inelastic Scattering",
            CollisionCategory::JetsFormation => "Jets Formation",
            CollisionCategory::QuarkAntiquarkAnnihilation => "Quark-Antiquark Annihilation",
            CollisionCategory::GluonGluonFusion => "Gluon-Gluon Fusion",
            CollisionCategory::HiggsProduction => "Higgs Production",
            CollisionCategory::InelasticScattering => "Inelastic Scattering",
            CollisionCategory::PartonPartonScattering => "Parton-Parton Scattering",
        }
    }

    /// Ordered product list of this category
    pub fn products(self) -> &'static [ProductSpec] {
        match self {
            CollisionCategory::ElasticScattering => ELASTIC,
            CollisionCategory::ResonanceProduction => RESONANCE,
            CollisionCategory::DeepInelasticScattering => DEEP_INELASTIC,
            CollisionCategory::JetsFormation => JETS,
            CollisionCategory::QuarkAntiquarkAnnihilation => ANNIHILATION,
            CollisionCategory::GluonGluonFusion => FUSION,
            CollisionCategory::HiggsProduction => HIGGS,
            CollisionCategory::InelasticScattering => INELASTIC,
            CollisionCategory::PartonPartonScattering => PARTON,
        }
    }
}

impl fmt::Display for CollisionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Charge of a product in units of the proton charge
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProductCharge {
    Fixed(f64),
    /// One of `+1`, `-1`, `0`, drawn when the product is materialised
    Random,
}

/// One entry of a category's product list
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProductSpec {
    pub label: &'static str,
    pub kind: ParticleKind,
    pub charge: ProductCharge,
    /// Jet products expand into a cluster of particles
    pub cluster: bool,
}

impl ProductSpec {
    const fn new(label: &'static str, kind: ParticleKind, charge: f64) -> Self {
        Self {
            label,
            kind,
            charge: ProductCharge::Fixed(charge),
            cluster: false,
        }
    }

    const fn random(label: &'static str, kind: ParticleKind) -> Self {
        Self {
            label,
            kind,
            charge: ProductCharge::Random,
            cluster: false,
        }
    }

    const fn jet(label: &'static str, kind: ParticleKind) -> Self {
        Self {
            label,
            kind,
            charge: ProductCharge::Fixed(0.0),
            cluster: true,
        }
    }

    /// Resolve a random charge; fixed charges pass through.
    pub fn draw_charge<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, &'static str) {
        match self.charge {
            ProductCharge::Fixed(charge) => (charge, self.label),
            ProductCharge::Random => {
                let charge = [1.0, -1.0, 0.0][rng.random_range(0..3)];
                (charge, charged_label(self.kind, charge))
            }
        }
    }
}

fn charged_label(kind: ParticleKind, charge: f64) -> &'static str {
    match (kind, charge.partial_cmp(&0.0)) {
        (ParticleKind::Pion, Some(std::cmp::Ordering::Greater)) => "Pion+",
        (ParticleKind::Pion, Some(std::cmp::Ordering::Less)) => "Pion-",
        (ParticleKind::Pion, _) => "Pion0",
        (ParticleKind::Kaon, Some(std::cmp::Ordering::Greater)) => "Kaon+",
        (ParticleKind::Kaon, Some(std::cmp::Ordering::Less)) => "Kaon-",
        (ParticleKind::Kaon, _) => "Kaon0",
        (kind, _) => kind.label(),
    }
}

use ParticleKind::*;

const ELASTIC: &[ProductSpec] = &[
    ProductSpec::new("Proton", Proton, 1.0),
    ProductSpec::new("Proton", Proton, 1.0),
];

const RESONANCE: &[ProductSpec] = &[
    ProductSpec::new("Baryon", Baryon, 1.0),
    ProductSpec::new("Proton", Proton, 1.0),
    ProductSpec::new("Neutron", Neutron, 0.0),
    ProductSpec::random("Pion", Pion),
];

const DEEP_INELASTIC: &[ProductSpec] = &[
    ProductSpec::random("Pion", Pion),
    ProductSpec::random("Kaon", Kaon),
    ProductSpec::new("Neutrino", Neutrino, 0.0),
    ProductSpec::new("Lepton", Lepton, -1.0),
];

const JETS: &[ProductSpec] = &[
    ProductSpec::jet("Pion Jet", Pion),
    ProductSpec::jet("Kaon Jet", Kaon),
];

const ANNIHILATION: &[ProductSpec] = &[
    ProductSpec::new("W+ Boson", Boson, 1.0),
    ProductSpec::new("W- Boson", Boson, -1.0),
    ProductSpec::new("Z0 Boson", Boson, 0.0),
];

const FUSION: &[ProductSpec] = &[
    ProductSpec::new("Top Quark", Quark, 2.0 / 3.0),
    ProductSpec::new("Antitop Quark", Quark, -2.0 / 3.0),
];

const HIGGS: &[ProductSpec] = &[
    ProductSpec::new("Higgs Boson", Boson, 0.0),
    ProductSpec::new("Top Quark", Quark, 2.0 / 3.0),
    ProductSpec::new("Antitop Quark", Quark, -2.0 / 3.0),
    ProductSpec::new("Photon", Photon, 0.0),
    ProductSpec::new("Z Boson", Boson, 0.0),
    ProductSpec::new("W Boson", Boson, 1.0),
    ProductSpec::new("Bottom Quark", Quark, -1.0 / 3.0),
    ProductSpec::new("Tau Lepton", Lepton, -1.0),
];

const INELASTIC: &[ProductSpec] = &[
    ProductSpec::new("Pion+", Pion, 1.0),
    ProductSpec::new("Pion-", Pion, -1.0),
    ProductSpec::new("Pion0", Pion, 0.0),
    ProductSpec::new("Kaon+", Kaon, 1.0),
    ProductSpec::new("Kaon-", Kaon, -1.0),
    ProductSpec::new("Kaon0", Kaon, 0.0),
];

const PARTON: &[ProductSpec] = &[
    ProductSpec::jet("Baryon Jet", Baryon),
    ProductSpec::jet("Meson Jet", Meson),
];

/// Category of a rest-mass energy sample (GeV).
///
/// Evaluated top-down, first match wins. Samples outside the generator's
/// range fall into Parton-Parton Scattering; gaps of the table inside
/// `(10, 500]` fall into Deep Inelastic Scattering.
pub fn classify(energy: f64) -> CollisionCategory {
    use CollisionCategory::*;

    if !(MIN_ENERGY_SAMPLE_GEV..=MAX_ENERGY_SAMPLE_GEV).contains(&energy) {
        return PartonPartonScattering;
    }

    match energy {
        e if e <= 2.0 => ElasticScattering,
        e if e <= 5.0 => ResonanceProduction,
        e if e <= 10.0 => DeepInelasticScattering,
        e if e > 1000.0 => PartonPartonScattering,
        e if e > 500.0 => InelasticScattering,
        e if e > 130.0 => DeepInelasticScattering,
        e if (124.0..=126.0).contains(&e) => HiggsProduction,
        e if e > 100.1 => GluonGluonFusion,
        e if e > 80.1 && e <= 100.0 => QuarkAntiquarkAnnihilation,
        e if e > 20.1 && e <= 30.0 => JetsFormation,
        _ => DeepInelasticScattering,
    }
}

/// Draw a rest-mass energy uniformly from `[min, max]`, rounded to 0.1 GeV
pub fn sample_energy<R: Rng + ?Sized>(rng: &mut R, min: f64, max: f64) -> f64 {
    let raw = rng.random_range(min..=max);
    ((raw * 10.0).round() / 10.0).clamp(min, max)
}

/// Probability contributed by one sample: `max(0, 1 - |s - 125| / 125)`
pub fn higgs_probability(energy: f64) -> f64 {
    (1.0 - (energy - HIGGS_MASS_GEV).abs() / HIGGS_MASS_GEV).max(0.0)
}

/// Append-only record of energy samples and their probabilities
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RunningEstimate {
    samples: Vec<f64>,
    probability_sum: f64,
    last_probability: f64,
}

impl RunningEstimate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a sample and return its probability
    pub fn record(&mut self, energy: f64) -> f64 {
        let probability = higgs_probability(energy);
        self.samples.push(energy);
        self.probability_sum += probability;
        self.last_probability = probability;
        probability
    }

    pub fn count(&self) -> usize {
        self.samples.len()
    }

    pub fn samples(&self) -> &[f64] {
        &self.samples
    }

    pub fn last_probability(&self) -> f64 {
        self.last_probability
    }

    /// `sum / count`, zero before the first sample
    pub fn mean_probability(&self) -> f64 {
        if self.samples.is_empty() {
            0.0
        } else {
            self.probability_sum / self.samples.len() as f64
        }
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }
}

/// One reading as shown on the collision data panel
#[derive(Debug, Clone, PartialEq)]
pub struct CollisionReport {
    pub reading_number: u32,
    pub category: CollisionCategory,
    pub initial_energy: f64,
    pub energy: f64,
    pub products: Vec<&'static str>,
    pub mean_probability: f64,
}

impl fmt::Display for CollisionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Reading {}", self.reading_number)?;
        writeln!(f, "Collision Type: {}", self.category)?;
        writeln!(f, "Initial Energy: {:.0}GeV", self.initial_energy)?;
        writeln!(f, "Rest Mass Energy: {:.1}GeV", self.energy)?;
        writeln!(f, "Collision Products: {}", self.products.join(", "))?;
        write!(f, "Higgs Probability: {:.4}", self.mean_probability)
    }
}
