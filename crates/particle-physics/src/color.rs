//! Per-kind display colours taken from the Catppuccin Mocha palette

use catppuccin::{Color, PALETTE};

use crate::particle::ParticleKind;

fn linear_rgba(color: &Color, alpha: f32) -> [f32; 4] {
    [
        color.rgb.r as f32 / 255.0,
        color.rgb.g as f32 / 255.0,
        color.rgb.b as f32 / 255.0,
        alpha,
    ]
}

impl ParticleKind {
    /// RGBA colour in `0.0..=1.0` used by renderers for this kind
    pub fn color(self) -> [f32; 4] {
        let mocha = &PALETTE.mocha.colors;
        let color = match self {
            ParticleKind::HydrogenAtom => &mocha.sky,
            ParticleKind::Proton => &mocha.red,
            ParticleKind::Baryon => &mocha.maroon,
            ParticleKind::Pion => &mocha.green,
            ParticleKind::Kaon => &mocha.teal,
            ParticleKind::Neutron => &mocha.overlay2,
            ParticleKind::Meson => &mocha.peach,
            ParticleKind::Neutrino => &mocha.lavender,
            ParticleKind::Lepton => &mocha.blue,
            ParticleKind::Boson => &mocha.yellow,
            ParticleKind::Quark => &mocha.mauve,
            ParticleKind::Photon => &mocha.rosewater,
        };
        linear_rgba(color, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn colours_are_opaque_and_normalised() {
        for kind in [ParticleKind::HydrogenAtom, ParticleKind::Proton, ParticleKind::Photon] {
            let [r, g, b, a] = kind.color();
            assert_eq!(a, 1.0);
            for channel in [r, g, b] {
                assert!((0.0..=1.0).contains(&channel));
            }
        }
        assert_ne!(ParticleKind::Proton.color(), ParticleKind::HydrogenAtom.color());
    }
}
