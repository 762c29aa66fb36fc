//! Vector helpers shared by the force model, the transit stages and the
//! collision resolver.
//!
//! All angle helpers work on component *magnitudes*; the direction is restored
//! separately through [`quartile_signs`]. This mirrors the way forces are
//! computed as scalars and then projected back onto the three axes.

use std::f64::consts::{FRAC_PI_2, TAU};

use glam::DVec3;

use crate::constants::DEGENERATE_ANGLE;

/// Euclidean distance between two points
pub fn magnitude(a: DVec3, b: DVec3) -> f64 {
    (b - a).length()
}

pub fn midpoint(a: DVec3, b: DVec3) -> DVec3 {
    (a + b) * 0.5
}

pub fn cross_product(a: DVec3, b: DVec3) -> DVec3 {
    a.cross(b)
}

/// Per-axis sign (+1/-1) of `b - a`.
///
/// An axis with zero difference takes the matching component sign of
/// `fallback`, so callers decide the tie-break convention.
pub fn quartile_signs(a: DVec3, b: DVec3, fallback: DVec3) -> DVec3 {
    let diff = b - a;
    let sign = |d: f64, f: f64| {
        if d > 0.0 {
            1.0
        } else if d < 0.0 {
            -1.0
        } else if f < 0.0 {
            -1.0
        } else {
            1.0
        }
    };
    DVec3::new(
        sign(diff.x, fallback.x),
        sign(diff.y, fallback.y),
        sign(diff.z, fallback.z),
    )
}

/// Angle of `b` around `a` in the X–Z orbital plane, in `[0, 2π)`.
///
/// A zero horizontal separation resolves to `π/2` or `3π/2` from the sign of
/// the Z separation, and to `π/2` when the points coincide.
pub fn two_d_angle(a: DVec3, b: DVec3) -> f64 {
    let dx = b.x - a.x;
    let dz = b.z - a.z;

    if dx == 0.0 {
        return if dz < 0.0 {
            3.0 * FRAC_PI_2
        } else {
            DEGENERATE_ANGLE
        };
    }

    let angle = dz.atan2(dx).rem_euclid(TAU);
    // rem_euclid rounds tiny negative angles up to exactly TAU
    if angle >= TAU {
        0.0
    } else {
        angle
    }
}

/// Decomposes the displacement `b - a` into two perpendicular angles.
///
/// Returns `(α, β, 0)` where `α` is the angle between the X and Z magnitudes
/// (measured from Z) and `β` the elevation of the Y magnitude over the X–Z
/// plane. Use [`project`] to turn a scalar back into a vector.
pub fn three_d_angle(a: DVec3, b: DVec3) -> DVec3 {
    let diff = (b - a).abs();
    let planar = (diff.x * diff.x + diff.z * diff.z).sqrt();

    let alpha = if planar == 0.0 {
        DEGENERATE_ANGLE
    } else {
        diff.x.atan2(diff.z)
    };

    let beta = if planar == 0.0 {
        DEGENERATE_ANGLE
    } else {
        diff.y.atan2(planar)
    };

    DVec3::new(alpha, beta, 0.0)
}

/// Unit weights `(cos β sin α, sin β, cos β cos α)` for a `(α, β, _)` pair
pub fn axis_weights(angles: DVec3) -> DVec3 {
    let (alpha, beta) = (angles.x, angles.y);
    DVec3::new(
        beta.cos() * alpha.sin(),
        beta.sin(),
        beta.cos() * alpha.cos(),
    )
}

/// Projects a scalar onto the three axes using [`three_d_angle`] output and
/// per-axis signs from [`quartile_signs`].
pub fn project(magnitude: f64, angles: DVec3, signs: DVec3) -> DVec3 {
    axis_weights(angles) * signs * magnitude
}

/// Point on a horizontal circle around `centre` at `angle` (X–Z plane)
pub fn point_on_orbit(centre: DVec3, radius: f64, angle: f64) -> DVec3 {
    DVec3::new(
        centre.x + radius * angle.cos(),
        centre.y,
        centre.z + radius * angle.sin(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    const EPS: f64 = 1e-12;

    #[test]
    fn two_d_angle_covers_full_circle() {
        let o = DVec3::ZERO;
        assert!((two_d_angle(o, DVec3::new(1.0, 0.0, 0.0)) - 0.0).abs() < EPS);
        assert!((two_d_angle(o, DVec3::new(0.0, 0.0, 1.0)) - FRAC_PI_2).abs() < EPS);
        assert!((two_d_angle(o, DVec3::new(-1.0, 0.0, 0.0)) - PI).abs() < EPS);
        assert!((two_d_angle(o, DVec3::new(0.0, 0.0, -1.0)) - 3.0 * FRAC_PI_2).abs() < EPS);
        assert!((two_d_angle(o, DVec3::new(1.0, 0.0, -1.0)) - 7.0 * PI / 4.0).abs() < EPS);
    }

    #[test]
    fn angles_of_coincident_points_default_to_right_angle() {
        let p = DVec3::new(3.0, -2.0, 7.5);
        assert_eq!(two_d_angle(p, p), FRAC_PI_2);

        let angles = three_d_angle(p, p);
        assert_eq!(angles.x, FRAC_PI_2);
        assert_eq!(angles.y, FRAC_PI_2);
        assert_eq!(angles.z, 0.0);
        assert!(!axis_weights(angles).is_nan());
    }

    #[test]
    fn three_d_angle_reprojects_magnitude() {
        let a = DVec3::new(1.0, 2.0, 3.0);
        let b = DVec3::new(-2.0, 6.0, 15.0);
        let diff = b - a;

        let angles = three_d_angle(a, b);
        let signs = quartile_signs(a, b, DVec3::ONE);
        let rebuilt = project(diff.length(), angles, signs);

        assert!((rebuilt - diff).length() < 1e-9, "{rebuilt:?} != {diff:?}");
    }

    #[test]
    fn quartile_signs_use_fallback_on_ties() {
        let a = DVec3::new(0.0, 1.0, 5.0);
        let b = DVec3::new(0.0, 0.0, 9.0);

        assert_eq!(quartile_signs(a, b, DVec3::ONE), DVec3::new(1.0, -1.0, 1.0));
        assert_eq!(quartile_signs(a, b, -DVec3::ONE), DVec3::new(-1.0, -1.0, 1.0));
    }

    #[test]
    fn midpoint_and_cross_product() {
        let a = DVec3::new(0.0, 0.0, -10.0);
        let b = DVec3::new(4.0, 2.0, 10.0);
        assert_eq!(midpoint(a, b), DVec3::new(2.0, 1.0, 0.0));
        assert_eq!(cross_product(DVec3::X, DVec3::Y), DVec3::Z);
        assert!((magnitude(a, b) - (16.0f64 + 4.0 + 400.0).sqrt()).abs() < EPS);
    }
}
