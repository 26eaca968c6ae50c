//! # Closed-Form Beam Formulas
//!
//! Hand-calculation formulas used to derive material constants and to
//! cross-check the finite element results.
//!
//! ## Notation
//!
//! - `L` = Total length
//! - `a` = Cantilever (overhang) length
//! - `b` = Backspan length
//! - `w` = Uniform load intensity (force per unit length)
//! - `E` = Modulus of elasticity
//! - `I` = Moment of inertia
//! - `nu` = Poisson's ratio
//! - `k` = Effective length factor
//!
//! ## Sign Conventions
//!
//! Reactions follow the FE model: a load in +Y produces negative reactions.

use std::f64::consts::PI;

use crate::errors::{CalcError, CalcResult};

/// Shear modulus from Poisson's ratio and elastic modulus.
///
/// G = E / (2(1 + nu))
///
/// # Example
/// ```
/// use beam_core::equations::calc_shear_modulus;
///
/// let g = calc_shear_modulus(0.2, 3645.0).unwrap();
/// assert!((g - 1518.75).abs() < 1e-9);
/// ```
pub fn calc_shear_modulus(nu: f64, e: f64) -> CalcResult<f64> {
    let denominator = 2.0 * (1.0 + nu);
    if denominator == 0.0 {
        return Err(CalcError::configuration(
            "nu",
            nu.to_string(),
            "Poisson's ratio of -1 gives no finite shear modulus",
        ));
    }
    Ok(e / denominator)
}

/// Euler critical buckling load of a pin-ended strut of length `l`.
///
/// P_cr = π²EI / (kl)²
#[inline]
pub fn euler_buckling_load(l: f64, e: f64, i: f64, k: f64) -> f64 {
    PI * PI * e * i / (k * l).powi(2)
}

/// Reactions of a simply supported beam with an overhang under a
/// full-length uniform load `w`.
///
/// ```text
///   w w w w w w w w w w w w
///   ───────────────────────────
///   △ R2        △ R1
///   ←─── b ────→←── a ──→
/// ```
///
/// # Formulas
/// - R1 = w(a + b)·(a + b)/2 / b   (cantilever support)
/// - R2 = w(a + b) − R1            (backspan support)
///
/// # Returns
/// `(-R1, -R2)` so the values compare directly with FE reactions for a load
/// applied in +Y.
pub fn ss_cant_reactions(w: f64, a: f64, b: f64) -> (f64, f64) {
    let length = a + b;
    let resultant = w * length;
    let r1 = resultant * (length / 2.0) / b;
    let r2 = resultant - r1;
    (-r1, -r2)
}

/// Split a total length at the cantilever support: `(backspan, cantilever)`.
///
/// # Example
/// ```
/// use beam_core::equations::spans;
/// assert_eq!(spans(10.0, 7.0), (7.0, 3.0));
/// ```
#[inline]
pub fn spans(total_length: f64, cant_support_loc: f64) -> (f64, f64) {
    (cant_support_loc, total_length - cant_support_loc)
}

/// Midspan moment of a simply supported span under uniform load: wL²/8
#[inline]
pub fn simple_span_udl_moment(w: f64, l: f64) -> f64 {
    w * l * l / 8.0
}

/// Midspan deflection of a simply supported span under uniform load:
/// 5wL⁴ / 384EI
#[inline]
pub fn simple_span_udl_deflection(w: f64, l: f64, e: f64, i: f64) -> f64 {
    5.0 * w * l.powi(4) / (384.0 * e * i)
}

/// Tip deflection of a cantilever with a point load at the tip: PL³ / 3EI
#[inline]
pub fn cantilever_tip_deflection(p: f64, l: f64, e: f64, i: f64) -> f64 {
    p * l.powi(3) / (3.0 * e * i)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn round2(v: f64) -> f64 {
        (v * 100.0).round() / 100.0
    }

    #[test]
    fn test_shear_modulus() {
        assert_relative_eq!(calc_shear_modulus(0.3, 200_000.0).unwrap(), 76923.07692307692, max_relative = 1e-12);
        assert_relative_eq!(calc_shear_modulus(0.2, 3645.0).unwrap(), 1518.75, max_relative = 1e-12);
    }

    #[test]
    fn test_shear_modulus_rejects_minus_one() {
        let err = calc_shear_modulus(-1.0, 200_000.0).unwrap_err();
        assert_eq!(err.error_code(), "CONFIGURATION_ERROR");
    }

    #[test]
    fn test_euler_buckling_load() {
        assert_relative_eq!(
            euler_buckling_load(5300.0, 200_000.0, 632e6, 1.0),
            44411463.02234584,
            max_relative = 1e-12
        );
        assert_relative_eq!(
            euler_buckling_load(212.0, 3645.0, 5125.4, 2.0),
            1025.6361727834453,
            max_relative = 1e-12
        );
    }

    #[test]
    fn test_ss_cant_reactions() {
        let (r1, r2) = ss_cant_reactions(50.0, 2350.0, 4500.0);
        assert_eq!((round2(r1), round2(r2)), (-260680.56, -81819.44));

        // equal spans put the whole load on the cantilever support
        let (r1, r2) = ss_cant_reactions(19.0, 96.0, 96.0);
        assert_eq!(round2(r1), -3648.0);
        assert_eq!(round2(r2), 0.0);
    }

    #[test]
    fn test_spans() {
        assert_eq!(spans(10.0, 7.0), (7.0, 3.0));
        assert_eq!(spans(30.0, 10.0), (10.0, 20.0));
        assert_eq!(spans(5.0, 0.0), (0.0, 5.0));
    }

    #[test]
    fn test_textbook_formulas() {
        assert_relative_eq!(simple_span_udl_moment(2.0, 10.0), 25.0);
        assert_relative_eq!(simple_span_udl_deflection(1.0, 2.0, 1.0, 1.0), 5.0 * 16.0 / 384.0);
        assert_relative_eq!(cantilever_tip_deflection(3.0, 2.0, 1.0, 2.0), 4.0);
    }
}
