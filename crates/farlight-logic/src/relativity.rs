//! Special-relativistic optics: Lorentz factor, Doppler shift, aberration,
//! beaming, and the visual effect ramp.
//!
//! Conventions: β is the observer's velocity as a fraction of c, n̂ is the
//! galaxy-frame unit direction from the observer to a light source, and the
//! Doppler factor is D = γ·(1 − β·n̂), so an approaching source has D < 1
//! (blueshift) and a receding one D > 1 (redshift). Intensity scales with
//! the reciprocal factor g = 1/D cubed, so approaching sources brighten.
//!
//! All outputs are clamped; no admissible input produces NaN or Inf.

use serde::{Deserialize, Serialize};

use crate::constants::sr;
use crate::vec3::Vec3;

/// Linear RGB triple in [0,1] per channel.
pub type Rgb = [f32; 3];

/// Tint targets for the Doppler color approximation (tunable).
pub const BLUE_TINT: Rgb = [0.55, 0.70, 1.0];
pub const RED_TINT: Rgb = [1.0, 0.45, 0.30];

/// Lorentz factor γ = 1/√(1 − β·β), clamped to [1, GAMMA_MAX].
///
/// Superluminal input (|β| ≥ 1, which the engine never produces but a host
/// might hand us) clamps to GAMMA_MAX rather than going non-finite.
pub fn gamma(beta: &Vec3) -> f64 {
    let b2 = beta.length_squared();
    if b2 < sr::BETA_SQ_REST {
        return 1.0;
    }
    if b2 >= 1.0 {
        return sr::GAMMA_MAX;
    }
    (1.0 / (1.0 - b2).sqrt()).clamp(1.0, sr::GAMMA_MAX)
}

/// Doppler factor D = γ·(1 − β·n̂) for a source in unit direction `n`.
///
/// D < 1 means blueshift (approaching), D > 1 redshift (receding),
/// and exactly 1.0 at rest.
pub fn doppler_factor(beta: &Vec3, n: &Vec3) -> f64 {
    if beta.length_squared() < sr::BETA_SQ_REST {
        return 1.0;
    }
    gamma(beta) * (1.0 - beta.dot(n))
}

/// Aberration, galaxy frame → ship frame.
///
/// Splits n̂ into components parallel and perpendicular to β̂ and applies
///   n̂′∥ = (n∥ − β)/denom,  n̂′⊥ = n⊥/(γ·denom),  denom = 1 − β·n̂,
/// renormalizing the result. The denominator is clamped away from zero.
pub fn aberrate_forward(n: &Vec3, beta: &Vec3) -> Vec3 {
    aberrate(n, beta, false)
}

/// Aberration, ship frame → galaxy frame: the same transform with β negated
/// (denominator 1 + β·n̂′). Inverse of [`aberrate_forward`] to within 1e-6.
pub fn aberrate_inverse(n: &Vec3, beta: &Vec3) -> Vec3 {
    aberrate(n, beta, true)
}

fn aberrate(n: &Vec3, beta: &Vec3, inverse: bool) -> Vec3 {
    let b2 = beta.length_squared();
    if b2 < sr::BETA_SQ_REST {
        return *n;
    }
    let beta = if inverse { -*beta } else { *beta };
    let b_hat = beta.normalize();
    let g = gamma(&beta);

    let n_par = b_hat * n.dot(&b_hat);
    let n_perp = *n - n_par;

    let mut denom = 1.0 - beta.dot(n);
    if denom.abs() < sr::DENOM_EPSILON {
        denom = if denom < 0.0 {
            -sr::DENOM_EPSILON
        } else {
            sr::DENOM_EPSILON
        };
    }

    let par = (n_par - beta) * (1.0 / denom);
    let perp = n_perp * (1.0 / (g * denom));
    (par + perp).normalize()
}

/// Apparent (ship-frame) direction to a source seen from a moving observer.
///
/// This is the sky-crowding map: at high |β| source directions bunch toward
/// the direction of travel. Identical to [`aberrate_inverse`] on the
/// direction-to-source vector; kept as its own name because the emitter
/// reads far better this way.
pub fn apparent_direction(n_to_source: &Vec3, beta: &Vec3) -> Vec3 {
    aberrate_inverse(n_to_source, beta)
}

/// Beaming intensity multiplier I′/I = (1/D)³, clamped to
/// [BEAMING_MIN, BEAMING_MAX] after cubing.
///
/// Approaching sources (D < 1) brighten, receding ones dim. The clamp is
/// applied with max/min so a degenerate D yields a bound, never NaN.
pub fn beaming_multiplier(doppler: f64) -> f64 {
    let g = 1.0 / doppler.max(sr::DENOM_EPSILON);
    (g * g * g).max(sr::BEAMING_MIN).min(sr::BEAMING_MAX)
}

/// Doppler color approximation: lerp the base color toward a blue tint by
/// (1 − D)·k when blueshifted, toward a red tint by (D − 1)·k/2 when
/// redshifted. `blend` scales the whole effect (see [`effect_ramp`]).
pub fn shift_color(base: Rgb, doppler: f64, blend: f64) -> Rgb {
    let k = sr::COLOR_SHIFT_STRENGTH;
    let (target, t) = if doppler < 1.0 {
        (BLUE_TINT, (1.0 - doppler) * k)
    } else {
        (RED_TINT, (doppler - 1.0) * k / 2.0)
    };
    let t = (t * blend).clamp(0.0, 1.0) as f32;
    [
        base[0] + (target[0] - base[0]) * t,
        base[1] + (target[1] - base[1]) * t,
        base[2] + (target[2] - base[2]) * t,
    ]
}

/// Blackbody alternative to [`shift_color`]: observed temperature T′ = T/D.
pub fn shifted_temperature(temp_k: f64, doppler: f64) -> f64 {
    temp_k / doppler.max(sr::DENOM_EPSILON)
}

/// Proper-time rate dτ/dt from velocity alone: 1/γ.
pub fn sr_time_factor(beta: &Vec3) -> f64 {
    1.0 / gamma(beta)
}

/// Smooth effect-strength scalar in [0,1] from γ.
///
/// Zero below RAMP_GAMMA_START, one at RAMP_GAMMA_FULL, linear between, so
/// corrections fade in continuously as the ship accelerates.
pub fn effect_ramp(gamma: f64) -> f64 {
    if gamma <= sr::RAMP_GAMMA_START {
        0.0
    } else {
        ((gamma - sr::RAMP_GAMMA_START) / (sr::RAMP_GAMMA_FULL - sr::RAMP_GAMMA_START)).min(1.0)
    }
}

/// Per-frame SR summary handed to the emitter and host.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct SrSnapshot {
    /// Whether SR corrections are visible at all this frame.
    pub enabled: bool,
    pub beta: Vec3,
    pub gamma: f64,
    /// Blend strength from [`effect_ramp`].
    pub ramp: f64,
}

impl SrSnapshot {
    pub fn from_beta(beta: Vec3) -> Self {
        let g = gamma(&beta);
        let ramp = effect_ramp(g);
        Self {
            enabled: ramp > 0.0,
            beta,
            gamma: g,
            ramp,
        }
    }

    pub fn at_rest() -> Self {
        Self {
            enabled: false,
            beta: Vec3::ZERO,
            gamma: 1.0,
            ramp: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn close(a: f64, b: f64, eps: f64) -> bool {
        (a - b).abs() < eps
    }

    #[test]
    fn gamma_at_rest_is_one() {
        assert_eq!(gamma(&Vec3::ZERO), 1.0);
    }

    #[test]
    fn gamma_clamps_near_lightspeed() {
        let g = gamma(&Vec3::new(0.0, 0.0, 0.999999999));
        assert!(g.is_finite());
        assert!(close(g, 50.0, 1e-9));
        // Superluminal garbage from a host clamps too.
        assert_eq!(gamma(&Vec3::new(0.0, 0.0, 1.5)), 50.0);
    }

    #[test]
    fn gamma_known_value() {
        // β = 0.9 → γ ≈ 2.2942
        let g = gamma(&Vec3::new(0.0, 0.0, 0.9));
        assert!(close(g, 2.294157, 1e-5));
    }

    #[test]
    fn doppler_limits() {
        let beta = Vec3::new(0.0, 0.0, 0.5);
        let ahead = Vec3::new(0.0, 0.0, 1.0);
        let behind = Vec3::new(0.0, 0.0, -1.0);
        assert!(doppler_factor(&beta, &ahead) < 1.0, "approaching blueshifts");
        assert!(doppler_factor(&beta, &behind) > 1.0, "receding redshifts");
        assert_eq!(doppler_factor(&Vec3::ZERO, &ahead), 1.0);
    }

    #[test]
    fn doppler_cruise_blueshift_value() {
        // β = 0.9 toward a source dead ahead: D = γ·0.1 ≈ 0.2294
        let d = doppler_factor(&Vec3::new(0.0, 0.0, 0.9), &Vec3::new(0.0, 0.0, 1.0));
        assert!(close(d, 0.2294157, 1e-5));
        assert!(d < 1.0);
    }

    #[test]
    fn aberration_identity_at_rest() {
        let n = Vec3::new(0.6, 0.0, 0.8);
        assert_eq!(aberrate_forward(&n, &Vec3::ZERO), n);
        assert_eq!(aberrate_inverse(&n, &Vec3::ZERO), n);
    }

    #[test]
    fn aberration_preserves_axis() {
        // A direction along β stays along β.
        let beta = Vec3::new(0.0, 0.0, 0.8);
        let n = Vec3::new(0.0, 0.0, 1.0);
        let fwd = aberrate_forward(&n, &beta);
        assert!(close(fwd.z, 1.0, 1e-12));
    }

    #[test]
    fn apparent_directions_bunch_forward() {
        // A source at 90° appears dragged toward the direction of travel.
        let beta = Vec3::new(0.0, 0.0, 0.9);
        let side = Vec3::new(1.0, 0.0, 0.0);
        let seen = apparent_direction(&side, &beta);
        assert!(seen.z > 0.5, "expected forward bunching, got {:?}", seen);
        assert!(close(seen.length(), 1.0, 1e-9));
    }

    #[test]
    fn beaming_bounds() {
        assert!(close(beaming_multiplier(1.0), 1.0, 1e-12));
        assert_eq!(beaming_multiplier(0.0), 100.0);
        assert_eq!(beaming_multiplier(f64::INFINITY), 0.01);
        // NaN falls to the clamp, never propagates.
        let m = beaming_multiplier(f64::NAN);
        assert!(m.is_finite());
    }

    #[test]
    fn beaming_brightens_approach() {
        // D < 1 (approaching) must brighten.
        assert!(beaming_multiplier(0.5) > 1.0);
        assert!(beaming_multiplier(2.0) < 1.0);
    }

    #[test]
    fn color_shift_directions() {
        let white: Rgb = [1.0, 1.0, 1.0];
        let blue = shift_color(white, 0.5, 1.0);
        assert!(blue[2] >= blue[0], "blueshift leans blue: {:?}", blue);
        let red = shift_color(white, 2.0, 1.0);
        assert!(red[0] >= red[2], "redshift leans red: {:?}", red);
        // Zero blend is a no-op.
        assert_eq!(shift_color(white, 0.5, 0.0), white);
    }

    #[test]
    fn temperature_model() {
        // Blueshift raises the observed temperature, redshift lowers it.
        assert!(shifted_temperature(5700.0, 0.5) > 5700.0);
        assert!(shifted_temperature(5700.0, 2.0) < 5700.0);
        assert_eq!(shifted_temperature(5700.0, 1.0), 5700.0);
    }

    #[test]
    fn ramp_endpoints() {
        assert_eq!(effect_ramp(1.0), 0.0);
        assert_eq!(effect_ramp(1.1), 0.0);
        assert!(close(effect_ramp(5.0), 1.0, 1e-12));
        assert_eq!(effect_ramp(50.0), 1.0);
        let mid = effect_ramp(3.05);
        assert!(mid > 0.0 && mid < 1.0);
    }

    proptest! {
        #[test]
        fn aberration_involution(
            bx in -0.9f64..0.9,
            by in -0.9f64..0.9,
            bz in -0.9f64..0.9,
            nx in -1.0f64..1.0,
            ny in -1.0f64..1.0,
            nz in -1.0f64..1.0,
        ) {
            let beta = Vec3::new(bx, by, bz);
            prop_assume!(beta.length() < 0.99);
            let n = Vec3::new(nx, ny, nz);
            prop_assume!(n.length() > 1e-3);
            let n = n.normalize();

            let round = aberrate_inverse(&aberrate_forward(&n, &beta), &beta);
            prop_assert!(round.distance(&n) < 1e-6, "{:?} -> {:?}", n, round);
        }

        #[test]
        fn doppler_sign_matches_approach(
            b in 0.01f64..0.99,
            nz in -1.0f64..1.0,
        ) {
            let beta = Vec3::new(0.0, 0.0, b);
            let n = Vec3::new((1.0 - nz * nz).sqrt(), 0.0, nz);
            let d = doppler_factor(&beta, &n);
            if beta.dot(&n) > 1e-9 {
                prop_assert!(d < 1.0);
            } else if beta.dot(&n) < -1e-9 {
                prop_assert!(d > 1.0);
            }
        }

        #[test]
        fn beaming_always_bounded(d in -10.0f64..10.0) {
            let m = beaming_multiplier(d);
            prop_assert!((0.01..=100.0).contains(&m));
        }
    }
}
