//! General-relativistic environment around massive objects: dimensionless
//! potential, time dilation, gravitational redshift, tidal severity, and
//! the danger classification the host uses to gate lensing effects.
//!
//! Schwarzschild throughout: Φ = r_s/2r and dτ/dt = √(1 − r_s/r), with the
//! square root floored at √ε so proper time keeps advancing arbitrarily
//! close to the horizon.

use serde::{Deserialize, Serialize};

use crate::constants::gr;

/// Kind of compact object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MassiveKind {
    BlackHole,
    NeutronStar,
    WhiteDwarf,
}

/// Qualitative strength of the gravitational environment, from Φ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum DangerLevel {
    None,
    Subtle,
    Strong,
    Extreme,
}

/// Dimensionless potential Φ = r_s / (2r).
pub fn potential(r_s: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return gr::PHI_EXTREME;
    }
    r_s / (2.0 * r)
}

/// Gravitational time dilation dτ/dt = √(max(1 − r_s/r, ε)).
///
/// Never returns zero: at and inside the horizon the factor bottoms out at
/// √ε, so the ship's clock always runs.
pub fn time_dilation(r_s: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return gr::DILATION_EPSILON.sqrt();
    }
    (1.0 - r_s / r).max(gr::DILATION_EPSILON).sqrt()
}

/// Gravitational redshift factor, the reciprocal of [`time_dilation`].
pub fn redshift_factor(r_s: f64, r: f64) -> f64 {
    1.0 / time_dilation(r_s, r)
}

/// Tidal severity heuristic in [0,1]: r_s/r² against a full-scale constant.
///
/// Above ~0.5 indefinite station-keeping is a bad idea.
pub fn tidal_severity(r_s: f64, r: f64) -> f64 {
    if r <= 0.0 {
        return 1.0;
    }
    (r_s / (r * r) / gr::TIDAL_FULL_SCALE).clamp(0.0, 1.0)
}

/// Classify Φ into the danger ladder.
pub fn danger_level(phi: f64) -> DangerLevel {
    if phi >= gr::PHI_EXTREME {
        DangerLevel::Extreme
    } else if phi >= gr::PHI_STRONG {
        DangerLevel::Strong
    } else if phi >= gr::PHI_SUBTLE {
        DangerLevel::Subtle
    } else {
        DangerLevel::None
    }
}

/// Photon-sphere proximity: black holes only, 1.3·r_s ≤ r ≤ 2.0·r_s.
pub fn near_photon_sphere(kind: MassiveKind, r_s: f64, r: f64) -> bool {
    kind == MassiveKind::BlackHole
        && r >= gr::PHOTON_SPHERE_INNER * r_s
        && r <= gr::PHOTON_SPHERE_OUTER * r_s
}

/// Per-tick GR environment bound to the closest relevant massive object.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GrSnapshot {
    /// False when no massive object is close enough to matter.
    pub active: bool,
    /// Id of the bound object (undefined when inactive).
    pub object_id: u32,
    pub kind: MassiveKind,
    /// Distance to the object, light-years.
    pub distance: f64,
    pub phi: f64,
    /// dτ/dt from gravity alone.
    pub time_dilation: f64,
    pub redshift: f64,
    pub tidal: f64,
    pub danger: DangerLevel,
    pub photon_sphere: bool,
}

impl GrSnapshot {
    /// Snapshot for flat spacetime — no object in range.
    pub fn inactive() -> Self {
        Self {
            active: false,
            object_id: 0,
            kind: MassiveKind::BlackHole,
            distance: f64::INFINITY,
            phi: 0.0,
            time_dilation: 1.0,
            redshift: 1.0,
            tidal: 0.0,
            danger: DangerLevel::None,
            photon_sphere: false,
        }
    }

    /// Evaluate the field of one object at distance `r`.
    pub fn evaluate(object_id: u32, kind: MassiveKind, r_s: f64, r: f64) -> Self {
        let phi = potential(r_s, r);
        if phi < gr::PHI_ACTIVE {
            return Self::inactive();
        }
        let dilation = time_dilation(r_s, r);
        Self {
            active: true,
            object_id,
            kind,
            distance: r,
            phi,
            time_dilation: dilation,
            redshift: 1.0 / dilation,
            tidal: tidal_severity(r_s, r),
            danger: danger_level(phi),
            photon_sphere: near_photon_sphere(kind, r_s, r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn potential_at_five_schwarzschild_radii() {
        // Φ = r_s / (2·5·r_s) = 0.1 exactly, regardless of mass.
        let r_s = 6.2e-12;
        assert!((potential(r_s, 5.0 * r_s) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn dilation_at_five_schwarzschild_radii() {
        // √(1 − 1/5) = √0.8 ≈ 0.8944
        let r_s = 1.0;
        let d = time_dilation(r_s, 5.0);
        assert!((d - 0.8_f64.sqrt()).abs() < 1e-12);
        assert!((redshift_factor(r_s, 5.0) - 1.0 / d).abs() < 1e-12);
    }

    #[test]
    fn dilation_floors_at_horizon() {
        let r_s = 1.0;
        let at_horizon = time_dilation(r_s, 1.0);
        let inside = time_dilation(r_s, 0.5);
        assert!((at_horizon - 1e-3_f64.sqrt()).abs() < 1e-12);
        assert_eq!(inside, at_horizon);
        assert!(at_horizon > 0.0, "proper time always advances");
    }

    #[test]
    fn danger_ladder() {
        assert_eq!(danger_level(1e-5), DangerLevel::None);
        assert_eq!(danger_level(5e-4), DangerLevel::Subtle);
        assert_eq!(danger_level(5e-2), DangerLevel::Strong);
        assert_eq!(danger_level(0.1), DangerLevel::Extreme);
        assert_eq!(danger_level(0.5), DangerLevel::Extreme);
    }

    #[test]
    fn photon_sphere_band() {
        let r_s = 2.0;
        assert!(near_photon_sphere(MassiveKind::BlackHole, r_s, 3.0));
        assert!(!near_photon_sphere(MassiveKind::BlackHole, r_s, 2.0));
        assert!(!near_photon_sphere(MassiveKind::BlackHole, r_s, 4.5));
        // Only black holes have one.
        assert!(!near_photon_sphere(MassiveKind::NeutronStar, r_s, 3.0));
    }

    #[test]
    fn snapshot_far_away_is_inactive() {
        let snap = GrSnapshot::evaluate(7, MassiveKind::WhiteDwarf, 1e-12, 10.0);
        assert!(!snap.active);
        assert_eq!(snap.time_dilation, 1.0);
    }

    #[test]
    fn snapshot_extreme_at_close_range() {
        let r_s = 1e-11;
        let snap = GrSnapshot::evaluate(3, MassiveKind::BlackHole, r_s, 5.0 * r_s);
        assert!(snap.active);
        assert_eq!(snap.danger, DangerLevel::Extreme);
        assert!((snap.phi - 0.1).abs() < 1e-12);
        assert!((snap.time_dilation - 0.8_f64.sqrt()).abs() < 1e-12);
        assert!(snap.tidal > 0.0);
    }
}
