//! Simulation constants — physical units, relativity clamps, population
//! rates, catalog shape parameters.
//!
//! Everything here is a plain constant with no engine dependency. Both the
//! core engine and the native simtest use these. Values marked "tunable" are
//! model parameters, not physical facts.

/// Physical units and conversions. Natural units: c = 1 light-year per year.
pub mod physics {
    /// Speed of light in light-years per year.
    pub const C_LY_PER_YEAR: f64 = 1.0;

    /// Light-years per parsec.
    pub const LY_PER_PC: f64 = 3.26156;

    /// Schwarzschild radius of one solar mass, in light-years (2GM/c²).
    pub const SCHWARZSCHILD_RADIUS_SOLAR_LY: f64 = 3.1215e-13;

    /// Sol's distance from the galactic center, light-years.
    pub const SOL_GALACTOCENTRIC_LY: f64 = 26_700.0;
}

/// Special-relativity clamps and blending (tunable).
pub mod sr {
    /// Upper clamp on the Lorentz factor.
    pub const GAMMA_MAX: f64 = 50.0;

    /// Below this squared speed the kernel treats the ship as at rest.
    pub const BETA_SQ_REST: f64 = 1e-24;

    /// Aberration denominators are kept at least this far from zero.
    pub const DENOM_EPSILON: f64 = 1e-9;

    /// Beaming intensity multiplier bounds.
    pub const BEAMING_MIN: f64 = 0.01;
    pub const BEAMING_MAX: f64 = 100.0;

    /// Effect ramp: no visible correction below this γ...
    pub const RAMP_GAMMA_START: f64 = 1.1;
    /// ...full correction at this γ.
    pub const RAMP_GAMMA_FULL: f64 = 5.0;

    /// Color shift strength k (tunable).
    pub const COLOR_SHIFT_STRENGTH: f64 = 0.6;
}

/// General-relativity thresholds (tunable except the photon sphere).
pub mod gr {
    /// Floor inside √(1 − r_s/r); keeps dτ/dt positive near the horizon.
    pub const DILATION_EPSILON: f64 = 1e-3;

    /// Dimensionless potential Φ below which an object is ignored entirely.
    pub const PHI_ACTIVE: f64 = 1e-6;

    /// Danger ladder over Φ = r_s/2r.
    pub const PHI_SUBTLE: f64 = 1e-4;
    pub const PHI_STRONG: f64 = 1e-3;
    pub const PHI_EXTREME: f64 = 0.1;

    /// Photon-sphere proximity band for black holes, in units of r_s.
    pub const PHOTON_SPHERE_INNER: f64 = 1.3;
    pub const PHOTON_SPHERE_OUTER: f64 = 2.0;

    /// Tidal severity reaches 1.0 at r_s/r² = this value (tunable).
    pub const TIDAL_FULL_SCALE: f64 = 1e-5;
}

/// Per-year civilization transition rates (tunable model parameters).
pub mod rates {
    pub const STERILE_TO_PREBIOTIC: f64 = 1e-9;
    pub const PREBIOTIC_TO_MICROBIAL: f64 = 1e-8;
    pub const MICROBIAL_TO_COMPLEX: f64 = 1e-9;
    pub const COMPLEX_TO_PRETECH: f64 = 1e-8;
    pub const PRETECH_TO_TECHCIV: f64 = 1e-5;
    pub const TECHCIV_COLLAPSE: f64 = 1e-4;
    pub const TECHCIV_TRANSCEND: f64 = 1e-5;
    pub const POSTCOLLAPSE_RECOVERY: f64 = 1e-8;
    pub const ECOCIDE: f64 = 1e-7;

    /// Collapse rate multiplier when stability < `LOW_STABILITY`.
    pub const LOW_STABILITY: f64 = 0.3;
    pub const LOW_STABILITY_COLLAPSE_MULT: f64 = 2.0;

    /// Uplift destabilization: initial multiplier, decaying linearly to 1
    /// over `UPLIFT_DECAY_YEARS`.
    pub const UPLIFT_MULT: f64 = 2.0;
    pub const UPLIFT_DECAY_YEARS: f64 = 100.0;

    /// Probe launches per year for an interstellar civilization, scaled by
    /// its expansion drive.
    pub const PROBE_LAUNCH: f64 = 1e-3;
}

/// Philosophy biases, additive per evolution step (tunable).
///
/// Columns: (stability, expansion drive, contact affinity).
pub mod philosophy {
    pub const EXPANSIONIST: (f64, f64, f64) = (-0.02, 0.15, 0.05);
    pub const HARMONIST: (f64, f64, f64) = (0.10, -0.05, 0.02);
    pub const ASCETIC: (f64, f64, f64) = (0.05, -0.10, -0.05);
    pub const MILITANT: (f64, f64, f64) = (-0.10, 0.15, -0.02);
    pub const CUSTODIAN: (f64, f64, f64) = (0.08, -0.02, 0.00);
    pub const MERCANTILE: (f64, f64, f64) = (0.00, 0.05, 0.10);
}

/// Belief-model parameters (tunable).
pub mod belief {
    /// Belief weights must sum to 1 within this tolerance.
    pub const WEIGHT_TOLERANCE: f64 = 1e-6;

    /// Confidence decays as exp(−light_years / this scale).
    pub const CONFIDENCE_SCALE_YEARS: f64 = 10_000.0;

    /// Forward projection advances in chunks of at most this many years.
    pub const MAX_PROJECTION_STEP_YEARS: f64 = 25.0;
}

/// Star catalog shape parameters (tunable).
pub mod catalog {
    /// Radial scale height of the stellar disk, light-years.
    pub const DISK_SCALE_RADIAL_LY: f64 = 10_000.0;
    /// Vertical scale height of the stellar disk, light-years.
    pub const DISK_SCALE_VERTICAL_LY: f64 = 1_000.0;

    /// Stellar density in the solar neighborhood, stars per cubic light-year.
    pub const LOCAL_DENSITY: f64 = 0.004;

    /// Real stars dominate inside this radius...
    pub const BLEND_INNER_LY: f64 = 80.0;
    /// ...procedural stars beyond this one; linear crossfade between.
    pub const BLEND_OUTER_LY: f64 = 120.0;

    /// Empirical main-sequence spectral distribution, O..M order.
    pub const SPECTRAL_WEIGHTS: [f64; 7] = [3e-7, 0.0013, 0.006, 0.03, 0.075, 0.12, 0.76];
}

/// Ship and camera limits.
pub mod ship {
    /// Hard cap on |β| for the camera and ship.
    pub const BETA_MAX: f64 = 0.9999;

    /// Below this |β| the ship counts as stationary for mode derivation.
    pub const BETA_STATIONARY: f64 = 1e-6;

    /// Within this distance of a star the ship can dock or orbit (ly).
    pub const ORBIT_RANGE_LY: f64 = 0.05;

    /// Arrival triggers belief resolution inside this range (ly).
    pub const ARRIVAL_RANGE_LY: f64 = 0.1;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spectral_weights_sum_to_one() {
        let sum: f64 = catalog::SPECTRAL_WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 0.01, "weights sum to {}", sum);
    }

    #[test]
    fn danger_ladder_is_ordered() {
        assert!(gr::PHI_SUBTLE < gr::PHI_STRONG);
        assert!(gr::PHI_STRONG < gr::PHI_EXTREME);
    }
}
