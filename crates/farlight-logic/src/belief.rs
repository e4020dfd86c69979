//! Belief distributions over remote civilization states.
//!
//! What the player knows about a planet is carried by photons, so it is
//! always out of date by the light travel time. A belief starts as
//! certainty about the observed state at photon emission and is forward-
//! projected through the tag-level transition model for however long the
//! light has been in flight, yielding a probability distribution over the
//! planet's state *now*. Arrival resolves the distribution against ground
//! truth.

use serde::{Deserialize, Serialize};

use crate::civilization::CivTag;
use crate::constants::{belief as cfg, rates};

/// Tag-level transition rates per year: (from, to, rate).
///
/// TechCiv collapse uses the base rate; the believer cannot see stability
/// or uplift from light-years away.
const RATE_TABLE: [(CivTag, CivTag, f64); 8] = [
    (CivTag::Sterile, CivTag::Prebiotic, rates::STERILE_TO_PREBIOTIC),
    (CivTag::Prebiotic, CivTag::Microbial, rates::PREBIOTIC_TO_MICROBIAL),
    (CivTag::Microbial, CivTag::Complex, rates::MICROBIAL_TO_COMPLEX),
    (CivTag::Complex, CivTag::PreTech, rates::COMPLEX_TO_PRETECH),
    (CivTag::PreTech, CivTag::TechCiv, rates::PRETECH_TO_TECHCIV),
    (CivTag::TechCiv, CivTag::PostCollapse, rates::TECHCIV_COLLAPSE),
    (CivTag::TechCiv, CivTag::Transcended, rates::TECHCIV_TRANSCEND),
    (CivTag::PostCollapse, CivTag::PreTech, rates::POSTCOLLAPSE_RECOVERY),
];

/// Probability-weighted distribution over a remote planet's state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Belief {
    /// Weights indexed by [`CivTag::index`]; sum to 1 within 1e-6.
    pub weights: [f64; 9],
    /// Observer confidence in [0, 1]; decays with light travel time.
    pub confidence: f64,
    /// External year the observed photons left the planet.
    pub photon_emission_year: f64,
    /// External year the observation was made.
    pub observation_year: f64,
    /// External year the ship would arrive if it departed now.
    pub predicted_arrival_year: f64,
}

impl Belief {
    /// Certainty about a single state.
    pub fn certain(tag: CivTag, emission_year: f64, observation_year: f64) -> Self {
        let mut weights = [0.0; 9];
        weights[tag.index()] = 1.0;
        Self {
            weights,
            confidence: 1.0,
            photon_emission_year: emission_year,
            observation_year,
            predicted_arrival_year: observation_year,
        }
    }

    /// Build a belief from an observation: certainty at photon emission,
    /// projected forward over the light flight time.
    pub fn from_observation(observed: CivTag, light_years: f64, observation_year: f64) -> Self {
        let mut belief = Self::certain(observed, observation_year - light_years, observation_year);
        belief.project(light_years);
        belief.confidence = (-light_years / cfg::CONFIDENCE_SCALE_YEARS).exp();
        belief
    }

    pub fn weight(&self, tag: CivTag) -> f64 {
        self.weights[tag.index()]
    }

    /// Most probable state and its weight.
    pub fn dominant(&self) -> (CivTag, f64) {
        let mut best = CivTag::Sterile;
        let mut best_w = -1.0;
        for tag in CivTag::ALL {
            let w = self.weight(tag);
            if w > best_w {
                best = tag;
                best_w = w;
            }
        }
        (best, best_w)
    }

    /// Forward-project the distribution through the transition model.
    ///
    /// Explicit Euler over the master equation in steps of at most
    /// `MAX_PROJECTION_STEP_YEARS`; the largest total outflow rate is
    /// ~1e-4/year, so the step is comfortably stable.
    pub fn project(&mut self, years: f64) {
        if years <= 0.0 {
            return;
        }
        let mut remaining = years;
        while remaining > 0.0 {
            let dt = remaining.min(cfg::MAX_PROJECTION_STEP_YEARS);
            let mut delta = [0.0; 9];
            for &(from, to, rate) in &RATE_TABLE {
                let flow = self.weights[from.index()] * rate * dt;
                delta[from.index()] -= flow;
                delta[to.index()] += flow;
            }
            // Every living tag leaks toward Ecocide.
            for tag in CivTag::ALL {
                let alive = !matches!(
                    tag,
                    CivTag::Sterile | CivTag::Ecocide | CivTag::Transcended
                );
                if alive {
                    let flow = self.weights[tag.index()] * rates::ECOCIDE * dt;
                    delta[tag.index()] -= flow;
                    delta[CivTag::Ecocide.index()] += flow;
                }
            }
            for (w, d) in self.weights.iter_mut().zip(delta.iter()) {
                *w = (*w + d).max(0.0);
            }
            remaining -= dt;
        }
        self.renormalize();
    }

    /// Total weight, 1.0 in a healthy belief.
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }

    /// Force the weights back onto the simplex. Returns true when the sum
    /// was outside tolerance before correction (an invariant violation the
    /// caller should report).
    pub fn renormalize(&mut self) -> bool {
        let total = self.total_weight();
        let violated = (total - 1.0).abs() >= cfg::WEIGHT_TOLERANCE;
        if total > 0.0 {
            for w in self.weights.iter_mut() {
                *w /= total;
            }
        } else {
            self.weights = [0.0; 9];
            self.weights[CivTag::Sterile.index()] = 1.0;
        }
        violated
    }
}

/// What the player expected versus what was actually there.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ArrivalReport {
    pub expected: CivTag,
    pub expected_weight: f64,
    pub actual: CivTag,
    /// 1 − believed weight of the actual state: 0 = fully anticipated.
    pub surprise: f64,
}

/// Resolve a belief against ground truth at arrival.
pub fn resolve_arrival(belief: &Belief, actual: CivTag) -> ArrivalReport {
    let (expected, expected_weight) = belief.dominant();
    ArrivalReport {
        expected,
        expected_weight,
        actual,
        surprise: (1.0 - belief.weight(actual)).clamp(0.0, 1.0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn certain_belief_is_normalized() {
        let b = Belief::certain(CivTag::Microbial, -2000.0, 0.0);
        assert!((b.total_weight() - 1.0).abs() < 1e-12);
        assert_eq!(b.dominant().0, CivTag::Microbial);
        assert_eq!(b.weight(CivTag::Microbial), 1.0);
    }

    #[test]
    fn projection_conserves_weight() {
        let mut b = Belief::certain(CivTag::PreTech, 0.0, 0.0);
        b.project(10_000.0);
        assert!((b.total_weight() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn projection_spreads_mass_forward() {
        let mut b = Belief::certain(CivTag::PreTech, 0.0, 0.0);
        // Expected PreTech→TechCiv waiting time is 1e5 years.
        b.project(200_000.0);
        assert!(b.weight(CivTag::PreTech) < 0.5);
        assert!(b.weight(CivTag::TechCiv) > 0.0);
        assert!(b.weight(CivTag::PostCollapse) > 0.0);
        // Nothing flows backward.
        assert_eq!(b.weight(CivTag::Sterile), 0.0);
    }

    #[test]
    fn microbial_observation_across_2000_ly() {
        let b = Belief::from_observation(CivTag::Microbial, 2000.0, 0.0);
        // Microbial leaves at ~1e-7/year; over 2000 years essentially all
        // the mass stays put.
        let (tag, w) = b.dominant();
        assert_eq!(tag, CivTag::Microbial);
        assert!(w > 0.99);
        assert!(b.confidence > 0.8, "confidence {}", b.confidence);
        assert_eq!(b.photon_emission_year, -2000.0);
    }

    #[test]
    fn zero_projection_is_identity() {
        let mut b = Belief::certain(CivTag::Complex, 0.0, 0.0);
        let before = b.clone();
        b.project(0.0);
        assert_eq!(b, before);
    }

    #[test]
    fn renormalize_reports_violation() {
        let mut b = Belief::certain(CivTag::Complex, 0.0, 0.0);
        b.weights[CivTag::Sterile.index()] = 0.5;
        assert!(b.renormalize());
        assert!((b.total_weight() - 1.0).abs() < 1e-12);
        // A healthy belief reports no violation.
        assert!(!b.renormalize());
    }

    #[test]
    fn arrival_surprise() {
        let mut b = Belief::certain(CivTag::TechCiv, 0.0, 0.0);
        b.project(20_000.0);
        let report = resolve_arrival(&b, CivTag::PostCollapse);
        assert_eq!(report.actual, CivTag::PostCollapse);
        assert!(report.surprise < 1.0);
        // Resolving against the dominant state is the least surprising.
        let expected = resolve_arrival(&b, report.expected);
        assert!(expected.surprise <= report.surprise);
    }

    #[test]
    fn confidence_decays_with_distance() {
        let near = Belief::from_observation(CivTag::Complex, 10.0, 0.0);
        let far = Belief::from_observation(CivTag::Complex, 5000.0, 0.0);
        assert!(near.confidence > far.confidence);
        assert!(far.confidence > 0.0);
    }
}
