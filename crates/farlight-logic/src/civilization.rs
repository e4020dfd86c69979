//! Civilization state machine: the probabilistic deep-time model that
//! drives every inhabited planet.
//!
//! States form a ladder from `Sterile` to `TechCiv`, with absorbing or
//! recoverable exits (`Ecocide`, `PostCollapse`, `Transcended`). Transitions
//! are sampled per-step from per-year rates; a single step applies at most
//! one transition, evaluated in a fixed order: catastrophe first, then
//! collapse/transcendence, then advancement. Long spans are evolved in
//! chunks so multi-hop histories stay possible.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::constants::{philosophy, rates};

/// Guiding philosophy of a technological civilization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Philosophy {
    Expansionist,
    Harmonist,
    Ascetic,
    Militant,
    Custodian,
    Mercantile,
}

impl Philosophy {
    pub const ALL: [Philosophy; 6] = [
        Philosophy::Expansionist,
        Philosophy::Harmonist,
        Philosophy::Ascetic,
        Philosophy::Militant,
        Philosophy::Custodian,
        Philosophy::Mercantile,
    ];

    /// Additive biases: (stability, expansion drive, contact affinity).
    pub fn biases(&self) -> (f64, f64, f64) {
        match self {
            Philosophy::Expansionist => philosophy::EXPANSIONIST,
            Philosophy::Harmonist => philosophy::HARMONIST,
            Philosophy::Ascetic => philosophy::ASCETIC,
            Philosophy::Militant => philosophy::MILITANT,
            Philosophy::Custodian => philosophy::CUSTODIAN,
            Philosophy::Mercantile => philosophy::MERCANTILE,
        }
    }
}

/// How a technological civilization ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CollapseKind {
    War,
    Climate,
    Pandemic,
    AiMisalignment,
    ResourceDepletion,
    Unknown,
}

/// Mutable profile of a technological civilization.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TechProfile {
    /// Technology level in [0, 10].
    pub tech_level: f64,
    pub philosophy: Philosophy,
    /// All three in [0, 1].
    pub stability: f64,
    pub expansion_drive: f64,
    pub sustainability: f64,
    /// Set once the civilization can launch interstellar probes.
    pub interstellar: bool,
}

impl TechProfile {
    /// Roll a fresh profile for a civilization that just industrialized.
    pub fn generate<R: Rng>(rng: &mut R) -> Self {
        let philosophy = Philosophy::ALL[rng.gen_range(0..Philosophy::ALL.len())];
        Self {
            tech_level: rng.gen_range(1.0..3.0),
            philosophy,
            stability: rng.gen_range(0.3..0.9),
            expansion_drive: rng.gen_range(0.1..0.9),
            sustainability: rng.gen_range(0.2..0.9),
            interstellar: false,
        }
    }

    /// Clamp every bounded field into its legal range. Returns true when a
    /// correction was actually needed.
    pub fn clamp_in_place(&mut self) -> bool {
        let before = *self;
        self.tech_level = self.tech_level.clamp(0.0, 10.0);
        self.stability = self.stability.clamp(0.0, 1.0);
        self.expansion_drive = self.expansion_drive.clamp(0.0, 1.0);
        self.sustainability = self.sustainability.clamp(0.0, 1.0);
        before != *self
    }
}

/// Ground-truth civilization state of one planet.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum CivilizationState {
    Sterile,
    Prebiotic,
    Microbial,
    Complex,
    PreTech,
    TechCiv(TechProfile),
    PostCollapse(CollapseKind),
    Ecocide,
    Transcended,
}

/// Payload-free discriminant of [`CivilizationState`], used by belief
/// distributions and transition bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CivTag {
    Sterile,
    Prebiotic,
    Microbial,
    Complex,
    PreTech,
    TechCiv,
    PostCollapse,
    Ecocide,
    Transcended,
}

impl CivTag {
    pub const ALL: [CivTag; 9] = [
        CivTag::Sterile,
        CivTag::Prebiotic,
        CivTag::Microbial,
        CivTag::Complex,
        CivTag::PreTech,
        CivTag::TechCiv,
        CivTag::PostCollapse,
        CivTag::Ecocide,
        CivTag::Transcended,
    ];

    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    pub fn label(&self) -> &'static str {
        match self {
            CivTag::Sterile => "sterile",
            CivTag::Prebiotic => "prebiotic",
            CivTag::Microbial => "microbial",
            CivTag::Complex => "complex life",
            CivTag::PreTech => "pre-technological",
            CivTag::TechCiv => "technological",
            CivTag::PostCollapse => "post-collapse",
            CivTag::Ecocide => "ecocide",
            CivTag::Transcended => "transcended",
        }
    }
}

impl CivilizationState {
    pub fn tag(&self) -> CivTag {
        match self {
            CivilizationState::Sterile => CivTag::Sterile,
            CivilizationState::Prebiotic => CivTag::Prebiotic,
            CivilizationState::Microbial => CivTag::Microbial,
            CivilizationState::Complex => CivTag::Complex,
            CivilizationState::PreTech => CivTag::PreTech,
            CivilizationState::TechCiv(_) => CivTag::TechCiv,
            CivilizationState::PostCollapse(_) => CivTag::PostCollapse,
            CivilizationState::Ecocide => CivTag::Ecocide,
            CivilizationState::Transcended => CivTag::Transcended,
        }
    }

    /// A biosphere exists that a catastrophe could still destroy.
    pub fn has_biosphere(&self) -> bool {
        !matches!(
            self,
            CivilizationState::Sterile | CivilizationState::Ecocide | CivilizationState::Transcended
        )
    }

    pub fn tech_profile(&self) -> Option<&TechProfile> {
        match self {
            CivilizationState::TechCiv(p) => Some(p),
            _ => None,
        }
    }
}

/// External influences on a single evolution step.
#[derive(Debug, Clone, Copy)]
pub struct EvolveModifiers {
    /// Multiplier on the collapse rate (uplift destabilization, contact).
    pub collapse_mult: f64,
    /// Additive stability drift from outside influence.
    pub stability_bias: f64,
}

impl Default for EvolveModifiers {
    fn default() -> Self {
        Self {
            collapse_mult: 1.0,
            stability_bias: 0.0,
        }
    }
}

/// Why a transition fired, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransitionKind {
    Catastrophe,
    Collapse,
    Transcendence,
    Advancement,
    Recovery,
}

/// Result of one evolution step that changed state.
#[derive(Debug, Clone, Copy)]
pub struct StepOutcome {
    pub state: CivilizationState,
    pub kind: TransitionKind,
}

/// Probability that a Poisson process with `rate` per year fires at least
/// once in `years`.
fn fires<R: Rng>(rng: &mut R, rate: f64, years: f64) -> bool {
    if rate <= 0.0 || years <= 0.0 {
        return false;
    }
    let p = 1.0 - (-rate * years).exp();
    rng.gen::<f64>() < p
}

fn weighted_index<R: Rng>(rng: &mut R, weights: &[f64]) -> usize {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0;
    }
    let mut roll = rng.gen::<f64>() * total;
    for (i, w) in weights.iter().enumerate() {
        roll -= w;
        if roll < 0.0 {
            return i;
        }
    }
    weights.len() - 1
}

/// Draw a collapse kind weighted by the civilization's profile: fragile
/// sustainability favors Climate/ResourceDepletion, militancy favors War,
/// high tech favors AI misalignment.
fn draw_collapse_kind<R: Rng>(rng: &mut R, profile: &TechProfile) -> CollapseKind {
    let frail = 1.0 - profile.sustainability;
    let militant = matches!(profile.philosophy, Philosophy::Militant) as u8 as f64;
    let weights = [
        0.20 + 0.25 * militant,              // War
        0.10 + 0.30 * frail,                 // Climate
        0.15,                                // Pandemic
        0.05 + 0.03 * profile.tech_level,    // AiMisalignment
        0.10 + 0.30 * frail,                 // ResourceDepletion
        0.05,                                // Unknown
    ];
    match weighted_index(rng, &weights) {
        0 => CollapseKind::War,
        1 => CollapseKind::Climate,
        2 => CollapseKind::Pandemic,
        3 => CollapseKind::AiMisalignment,
        4 => CollapseKind::ResourceDepletion,
        _ => CollapseKind::Unknown,
    }
}

/// Advance one civilization by `years`, applying at most one transition.
///
/// Evaluation order: catastrophe (ecocide), then collapse/transcendence,
/// then advancement/recovery. Returns `None` when the state is unchanged.
pub fn step<R: Rng>(
    state: &CivilizationState,
    years: f64,
    mods: &EvolveModifiers,
    rng: &mut R,
) -> Option<StepOutcome> {
    // (a) Catastrophe check: a biosphere can always die.
    if state.has_biosphere() && fires(rng, rates::ECOCIDE, years) {
        return Some(StepOutcome {
            state: CivilizationState::Ecocide,
            kind: TransitionKind::Catastrophe,
        });
    }

    // (b) Collapse / transcendence.
    if let CivilizationState::TechCiv(profile) = state {
        let mut collapse_rate = rates::TECHCIV_COLLAPSE * mods.collapse_mult;
        if profile.stability < rates::LOW_STABILITY {
            collapse_rate *= rates::LOW_STABILITY_COLLAPSE_MULT;
        }
        if fires(rng, collapse_rate, years) {
            let kind = draw_collapse_kind(rng, profile);
            return Some(StepOutcome {
                state: CivilizationState::PostCollapse(kind),
                kind: TransitionKind::Collapse,
            });
        }
        if fires(rng, rates::TECHCIV_TRANSCEND, years) {
            return Some(StepOutcome {
                state: CivilizationState::Transcended,
                kind: TransitionKind::Transcendence,
            });
        }
    }

    // (c) Advancement / recovery.
    let advanced = match state {
        CivilizationState::Sterile if fires(rng, rates::STERILE_TO_PREBIOTIC, years) => {
            Some((CivilizationState::Prebiotic, TransitionKind::Advancement))
        }
        CivilizationState::Prebiotic if fires(rng, rates::PREBIOTIC_TO_MICROBIAL, years) => {
            Some((CivilizationState::Microbial, TransitionKind::Advancement))
        }
        CivilizationState::Microbial if fires(rng, rates::MICROBIAL_TO_COMPLEX, years) => {
            Some((CivilizationState::Complex, TransitionKind::Advancement))
        }
        CivilizationState::Complex if fires(rng, rates::COMPLEX_TO_PRETECH, years) => {
            Some((CivilizationState::PreTech, TransitionKind::Advancement))
        }
        CivilizationState::PreTech if fires(rng, rates::PRETECH_TO_TECHCIV, years) => {
            Some((
                CivilizationState::TechCiv(TechProfile::generate(rng)),
                TransitionKind::Advancement,
            ))
        }
        CivilizationState::PostCollapse(_) if fires(rng, rates::POSTCOLLAPSE_RECOVERY, years) => {
            Some((CivilizationState::PreTech, TransitionKind::Recovery))
        }
        _ => None,
    };

    advanced.map(|(state, kind)| StepOutcome { state, kind })
}

/// Drift a technological profile in place over `years`: philosophy biases,
/// slow technological growth, the interstellar threshold roll, and clamps.
pub fn drift_tech_profile<R: Rng>(profile: &mut TechProfile, years: f64, bias: f64, rng: &mut R) {
    let (stab, expand, _contact) = profile.philosophy.biases();
    // Biases are expressed per millennium of drift.
    let t = years / 1000.0;
    profile.stability += (stab + bias) * t + rng.gen_range(-0.02..0.02) * t;
    profile.expansion_drive += expand * t + rng.gen_range(-0.02..0.02) * t;
    profile.sustainability += rng.gen_range(-0.03..0.03) * t;
    profile.tech_level += 0.1 * (years / 100.0);
    profile.clamp_in_place();

    if !profile.interstellar && profile.tech_level >= 7.0 {
        let rate = 1e-3 * profile.expansion_drive;
        if fires(rng, rate, years) {
            profile.interstellar = true;
        }
    }
}

/// Evolve a state over a long span in bounded chunks, at most one transition
/// per chunk. Returns the final state plus every transition as
/// (year offset from start, new tag).
pub fn evolve_over<R: Rng>(
    state: &CivilizationState,
    years: f64,
    chunk_years: f64,
    mods: &EvolveModifiers,
    rng: &mut R,
) -> (CivilizationState, Vec<(f64, CivTag)>) {
    let mut current = *state;
    let mut transitions = Vec::new();
    let mut elapsed = 0.0;
    let chunk = chunk_years.max(1e-6);

    while elapsed < years {
        let span = chunk.min(years - elapsed);
        if let CivilizationState::TechCiv(ref mut profile) = current {
            drift_tech_profile(profile, span, mods.stability_bias, rng);
        }
        if let Some(outcome) = step(&current, span, mods, rng) {
            current = outcome.state;
            transitions.push((elapsed + span, current.tag()));
        }
        elapsed += span;
    }

    (current, transitions)
}
