//! Per-tick civilization evolution and belief maintenance.
//!
//! Every planet gets its own generator derived from (world seed, planet id,
//! tick), so evolution is independent of iteration order and of what any
//! other system consumed. Ground-truth transitions append to the planet's
//! history log; beliefs are rebuilt from that log whenever newer photons
//! reach the observer.

use std::collections::BTreeMap;

use farlight_logic::belief::{self, ArrivalReport, Belief};
use farlight_logic::civilization::{self, CivilizationState, EvolveModifiers, TransitionKind};
use farlight_logic::constants::rates;
use farlight_logic::vec3::Vec3;
use hecs::Entity;
use rand::Rng;

use crate::catalog::StarCatalog;
use crate::components::{BeliefState, Civilization, PlanetBody};
use crate::debug::DebugSink;
use crate::rng::sub_rng;
use crate::src_loc;
use crate::systems::{arrival_time, ContactEventKind, ContactNetwork};

/// Beliefs are refreshed at least this often even without a state change,
/// keeping the projected distribution in step with arriving light.
const BELIEF_REFRESH_YEARS: f64 = 200.0;

/// Collapse-rate multiplier from a past uplift, decaying linearly to 1.
pub fn uplift_multiplier(uplift_year: Option<f64>, now_years: f64) -> f64 {
    match uplift_year {
        Some(year) => {
            let age = now_years - year;
            if (0.0..rates::UPLIFT_DECAY_YEARS).contains(&age) {
                let remaining = 1.0 - age / rates::UPLIFT_DECAY_YEARS;
                1.0 + (rates::UPLIFT_MULT - 1.0) * remaining
            } else {
                1.0
            }
        }
        None => 1.0,
    }
}

/// Advance ground truth for every civilization by `delta_years`.
///
/// At most one transition per planet per tick, checked in catastrophe →
/// collapse/transcendence → advancement order (inside `civilization::step`).
/// Interstellar civilizations may also schedule probe launches.
pub fn advance_civilizations(
    ecs: &mut hecs::World,
    planet_index: &BTreeMap<u32, Entity>,
    catalog: &StarCatalog,
    contact: &mut ContactNetwork,
    seed: u64,
    tick: u64,
    now_years: f64,
    delta_years: f64,
    sink: &mut DebugSink,
) {
    if delta_years <= 0.0 {
        return;
    }

    for (&planet_id, &entity) in planet_index {
        let Ok(mut query) = ecs.query_one::<(&PlanetBody, &mut Civilization)>(entity) else {
            continue;
        };
        let Some((body, civ)) = query.get() else {
            continue;
        };

        let mut rng = sub_rng(seed, u64::from(planet_id), tick);
        let mods = EvolveModifiers {
            collapse_mult: uplift_multiplier(civ.uplift_year, now_years),
            stability_bias: 0.0,
        };

        if let CivilizationState::TechCiv(ref mut profile) = civ.state {
            civilization::drift_tech_profile(profile, delta_years, mods.stability_bias, &mut rng);
            if profile.clamp_in_place() {
                sink.failure(
                    src_loc!(),
                    format!("planet {} tech profile left its bounds", planet_id),
                );
            }
        }

        if let Some(outcome) = civilization::step(&civ.state, delta_years, &mods, &mut rng) {
            civ.state = outcome.state;
            civ.record_transition(now_years, outcome.state.tag());
            let verb = match outcome.kind {
                TransitionKind::Catastrophe => "suffered ecocide",
                TransitionKind::Collapse => "collapsed",
                TransitionKind::Transcendence => "transcended",
                TransitionKind::Advancement => "advanced",
                TransitionKind::Recovery => "recovered",
            };
            sink.log(
                src_loc!(),
                format!(
                    "planet {} {} to {}",
                    planet_id,
                    verb,
                    outcome.state.tag().label()
                ),
            );
        }

        // Interstellar civilizations send probes of their own; outgoing
        // philosophies reach out more often.
        if let CivilizationState::TechCiv(profile) = &civ.state {
            if profile.interstellar {
                let (_, _, contact_bias) = profile.philosophy.biases();
                let rate =
                    rates::PROBE_LAUNCH * profile.expansion_drive * (1.0 + contact_bias).max(0.1);
                let p = 1.0 - (-rate * delta_years).exp();
                if rng.gen::<f64>() < p {
                    if let Some((target, beta)) =
                        pick_probe_target(catalog, body.star_id, &mut rng)
                    {
                        contact.schedule(
                            now_years,
                            ContactEventKind::ProbeLaunch {
                                from_planet: planet_id,
                                to_star: target,
                                beta,
                            },
                        );
                    }
                }
            }
        }
    }
}

/// Nearest habitable system other than the civ's own, plus a cruise β.
fn pick_probe_target<R: Rng>(
    catalog: &StarCatalog,
    from_star: u32,
    rng: &mut R,
) -> Option<(u32, f64)> {
    let origin = catalog.get(from_star)?.position;
    let candidates = catalog.nearest_n(&origin, 12);
    let target = candidates
        .into_iter()
        .find(|s| s.id != from_star && s.has_habitable_planet)?;
    Some((target.id, rng.gen_range(0.3..0.9)))
}

/// Process every contact event due by `now`.
pub fn process_contact_events(
    contact: &mut ContactNetwork,
    catalog: &StarCatalog,
    planet_index: &BTreeMap<u32, Entity>,
    ecs: &hecs::World,
    now_years: f64,
    sink: &mut DebugSink,
) {
    for event in contact.pop_due(now_years) {
        match event.kind {
            ContactEventKind::ProbeLaunch {
                from_planet,
                to_star,
                beta,
            } => {
                let Some(&entity) = planet_index.get(&from_planet) else {
                    continue;
                };
                let Ok(body) = ecs.get::<&PlanetBody>(entity) else {
                    continue;
                };
                let (Some(origin), Some(target)) =
                    (catalog.get(body.star_id), catalog.get(to_star))
                else {
                    continue;
                };
                let distance = origin.position.distance(&target.position);
                let arrives = arrival_time(event.time_years, distance, beta);
                contact.schedule(
                    arrives,
                    ContactEventKind::ProbeArrival {
                        from_planet,
                        at_star: to_star,
                        launch_year: event.time_years,
                    },
                );
                sink.log(
                    src_loc!(),
                    format!(
                        "planet {} launched a probe toward star {} (ETA year {:.1})",
                        from_planet, to_star, arrives
                    ),
                );
            }
            ContactEventKind::ProbeArrival {
                from_planet,
                at_star,
                launch_year,
            } => {
                contact.record_edge(from_planet, at_star, event.time_years);
                sink.log(
                    src_loc!(),
                    format!(
                        "probe from planet {} reached star {} ({:.1} years in flight)",
                        from_planet,
                        at_star,
                        event.time_years - launch_year
                    ),
                );
            }
        }
    }
}

/// Rebuild beliefs from newly arrived light.
///
/// The observed state at time T is the ground truth at T − d, read from the
/// planet's transition history. Weight closure is asserted every refresh.
pub fn refresh_beliefs(
    ecs: &mut hecs::World,
    planet_index: &BTreeMap<u32, Entity>,
    catalog: &StarCatalog,
    observer: &Vec3,
    now_years: f64,
    sink: &mut DebugSink,
) {
    for (&planet_id, &entity) in planet_index {
        let Ok(mut query) =
            ecs.query_one::<(&PlanetBody, &Civilization, &mut BeliefState)>(entity)
        else {
            continue;
        };
        let Some((body, civ, belief_state)) = query.get() else {
            continue;
        };
        let Some(star) = catalog.get(body.star_id) else {
            continue;
        };

        let distance = observer.distance(&star.position);
        let observed = civ.tag_at(now_years - distance);
        let stale = now_years - belief_state.belief.observation_year >= BELIEF_REFRESH_YEARS;
        if observed != belief_state.observed || stale {
            belief_state.belief = Belief::from_observation(observed, distance, now_years);
            belief_state.observed = observed;
            belief_state.observation_distance_ly = distance;
        }

        let total = belief_state.belief.total_weight();
        if !sink.check(
            src_loc!(),
            (total - 1.0).abs() < farlight_logic::constants::belief::WEIGHT_TOLERANCE,
            format!("planet {} belief weights sum to {:.9}", planet_id, total),
        ) {
            belief_state.belief.renormalize();
        }
    }
}

/// Resolve the epistemic gap for a planet the ship has just reached:
/// belief meets ground truth.
pub fn resolve_arrival(
    ecs: &mut hecs::World,
    planet_index: &BTreeMap<u32, Entity>,
    planet_id: u32,
    now_years: f64,
    sink: &mut DebugSink,
) -> Option<ArrivalReport> {
    let &entity = planet_index.get(&planet_id)?;
    let mut query = ecs
        .query_one::<(&Civilization, &mut BeliefState)>(entity)
        .ok()?;
    let (civ, belief_state) = query.get()?;

    let actual = civ.state.tag();
    let report = belief::resolve_arrival(&belief_state.belief, actual);

    // Standing at the planet, the player now knows the truth outright.
    belief_state.belief = Belief::certain(actual, now_years, now_years);
    belief_state.observed = actual;
    belief_state.observation_distance_ly = 0.0;

    sink.log(
        src_loc!(),
        format!(
            "arrival at planet {}: expected {} (p={:.2}), found {} (surprise {:.2})",
            planet_id,
            report.expected.label(),
            report.expected_weight,
            report.actual.label(),
            report.surprise
        ),
    );
    Some(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uplift_decays_linearly() {
        assert_eq!(uplift_multiplier(None, 50.0), 1.0);
        assert!((uplift_multiplier(Some(0.0), 0.0) - 2.0).abs() < 1e-12);
        assert!((uplift_multiplier(Some(0.0), 50.0) - 1.5).abs() < 1e-12);
        assert_eq!(uplift_multiplier(Some(0.0), 100.0), 1.0);
        assert_eq!(uplift_multiplier(Some(0.0), 1000.0), 1.0);
        // An uplift "from the future" (clock skew) is ignored.
        assert_eq!(uplift_multiplier(Some(10.0), 5.0), 1.0);
    }
}
