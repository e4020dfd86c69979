//! Ship kinematics and relativistic time integration.
//!
//! Per tick: clamp the velocity, advance the position by β·c·Δt, advance
//! external time by Δt, and advance proper time by the composed SR·GR
//! factor — 1/γ from velocity, √(1 − r_s/r) from the strongest nearby
//! gravitational field. Both apply when both are active.

use farlight_logic::constants::ship as cfg;
use farlight_logic::gravity::{DangerLevel, GrSnapshot};
use farlight_logic::relativity;

use crate::components::{MassiveObject, ShipMode, ShipState};
use crate::debug::DebugSink;
use crate::src_loc;

/// Evaluate the GR environment: the field of whichever object binds the
/// ship most strongly (largest Φ), or an inactive snapshot in flat space.
pub fn gr_environment(position: &farlight_logic::vec3::Vec3, objects: &[MassiveObject]) -> GrSnapshot {
    let mut best = GrSnapshot::inactive();
    for object in objects {
        let r = position.distance(&object.position);
        let snap = GrSnapshot::evaluate(object.id, object.kind, object.schwarzschild_radius_ly, r);
        if snap.active && snap.phi > best.phi {
            best = snap;
        }
    }
    best
}

/// Advance the ship by `delta_years` of external time.
///
/// `near_star` is whether the ship is within orbit range of some star;
/// it feeds the operating-mode derivation. Returns the GR snapshot used
/// for this tick's integration.
pub fn advance_ship(
    ship: &mut ShipState,
    objects: &[MassiveObject],
    near_star: bool,
    delta_years: f64,
    sink: &mut DebugSink,
) -> GrSnapshot {
    // Velocity sanity: non-finite components reset, superluminal clamps.
    let speed = ship.beta.length();
    if !speed.is_finite() {
        sink.failure(src_loc!(), "ship velocity was non-finite; reset to rest");
        ship.beta = farlight_logic::vec3::Vec3::ZERO;
    } else if speed > cfg::BETA_MAX {
        ship.beta = ship.beta * (cfg::BETA_MAX / speed);
        sink.failure(
            src_loc!(),
            format!("ship velocity clamped from |β|={:.6}", speed),
        );
    }

    ship.position = ship.position + ship.beta * delta_years;
    ship.external_time_years += delta_years;

    let gr = gr_environment(&ship.position, objects);
    let sr_factor = relativity::sr_time_factor(&ship.beta);
    ship.proper_time_years += sr_factor * gr.time_dilation * delta_years;

    ship.mode = derive_mode(ship, &gr, near_star);
    gr
}

/// Operating mode from velocity and environment. NearMassive wins whenever
/// a field is strong enough to notice.
fn derive_mode(ship: &ShipState, gr: &GrSnapshot, near_star: bool) -> ShipMode {
    if gr.active && gr.danger >= DangerLevel::Subtle {
        return ShipMode::NearMassive;
    }
    let speed = ship.beta.length();
    if near_star && speed < cfg::BETA_STATIONARY {
        return ShipMode::Docked;
    }
    if near_star && speed < 1e-3 {
        return ShipMode::Orbital;
    }
    ShipMode::Cruise
}

#[cfg(test)]
mod tests {
    use super::*;
    use farlight_logic::gravity::MassiveKind;
    use farlight_logic::vec3::Vec3;

    fn black_hole(mass_solar: f64, position: Vec3) -> MassiveObject {
        MassiveObject::new(0, MassiveKind::BlackHole, mass_solar, position)
    }

    #[test]
    fn docked_idle_tick_is_idempotent() {
        let mut ship = ShipState::default();
        let mut sink = DebugSink::new(0.0);
        advance_ship(&mut ship, &[], true, 1.0, &mut sink);
        assert_eq!(ship.position, Vec3::ZERO);
        assert_eq!(ship.mode, ShipMode::Docked);
        assert_eq!(ship.proper_time_years, 1.0); // γ=1 exactly at rest
        assert_eq!(ship.external_time_years, 1.0);
        assert_eq!(sink.failed_count(), 0);
    }

    #[test]
    fn cruise_dilates_proper_time() {
        let mut ship = ShipState {
            beta: Vec3::new(0.0, 0.0, 0.8),
            ..Default::default()
        };
        let mut sink = DebugSink::new(0.0);
        advance_ship(&mut ship, &[], false, 10.0, &mut sink);
        assert_eq!(ship.mode, ShipMode::Cruise);
        assert!((ship.position.z - 8.0).abs() < 1e-12);
        assert_eq!(ship.external_time_years, 10.0);
        // γ(0.8) = 5/3 → τ = 6 years
        assert!((ship.proper_time_years - 6.0).abs() < 1e-9);
    }

    #[test]
    fn superluminal_velocity_clamps_with_assertion() {
        let mut ship = ShipState {
            beta: Vec3::new(0.0, 0.0, 2.0),
            ..Default::default()
        };
        let mut sink = DebugSink::new(0.0);
        advance_ship(&mut ship, &[], false, 1.0, &mut sink);
        assert!(ship.beta.length() <= cfg::BETA_MAX + 1e-12);
        assert!(sink.failed_count() > 0);
        assert!(ship.proper_time_years.is_finite());
    }

    #[test]
    fn near_horizon_proper_time_still_advances() {
        let hole = black_hole(10.0, Vec3::ZERO);
        let r_s = hole.schwarzschild_radius_ly;
        let mut ship = ShipState {
            position: Vec3::new(r_s * 1.01, 0.0, 0.0),
            ..Default::default()
        };
        let mut sink = DebugSink::new(0.0);
        let gr = advance_ship(&mut ship, &[hole], false, 1.0, &mut sink);
        assert_eq!(ship.mode, ShipMode::NearMassive);
        assert_eq!(gr.danger, DangerLevel::Extreme);
        assert!(ship.proper_time_years > 0.0);
        assert!(ship.proper_time_years < 0.2);
    }

    #[test]
    fn strongest_field_wins() {
        let far = black_hole(1.0, Vec3::new(1.0, 0.0, 0.0));
        let mut near = black_hole(1.0, Vec3::new(1e-9, 0.0, 0.0));
        near.id = 7;
        let gr = gr_environment(&Vec3::ZERO, &[far, near]);
        assert!(gr.active);
        assert_eq!(gr.object_id, 7);
    }

    #[test]
    fn composed_dilation_multiplies() {
        // β=0.8 (γ=5/3) at r=5·r_s (GR factor √0.8): both apply. The tick
        // is kept tiny so the ship does not leave the field mid-check.
        let hole = black_hole(10.0, Vec3::ZERO);
        let r_s = hole.schwarzschild_radius_ly;
        let mut ship = ShipState {
            position: Vec3::new(5.0 * r_s, 0.0, 0.0),
            beta: Vec3::new(0.0, 0.0, 0.8),
            ..Default::default()
        };
        let mut sink = DebugSink::new(0.0);
        let dt = 1e-15;
        advance_ship(&mut ship, &[hole], false, dt, &mut sink);
        let expected = 0.6 * 0.8_f64.sqrt() * dt;
        assert!(
            (ship.proper_time_years - expected).abs() < expected * 1e-6,
            "τ = {}, expected {}",
            ship.proper_time_years,
            expected
        );
    }
}
