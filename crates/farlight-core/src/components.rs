//! Component data for world entities.
//!
//! Planets and their civilizations are hecs entities; everything references
//! them by stable u32 id, never by `Entity` handle, so identities survive
//! save/load. Components are pure data — behavior lives in the systems.

use farlight_logic::belief::Belief;
use farlight_logic::civilization::{CivTag, CivilizationState};
use farlight_logic::constants::physics;
use farlight_logic::gravity::MassiveKind;
use farlight_logic::vec3::Vec3;
use serde::{Deserialize, Serialize};

/// Static orbital facts about a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlanetBody {
    /// Stable planet id, unique across the world.
    pub id: u32,
    /// Catalog id of the parent star.
    pub star_id: u32,
    /// Orbital radius around the parent star, AU.
    pub orbital_radius_au: f64,
    /// Structures the player has built here.
    pub structures: Vec<StructureKind>,
}

/// Player-buildable installations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StructureKind {
    Habitat,
    Relay,
    Observatory,
    Shipyard,
}

/// Ground-truth civilization record.
///
/// `history` is the transition log: (external year, tag entered), starting
/// with the state whose light is just now arriving. It is what makes the
/// epistemic gap computable — the observed state at time T is the last
/// entry at or before T − light travel time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Civilization {
    pub state: CivilizationState,
    pub history: Vec<(f64, CivTag)>,
    /// External year of the last player uplift, if any.
    pub uplift_year: Option<f64>,
}

impl Civilization {
    pub fn new(state: CivilizationState, genesis_year: f64) -> Self {
        let history = vec![(genesis_year, state.tag())];
        Self {
            state,
            history,
            uplift_year: None,
        }
    }

    /// Ground-truth tag as it was at `year` (clamped to the first record).
    pub fn tag_at(&self, year: f64) -> CivTag {
        let mut tag = self.history.first().map(|(_, t)| *t).unwrap_or(CivTag::Sterile);
        for &(t, entered) in &self.history {
            if t <= year {
                tag = entered;
            } else {
                break;
            }
        }
        tag
    }

    pub fn record_transition(&mut self, year: f64, tag: CivTag) {
        self.history.push((year, tag));
    }
}

/// What the player currently believes about a planet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BeliefState {
    pub belief: Belief,
    /// Tag the most recent photons showed.
    pub observed: CivTag,
    /// Observer distance when the observation was made, light-years.
    pub observation_distance_ly: f64,
}

/// The player's ship.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShipState {
    /// Position in catalog space, light-years.
    pub position: Vec3,
    /// Velocity as a fraction of c; |β| < 1 always.
    pub beta: Vec3,
    /// Cumulative time on the ship's own clock, years.
    pub proper_time_years: f64,
    /// Cumulative galaxy-frame time, years.
    pub external_time_years: f64,
    pub mode: ShipMode,
    /// Star the ship is heading for, if any.
    pub target_star: Option<u32>,
}

impl Default for ShipState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            beta: Vec3::ZERO,
            proper_time_years: 0.0,
            external_time_years: 0.0,
            mode: ShipMode::Docked,
            target_star: None,
        }
    }
}

/// Ship operating regime, derived every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipMode {
    Docked,
    Orbital,
    Cruise,
    NearMassive,
}

/// Camera state. Driven entirely by routed input; there is no autonomous
/// camera motion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    pub position: Vec3,
    /// Camera velocity as a fraction of c, used for SR corrections.
    pub beta: Vec3,
    pub zoom: f64,
    pub fov_deg: f64,
    pub mode: CameraMode,
}

impl Default for CameraState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            beta: Vec3::ZERO,
            zoom: 1.0,
            fov_deg: 60.0,
            mode: CameraMode::Ship,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CameraMode {
    /// Tracks the ship (bridge view).
    Ship,
    /// Free map camera.
    Map,
}

/// A compact object heavy enough for GR to matter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MassiveObject {
    pub id: u32,
    pub kind: MassiveKind,
    pub mass_solar: f64,
    /// 2GM/c², light-years. Computed once at construction.
    pub schwarzschild_radius_ly: f64,
    pub position: Vec3,
}

impl MassiveObject {
    pub fn new(id: u32, kind: MassiveKind, mass_solar: f64, position: Vec3) -> Self {
        Self {
            id,
            kind,
            mass_solar,
            schwarzschild_radius_ly: mass_solar * physics::SCHWARZSCHILD_RADIUS_SOLAR_LY,
            position,
        }
    }
}

/// Top-level UI mode; gates input routing and the emitted view payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UiMode {
    Bridge,
    GalaxyMap,
    Trade,
}

/// Mode-specific UI sub-state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UiState {
    pub mode: UiMode,
    /// Star selected on the galaxy map.
    pub map_selected: Option<u32>,
    /// Map pan offset, light-years.
    pub map_pan_x: f64,
    pub map_pan_y: f64,
    /// Last item traded, shown in the trade view.
    pub last_trade: Option<crate::frame::TradeItem>,
}

impl Default for UiState {
    fn default() -> Self {
        Self {
            mode: UiMode::Bridge,
            map_selected: None,
            map_pan_x: 0.0,
            map_pan_y: 0.0,
            last_trade: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farlight_logic::civilization::CivilizationState;

    #[test]
    fn history_lookup_clamps_and_steps() {
        let mut civ = Civilization::new(CivilizationState::Microbial, -2000.0);
        civ.record_transition(-500.0, CivTag::Complex);
        civ.record_transition(100.0, CivTag::PreTech);

        assert_eq!(civ.tag_at(-3000.0), CivTag::Microbial); // before genesis
        assert_eq!(civ.tag_at(-1000.0), CivTag::Microbial);
        assert_eq!(civ.tag_at(-500.0), CivTag::Complex);
        assert_eq!(civ.tag_at(0.0), CivTag::Complex);
        assert_eq!(civ.tag_at(200.0), CivTag::PreTech);
    }

    #[test]
    fn schwarzschild_radius_scales_with_mass() {
        let one = MassiveObject::new(0, MassiveKind::BlackHole, 1.0, Vec3::ZERO);
        let twenty = MassiveObject::new(1, MassiveKind::BlackHole, 20.0, Vec3::ZERO);
        assert!((twenty.schwarzschild_radius_ly / one.schwarzschild_radius_ly - 20.0).abs() < 1e-9);
    }

    #[test]
    fn ship_defaults_docked_at_origin() {
        let ship = ShipState::default();
        assert_eq!(ship.mode, ShipMode::Docked);
        assert_eq!(ship.position, Vec3::ZERO);
        assert_eq!(ship.beta.length(), 0.0);
    }
}
