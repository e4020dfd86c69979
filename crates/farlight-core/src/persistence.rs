//! Save/Load for the world.
//!
//! Uses bincode for binary serialization. The star catalog is never written
//! out: a save carries the (seed, real-star source, catalog config) triple
//! and the catalog is rebuilt bit-identically on load. Planet entities are
//! snapshotted as component-optionals keyed by stable id, so references
//! survive the respawn even though hecs `Entity` values do not.

use serde::{Deserialize, Serialize};
use std::io::{Read, Write};

use crate::catalog::{CatalogConfig, StarCatalog};
use crate::components::{BeliefState, CameraState, Civilization, PlanetBody, ShipState, UiState};
use crate::engine::World;
use crate::rng::SimRng;
use crate::systems::ContactNetwork;

/// Version number for save file format (increment when format changes)
const SAVE_VERSION: u32 = 1;

/// Serializable snapshot of the complete world state.
#[derive(Serialize, Deserialize)]
pub struct SaveData {
    /// Save format version
    pub version: u32,
    pub seed: u64,
    /// Real-star source text; needed to rebuild the identical catalog.
    pub star_source: Option<String>,
    pub catalog_config: CatalogConfig,
    pub lod: farlight_logic::lod::LodConfig,
    pub tick: u64,
    pub time_scale: f64,
    pub ship: ShipState,
    pub camera: CameraState,
    pub ui: UiState,
    pub contact: ContactNetwork,
    pub rng: SimRng,
    pub next_planet_id: u32,
    /// All planet entities with their components.
    pub entities: Vec<SerializableEntity>,
}

/// All possible components for an entity, serialized as optionals.
#[derive(Serialize, Deserialize, Default)]
pub struct SerializableEntity {
    pub body: Option<PlanetBody>,
    pub civilization: Option<Civilization>,
    pub belief: Option<BeliefState>,
}

/// Extract planet entities in stable-id order.
fn serialize_entities(world: &World) -> Vec<SerializableEntity> {
    let mut entities = Vec::with_capacity(world.planet_index.len());
    for &entity in world.planet_index.values() {
        let mut se = SerializableEntity::default();
        if let Ok(c) = world.ecs.get::<&PlanetBody>(entity) {
            se.body = Some((*c).clone());
        }
        if let Ok(c) = world.ecs.get::<&Civilization>(entity) {
            se.civilization = Some((*c).clone());
        }
        if let Ok(c) = world.ecs.get::<&BeliefState>(entity) {
            se.belief = Some((*c).clone());
        }
        entities.push(se);
    }
    entities
}

/// Save the complete world to a writer.
pub fn save_world<W: Write>(writer: W, world: &World) -> Result<(), SaveError> {
    let save_data = SaveData {
        version: SAVE_VERSION,
        seed: world.seed,
        star_source: world.star_source.clone(),
        catalog_config: world.catalog_config.clone(),
        lod: world.lod.clone(),
        tick: world.tick,
        time_scale: world.time_scale,
        ship: world.ship.clone(),
        camera: world.camera.clone(),
        ui: world.ui.clone(),
        contact: world.contact.clone(),
        rng: world.rng.clone(),
        next_planet_id: world.next_planet_id,
        entities: serialize_entities(world),
    };
    bincode::serialize_into(writer, &save_data)?;
    Ok(())
}

/// Load a world from a reader, rebuilding the catalog from its seed.
pub fn load_world<R: Read>(reader: R) -> Result<World, SaveError> {
    let save_data: SaveData = bincode::deserialize_from(reader)?;

    if save_data.version != SAVE_VERSION {
        return Err(SaveError::VersionMismatch {
            expected: SAVE_VERSION,
            found: save_data.version,
        });
    }

    let catalog = StarCatalog::build(
        save_data.seed,
        save_data.star_source.as_deref(),
        &save_data.catalog_config,
    );

    let mut world = World::from_save_parts(
        save_data.seed,
        save_data.tick,
        save_data.time_scale,
        catalog,
        save_data.star_source,
        save_data.catalog_config,
        save_data.lod,
        save_data.ship,
        save_data.camera,
        save_data.ui,
        save_data.contact,
        save_data.rng,
        save_data.next_planet_id,
    );

    for se in save_data.entities {
        let (Some(body), Some(civ), Some(belief)) = (se.body, se.civilization, se.belief) else {
            return Err(SaveError::Corrupt("planet entity missing a component"));
        };
        world.respawn_planet(body, civ, belief);
    }

    Ok(world)
}

/// Errors that can occur during save/load.
#[derive(Debug)]
pub enum SaveError {
    Io(std::io::Error),
    Bincode(Box<bincode::ErrorKind>),
    VersionMismatch { expected: u32, found: u32 },
    Corrupt(&'static str),
}

impl From<std::io::Error> for SaveError {
    fn from(e: std::io::Error) -> Self {
        SaveError::Io(e)
    }
}

impl From<Box<bincode::ErrorKind>> for SaveError {
    fn from(e: Box<bincode::ErrorKind>) -> Self {
        SaveError::Bincode(e)
    }
}

impl std::fmt::Display for SaveError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveError::Io(e) => write!(f, "IO error: {}", e),
            SaveError::Bincode(e) => write!(f, "Serialization error: {}", e),
            SaveError::VersionMismatch { expected, found } => {
                write!(
                    f,
                    "Save version mismatch: expected {}, found {}",
                    expected, found
                )
            }
            SaveError::Corrupt(what) => write!(f, "Corrupt save: {}", what),
        }
    }
}

impl std::error::Error for SaveError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use crate::engine::WorldConfig;
    use crate::frame::FrameInput;

    fn test_world(seed: u64) -> World {
        World::new(WorldConfig {
            catalog: CatalogConfig {
                procedural_radius_ly: 90.0,
                cell_size_ly: 30.0,
                max_leaf: 16,
            },
            max_planets: 40,
            ..WorldConfig::with_seed(seed)
        })
    }

    #[test]
    fn save_load_roundtrip_preserves_state() {
        let mut world = test_world(42);
        for i in 0..25 {
            world.tick(&FrameInput::idle(i, 1.0));
        }

        let mut buffer = Vec::new();
        save_world(&mut buffer, &world).expect("save failed");
        let loaded = load_world(&buffer[..]).expect("load failed");

        assert_eq!(loaded.tick, world.tick);
        assert_eq!(loaded.seed, world.seed);
        assert_eq!(loaded.ship, world.ship);
        assert_eq!(loaded.planet_count(), world.planet_count());
        assert_eq!(loaded.catalog.len(), world.catalog.len());

        // Component-level equality for every planet.
        for (&id, &entity) in &world.planet_index {
            let other = loaded.planet_index[&id];
            let a = world.ecs.get::<&Civilization>(entity).unwrap();
            let b = loaded.ecs.get::<&Civilization>(other).unwrap();
            assert_eq!(*a, *b, "civilization {} differs", id);
            let a = world.ecs.get::<&BeliefState>(entity).unwrap();
            let b = loaded.ecs.get::<&BeliefState>(other).unwrap();
            assert_eq!(*a, *b, "belief {} differs", id);
        }
    }

    #[test]
    fn save_load_tick_matches_uninterrupted_run() {
        let mut continuous = test_world(7);
        for i in 0..10 {
            continuous.tick(&FrameInput::idle(i, 1.0));
        }

        let mut world = test_world(7);
        for i in 0..5 {
            world.tick(&FrameInput::idle(i, 1.0));
        }
        let mut buffer = Vec::new();
        save_world(&mut buffer, &world).expect("save failed");
        let mut resumed = load_world(&buffer[..]).expect("load failed");
        let mut resumed_outputs = Vec::new();
        let mut continuous_outputs = Vec::new();
        {
            let mut replay = test_world(7);
            for i in 0..10 {
                let out = replay.tick(&FrameInput::idle(i, 1.0));
                if i >= 5 {
                    continuous_outputs.push(out);
                }
            }
        }
        for i in 5..10 {
            resumed_outputs.push(resumed.tick(&FrameInput::idle(i, 1.0)));
        }

        assert_eq!(resumed.ship, continuous.ship);
        assert_eq!(resumed.tick, continuous.tick);
        for (a, b) in resumed_outputs.iter().zip(continuous_outputs.iter()) {
            assert_eq!(a.draw, b.draw);
            assert_eq!(a.relativity, b.relativity);
        }
    }

    #[test]
    fn version_mismatch_is_rejected() {
        let world = test_world(1);
        let mut buffer = Vec::new();
        save_world(&mut buffer, &world).unwrap();
        // The version is the first little-endian u32.
        buffer[0] = 99;
        match load_world(&buffer[..]) {
            Err(SaveError::VersionMismatch { found: 99, .. }) => {}
            other => panic!("expected version mismatch, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn garbage_fails_cleanly() {
        let garbage = vec![0xFF; 64];
        assert!(load_world(&garbage[..]).is_err());
    }
}
