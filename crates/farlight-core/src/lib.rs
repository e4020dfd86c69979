//! Farlight Core - deterministic frame-driven galactic simulation engine.
//!
//! The core advances a relativistic space-exploration world one frame at a
//! time and emits rendering directives for an external presentation host.
//! It knows nothing about windows, shaders, assets, or audio devices — the
//! entire boundary is two functions:
//!
//! ```rust,no_run
//! use farlight_core::{init_world, tick};
//! use farlight_core::frame::FrameInput;
//!
//! let mut world = init_world(42);
//! let mut frame = 0;
//! loop {
//!     let input = FrameInput::idle(frame, 1.0 / 60.0);
//!     let (next, output) = tick(world, input);
//!     world = next;
//!     // hand output.draw / output.sounds / contexts to the host renderer
//!     frame += 1;
//! }
//! ```
//!
//! Given the same seed and the same input trace, two runs produce
//! byte-identical trajectories; the PRNG lives inside the [`engine::World`]
//! and no code in this crate reads a wall clock.

pub mod catalog;
pub mod components;
pub mod debug;
pub mod emitter;
pub mod engine;
pub mod frame;
pub mod persistence;
pub mod rng;
pub mod systems;

pub use engine::{World, WorldConfig};
pub use frame::{FrameInput, FrameOutput};

/// Build a world from a seed with default configuration.
pub fn init_world(seed: u64) -> World {
    World::new(WorldConfig::with_seed(seed))
}

/// Build a world from a seed plus a real-star table (JSON text). A
/// malformed table is recoverable: the catalog falls back to its
/// hardcoded-plus-procedural path and the first frame's debug payload says
/// so.
pub fn init_world_with_source(seed: u64, real_star_source: &str) -> World {
    World::new(WorldConfig {
        real_star_source: Some(real_star_source.to_string()),
        ..WorldConfig::with_seed(seed)
    })
}

/// Advance the world one frame: the functional core boundary.
///
/// Takes the world by value and hands back its successor together with the
/// frame's output. Hosts that prefer to mutate in place can call
/// [`World::tick`] directly; the two are equivalent.
pub fn tick(mut world: World, input: FrameInput) -> (World, FrameOutput) {
    let output = world.tick(&input);
    (world, output)
}

/// Commonly used types for convenient importing.
pub mod prelude {
    pub use crate::components::*;
    pub use crate::engine::{World, WorldConfig};
    pub use crate::frame::*;
    pub use crate::{init_world, init_world_with_source, tick};
}
