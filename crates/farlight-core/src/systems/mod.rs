//! Systems — per-tick logic that operates on the world's components.

mod contact;
mod evolution;
mod kinematics;

pub use contact::*;
pub use evolution::*;
pub use kinematics::*;
