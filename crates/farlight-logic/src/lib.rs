//! Pure simulation math for Farlight.
//!
//! This crate contains all world-model logic that is independent of any
//! engine, storage, or host runtime. Functions take plain data and return
//! results, making them unit-testable and portable between the core engine,
//! headless harnesses, and any future host.

pub mod belief;
pub mod civilization;
pub mod constants;
pub mod gravity;
pub mod lod;
pub mod relativity;
pub mod vec3;
