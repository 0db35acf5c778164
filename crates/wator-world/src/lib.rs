//! World simulation engine.
//!
//! This module implements the toroidal Wa-Tor sea where fish and sharks move,
//! feed, starve and breed one tick at a time.

pub mod change_log;
pub mod creature;
pub mod grid;
pub mod placement;
pub mod simulation;

pub use change_log::ChangeLog;
pub use creature::Creature;
pub use grid::{Grid, Neighbors};
pub use placement::Placement;
pub use simulation::{RunSummary, Simulation, UpdateResult};
