//! State of the editor's build/run slot.
//!
//! This module provides:
//! - `StatusTracker`: the build status and run state of the slot
//! - `Workbench`: the orchestrator that owns the current build session,
//!   starts builds and runs, and reports progress as `Event`s

pub mod tracker;
pub mod workbench;

pub use tracker::StatusTracker;
pub use workbench::Workbench;
