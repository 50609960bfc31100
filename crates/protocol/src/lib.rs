//! # nc-protocol
//!
//! Core protocol definitions and data models for the nocopy build harness.
//!
//! This crate defines all shared data structures used for:
//! - Identifying the supported source languages
//! - Reporting build status, artifacts and program output
//! - Communication between a console front-end and the harness core
//!
//! ## Modules
//!
//! - [`language`]: The closed set of supported languages
//! - [`build_models`]: Build status, artifact references and output lines
//! - [`ipc`]: Operations and Events for front-end/core communication
//!
//! ## Design Principles
//!
//! - Minimal dependencies: Only serde, ts-rs, uuid and chrono
//! - TypeScript generation: All types derive `TS` for client compatibility
//! - Independent compilation: No dependencies on other nocopy crates

pub mod build_models;
pub mod ipc;
pub mod language;

// Re-export all public types for convenience
pub use build_models::*;
pub use ipc::*;
pub use language::*;
