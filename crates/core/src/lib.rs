//! # nc-core
//!
//! Build-and-execute harness for the nocopy editor.
//!
//! This crate provides:
//! - A registry of supported languages, their templates and build pipelines
//! - Source staging into fresh temporary directories
//! - Toolchain discovery and compilation
//! - Program execution with incremental, concurrently drained output
//! - Build status tracking for a single editor slot
//!
//! ## Modules
//!
//! - [`config`]: Configuration loading from `.nocopy/config.toml`
//! - [`registry`]: Language templates and pipeline descriptors
//! - [`staging`]: Writing editor snapshots to disk
//! - [`toolchain`]: Toolchain probing and the compile step
//! - [`session`]: The record of one build attempt
//! - [`harness`]: Running built programs and streaming their output
//! - [`state`]: Status tracking and the single-slot workbench
//! - [`scaffold`]: Creating new program files from templates

pub mod config;
pub mod error;
pub mod harness;
pub mod registry;
pub mod scaffold;
pub mod session;
pub mod staging;
pub mod state;
pub mod toolchain;

pub use error::{HarnessError, HarnessResult};
