//! Configuration loading and management.
//!
//! This module provides functionality to load the optional
//! `.nocopy/config.toml` file that tunes where the harness stages files and
//! which toolchain binaries it tries.

pub mod error;
pub mod loader;
pub mod models;

pub use error::{ConfigError, ConfigResult};
pub use loader::load_config;
pub use models::{HarnessConfig, ToolCandidate, ToolchainOverride};
