//! Common test utilities for the harness integration tests.
//!
//! This module provides shared functionality across the tests:
//! - Fixtures: sample sources, fake toolchains and configurations
//! - Assertions over collected events

pub mod assertions;
pub mod fixtures;

#[allow(unused_imports)]
pub use assertions::*;
#[allow(unused_imports)]
pub use fixtures::*;
