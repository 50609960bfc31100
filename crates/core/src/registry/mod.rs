//! Language registry: templates and pipeline descriptors.
//!
//! This module maps each `Language` to its boilerplate template and to the
//! [`PipelineDescriptor`] that drives staging, compilation and execution.

pub mod descriptor;
pub mod templates;

pub use descriptor::{
    descriptor_for, CompileStep, EntryPointDiscovery, PipelineDescriptor, RunStep, ToolSpec,
};
pub use templates::{template_for, template_for_tag, DEFAULT_LANGUAGE};
