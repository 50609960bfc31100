//! Toolchain discovery and the compile step.
//!
//! - [`probe`]: ordered, short-circuiting discovery of toolchain binaries
//! - [`invoker`]: staging + compilation producing a [`BuildSession`](crate::session::BuildSession)

pub mod invoker;
pub mod probe;

pub use invoker::ToolchainInvoker;
pub use probe::{resolve_toolchain, SystemProbe, ToolProbe};

/// Substitute `{placeholder}` variables in command arguments.
///
/// Unknown placeholders are left untouched.
pub fn expand_args(args: &[String], vars: &[(&str, &str)]) -> Vec<String> {
    args.iter()
        .map(|arg| {
            vars.iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect()
}
