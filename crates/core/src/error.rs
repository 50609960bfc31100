//! Error taxonomy of the build harness.
//!
//! Every variant is caught at the harness boundary and turned into a
//! terminal build or run status plus a message for the console. None of
//! them is meant to reach the UI layer as a fault.

use nc_protocol::Language;
use thiserror::Error;

/// Errors raised while staging, building or launching a program.
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Writing the editor snapshot to disk failed.
    #[error("Failed to stage source: {source}")]
    Staging { source: std::io::Error },

    /// None of the toolchain candidates for a language is usable.
    #[error("No working {language} toolchain found (tried: {})", .tried.join(", "))]
    ToolNotFound {
        language: Language,
        tried: Vec<String>,
        guidance: &'static str,
    },

    /// The compiler ran and rejected the source.
    #[error("Compilation failed:\n{diagnostics}")]
    Compile { diagnostics: String },

    /// A compiler or program process could not be launched.
    ///
    /// A user program that starts and then exits nonzero is not an error.
    #[error("Failed to launch '{command}': {source}")]
    RuntimeExecution {
        command: String,
        source: std::io::Error,
    },

    /// A run was requested without a successful build.
    #[error("No compiled program found. Please compile first.")]
    NothingToRun,
}

/// Type alias for Result with HarnessError.
pub type HarnessResult<T> = Result<T, HarnessError>;

impl HarnessError {
    /// Text shown in the console for this error.
    ///
    /// Compiler diagnostics are returned verbatim; a missing toolchain comes
    /// with installation guidance for that toolchain.
    pub fn user_message(&self) -> String {
        match self {
            Self::Compile { diagnostics } => diagnostics.clone(),
            Self::ToolNotFound { guidance, .. } => format!("Error: {self}\n\n{guidance}"),
            Self::NothingToRun => self.to_string(),
            _ => format!("Error: {self}"),
        }
    }
}
