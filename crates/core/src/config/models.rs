//! Configuration models for the build harness.
//!
//! [`HarnessConfig`] is the explicit context object handed to staging, the
//! toolchain invoker and the run harness. Nothing in this crate reads
//! process-wide settings behind its back.

use crate::registry::{descriptor_for, RunStep};
use nc_protocol::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::path::PathBuf;

/// Default name of the native executable produced by C and C++ builds.
pub const DEFAULT_ARTIFACT_NAME: &str = "nocopyoutput";

/// One way of invoking a toolchain binary.
///
/// `args` may contain placeholders that are substituted per invocation:
/// - compile step: `{source}`, `{output}`, `{dir}`
/// - run step: `{script}`, `{dir}`, `{class}`
///
/// # Example
///
/// ```toml
/// [toolchains.R]
/// run = [
///     { program = "Rscript", args = ["{script}"] },
///     { program = "R", args = ["--vanilla"], stdin_script = true },
/// ]
/// ```
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct ToolCandidate {
    /// Program name looked up on PATH, or an absolute path.
    pub program: String,

    #[serde(default)]
    pub args: Vec<String>,

    /// Arguments of the version probe that must exit 0 for the candidate
    /// to be selected.
    #[serde(default = "default_probe_args")]
    pub probe_args: Vec<String>,

    /// Feed the staged script on stdin instead of passing it as an argument.
    #[serde(default)]
    pub stdin_script: bool,
}

fn default_probe_args() -> Vec<String> {
    vec!["--version".to_string()]
}

impl ToolCandidate {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            probe_args: default_probe_args(),
            stdin_script: false,
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_probe_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.probe_args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_stdin_script(mut self, stdin_script: bool) -> Self {
        self.stdin_script = stdin_script;
        self
    }
}

/// Shows the program and its fixed flags, e.g. `R --vanilla`.
impl fmt::Display for ToolCandidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.program)?;
        for arg in self.args.iter().filter(|a| !a.contains('{')) {
            write!(f, " {arg}")?;
        }
        Ok(())
    }
}

/// Replacement candidate lists for one language.
///
/// `compile` replaces the compiler candidates, `run` replaces the runtime
/// candidates. A missing list keeps the built-in defaults.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolchainOverride {
    #[serde(default)]
    pub compile: Option<Vec<ToolCandidate>>,

    #[serde(default)]
    pub run: Option<Vec<ToolCandidate>>,
}

/// Settings shared by every build and run of one workbench.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HarnessConfig {
    /// Directory for staged sources and the native artifact.
    /// `None` means the system temp directory.
    pub work_dir: Option<PathBuf>,

    /// File name of the native artifact, without platform suffix.
    pub artifact_name: String,

    /// Per-language toolchain overrides.
    pub toolchains: HashMap<Language, ToolchainOverride>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            work_dir: None,
            artifact_name: DEFAULT_ARTIFACT_NAME.to_string(),
            toolchains: HashMap::new(),
        }
    }
}

impl HarnessConfig {
    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_dir = Some(dir.into());
        self
    }

    pub fn with_toolchain(mut self, language: Language, toolchain: ToolchainOverride) -> Self {
        self.toolchains.insert(language, toolchain);
        self
    }

    /// Resolved work directory.
    pub fn work_dir(&self) -> PathBuf {
        self.work_dir.clone().unwrap_or_else(std::env::temp_dir)
    }

    /// Fixed path of the native artifact, shared by C and C++ builds.
    ///
    /// On Windows the platform executable suffix is appended.
    pub fn artifact_path(&self) -> PathBuf {
        self.work_dir().join(format!(
            "{}{}",
            self.artifact_name,
            std::env::consts::EXE_SUFFIX
        ))
    }

    /// Compiler candidates for `language`, in probe order.
    ///
    /// Empty for interpreted languages.
    pub fn compile_candidates(&self, language: Language) -> Vec<ToolCandidate> {
        if let Some(list) = self
            .toolchains
            .get(&language)
            .and_then(|t| t.compile.as_ref())
        {
            return list.clone();
        }

        descriptor_for(language)
            .compile
            .as_ref()
            .map(|step| step.candidates.iter().map(|spec| spec.to_candidate()).collect())
            .unwrap_or_default()
    }

    /// Runtime candidates for `language`, in probe order.
    ///
    /// Empty for languages whose artifact is executed directly.
    pub fn run_candidates(&self, language: Language) -> Vec<ToolCandidate> {
        if let Some(list) = self.toolchains.get(&language).and_then(|t| t.run.as_ref()) {
            return list.clone();
        }

        match &descriptor_for(language).run {
            RunStep::Artifact => Vec::new(),
            RunStep::Tool { candidates } => {
                candidates.iter().map(|spec| spec.to_candidate()).collect()
            }
        }
    }
}
