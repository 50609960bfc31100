//! Toolchain invoker: stages a source snapshot and compiles it.
//!
//! `build` never returns an error. Staging failures, missing toolchains and
//! compiler rejections all end as a Failed [`BuildSession`] whose
//! diagnostics carry the message for the console. A successful compile is
//! silent: its diagnostics are empty even if the compiler printed warnings.

use crate::config::{HarnessConfig, ToolCandidate};
use crate::error::{HarnessError, HarnessResult};
use crate::registry::descriptor_for;
use crate::session::BuildSession;
use crate::staging::stage;
use crate::toolchain::expand_args;
use crate::toolchain::probe::{resolve_toolchain, SystemProbe, ToolProbe};
use nc_protocol::{ArtifactRef, Language};
use std::path::Path;
use std::process::{Output, Stdio};
use std::sync::Arc;
use tokio::process::Command;

/// Runs the build half of the harness.
#[derive(Clone)]
pub struct ToolchainInvoker {
    config: Arc<HarnessConfig>,
    probe: Arc<dyn ToolProbe>,
}

impl ToolchainInvoker {
    /// Create an invoker that probes the real system for toolchains.
    pub fn new(config: Arc<HarnessConfig>) -> Self {
        Self::with_probe(config, Arc::new(SystemProbe))
    }

    pub fn with_probe(config: Arc<HarnessConfig>, probe: Arc<dyn ToolProbe>) -> Self {
        Self { config, probe }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Build `source` in a new session.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use nc_core::config::HarnessConfig;
    /// use nc_core::toolchain::ToolchainInvoker;
    /// use nc_protocol::Language;
    /// use std::sync::Arc;
    ///
    /// # async fn example() {
    /// let invoker = ToolchainInvoker::new(Arc::new(HarnessConfig::default()));
    /// let session = invoker.build(Language::C, "int main() { return 0; }").await;
    /// println!("{:?}", session.status());
    /// # }
    /// ```
    pub async fn build(&self, language: Language, source: &str) -> BuildSession {
        self.build_session(BuildSession::new(language), source).await
    }

    /// Build `source` into an already created (Pending) session.
    pub async fn build_session(&self, mut session: BuildSession, source: &str) -> BuildSession {
        match self.try_build(&mut session, source).await {
            Ok(artifact) => {
                tracing::info!(
                    session = %session.id(),
                    language = %session.language(),
                    "build succeeded"
                );
                session.succeed(artifact);
            }
            Err(err) => {
                tracing::info!(
                    session = %session.id(),
                    language = %session.language(),
                    error = %err,
                    "build failed"
                );
                session.fail(err.user_message());
            }
        }
        session
    }

    async fn try_build(
        &self,
        session: &mut BuildSession,
        source: &str,
    ) -> HarnessResult<ArtifactRef> {
        let language = session.language();
        let descriptor = descriptor_for(language);

        let staged = stage(language, source, &self.config)?;
        let source_path = staged.path().to_path_buf();
        let dir = staged.dir().to_path_buf();
        let entry_point = staged.entry_point().map(str::to_string);
        session.attach_staged(staged);

        // Interpreted languages: staging is the whole build. There is no
        // syntax pre-check, so this always succeeds.
        if !descriptor.is_compiled() {
            return Ok(ArtifactRef::Script { path: source_path });
        }

        let artifact = self.config.artifact_path();
        if descriptor.produces_native_artifact() {
            remove_stale_artifact(&artifact)?;
        }

        let compiler = resolve_toolchain(
            language,
            &self.config.compile_candidates(language),
            self.probe.as_ref(),
        )
        .await?;
        session.record_compiler(compiler.clone());

        if descriptor.produces_native_artifact() {
            let output = compile(&compiler, &source_path, &artifact, &dir).await?;
            if !output.status.success() {
                discard_partial_artifact(&artifact);
                return Err(HarnessError::Compile {
                    diagnostics: diagnostics_from(&compiler, &output),
                });
            }

            return Ok(ArtifactRef::Binary { path: artifact });
        }

        // Class-file languages compile into the staging directory.
        let output = compile(&compiler, &source_path, &dir, &dir).await?;
        if !output.status.success() {
            return Err(HarnessError::Compile {
                diagnostics: diagnostics_from(&compiler, &output),
            });
        }

        let class_name = entry_point.unwrap_or_else(|| "Main".to_string());
        let class_file = dir.join(format!("{class_name}.class"));
        if !class_file.exists() {
            return Err(HarnessError::Compile {
                diagnostics: format!(
                    "{compiler} reported success but {} was not produced",
                    class_file.display()
                ),
            });
        }

        Ok(ArtifactRef::JavaClass {
            classpath: dir,
            class_name,
        })
    }
}

/// Spawn the compiler and wait for it.
///
/// stdout and stderr are read concurrently with the running process, so a
/// compiler producing more diagnostics than a pipe buffer holds cannot
/// deadlock.
async fn compile(
    compiler: &ToolCandidate,
    source: &Path,
    output: &Path,
    dir: &Path,
) -> HarnessResult<Output> {
    let source = source.to_string_lossy();
    let output = output.to_string_lossy();
    let dir_str = dir.to_string_lossy();
    let args = expand_args(
        &compiler.args,
        &[
            ("{source}", source.as_ref()),
            ("{output}", output.as_ref()),
            ("{dir}", dir_str.as_ref()),
        ],
    );

    tracing::debug!(program = %compiler.program, args = ?args, "spawning compiler");

    Command::new(&compiler.program)
        .args(&args)
        .current_dir(dir)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .output()
        .await
        .map_err(|source| HarnessError::RuntimeExecution {
            command: compiler.program.clone(),
            source,
        })
}

/// The fixed artifact path is reused across builds; a leftover binary from
/// an earlier build must never be runnable after a failed one.
fn remove_stale_artifact(path: &Path) -> HarnessResult<()> {
    match std::fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(HarnessError::Staging { source }),
    }
}

fn discard_partial_artifact(path: &Path) {
    if let Err(e) = std::fs::remove_file(path) {
        if e.kind() != std::io::ErrorKind::NotFound {
            tracing::warn!(path = %path.display(), error = %e, "failed to remove partial artifact");
        }
    }
}

/// Compiler stderr verbatim; falls back to stdout, then to the exit status,
/// so that a failed build never has empty diagnostics.
fn diagnostics_from(compiler: &ToolCandidate, output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if !stderr.trim().is_empty() {
        return stderr.into_owned();
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        return stdout.into_owned();
    }

    format!("{compiler} exited with {}", output.status)
}
