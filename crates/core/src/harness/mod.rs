//! Run harness: executes the output of a successful build.
//!
//! Each call to [`RunHarness::run`] spawns exactly one process. Native
//! artifacts are executed directly; everything else goes through a runtime
//! tool (`java`, `python3`, `Rscript`, ...) that is probed on first use and
//! then cached on the session.

pub mod process;

pub use process::{KillSwitch, LaunchSpec, RunHandle, RunItem, RunOutput};

use crate::config::{HarnessConfig, ToolCandidate};
use crate::error::{HarnessError, HarnessResult};
use crate::session::BuildSession;
use crate::toolchain::{expand_args, resolve_toolchain, SystemProbe, ToolProbe};
use nc_protocol::ArtifactRef;
use std::path::Path;
use std::sync::Arc;

#[derive(Clone)]
pub struct RunHarness {
    config: Arc<HarnessConfig>,
    probe: Arc<dyn ToolProbe>,
}

impl RunHarness {
    pub fn new(config: Arc<HarnessConfig>) -> Self {
        Self::with_probe(config, Arc::new(SystemProbe))
    }

    pub fn with_probe(config: Arc<HarnessConfig>, probe: Arc<dyn ToolProbe>) -> Self {
        Self { config, probe }
    }

    /// Run the program built by `session`.
    ///
    /// # Errors
    ///
    /// - `HarnessError::NothingToRun` if the session did not succeed or its
    ///   artifact is gone
    /// - `HarnessError::ToolNotFound` if no runtime is available
    /// - `HarnessError::RuntimeExecution` if the process cannot be spawned
    pub async fn run(&self, session: &BuildSession) -> HarnessResult<RunHandle> {
        let spec = self.launch_spec(session).await?;
        tracing::info!(session = %session.id(), command = %spec.command_line(), "running program");
        process::spawn(&spec)
    }

    /// Resolve the invocation for `session` without spawning it.
    pub async fn launch_spec(&self, session: &BuildSession) -> HarnessResult<LaunchSpec> {
        if !session.is_succeeded() {
            return Err(HarnessError::NothingToRun);
        }
        let artifact = session.artifact().ok_or(HarnessError::NothingToRun)?;

        let work_dir = self.config.work_dir();
        let current_dir = session
            .staged()
            .map(|staged| staged.dir().to_path_buf())
            .unwrap_or(work_dir);

        match artifact {
            ArtifactRef::Binary { path } => {
                ensure_exists(path)?;
                Ok(LaunchSpec {
                    program: path.to_string_lossy().into_owned(),
                    args: Vec::new(),
                    current_dir,
                    stdin_file: None,
                })
            }
            ArtifactRef::JavaClass {
                classpath,
                class_name,
            } => {
                ensure_exists(&classpath.join(format!("{class_name}.class")))?;
                let runtime = self.runtime_for(session).await?;
                let dir = classpath.to_string_lossy();
                Ok(LaunchSpec {
                    program: runtime.program.clone(),
                    args: expand_args(
                        &runtime.args,
                        &[("{dir}", dir.as_ref()), ("{class}", class_name.as_str())],
                    ),
                    current_dir,
                    stdin_file: None,
                })
            }
            ArtifactRef::Script { path } => {
                ensure_exists(path)?;
                let runtime = self.runtime_for(session).await?;
                let script = path.to_string_lossy();
                let dir = path
                    .parent()
                    .map(|p| p.to_string_lossy().into_owned())
                    .unwrap_or_default();
                Ok(LaunchSpec {
                    program: runtime.program.clone(),
                    args: expand_args(
                        &runtime.args,
                        &[("{script}", script.as_ref()), ("{dir}", dir.as_str())],
                    ),
                    current_dir,
                    stdin_file: runtime.stdin_script.then(|| path.clone()),
                })
            }
        }
    }

    /// The runtime tool of `session`, probed at most once per session.
    pub async fn runtime_for<'a>(&self, session: &'a BuildSession) -> HarnessResult<&'a ToolCandidate> {
        let language = session.language();
        session
            .runtime()
            .get_or_try_init(|| async {
                resolve_toolchain(
                    language,
                    &self.config.run_candidates(language),
                    self.probe.as_ref(),
                )
                .await
            })
            .await
    }
}

fn ensure_exists(path: &Path) -> HarnessResult<()> {
    if path.exists() {
        Ok(())
    } else {
        tracing::debug!(path = %path.display(), "build output missing");
        Err(HarnessError::NothingToRun)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::toolchain::ToolchainInvoker;
    use async_trait::async_trait;
    use nc_protocol::Language;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Every candidate is available; counts probes.
    #[derive(Default)]
    struct CountingProbe {
        probes: AtomicUsize,
    }

    #[async_trait]
    impl ToolProbe for CountingProbe {
        async fn is_available(&self, _candidate: &ToolCandidate) -> bool {
            self.probes.fetch_add(1, Ordering::SeqCst);
            true
        }
    }

    struct NothingInstalled;

    #[async_trait]
    impl ToolProbe for NothingInstalled {
        async fn is_available(&self, _candidate: &ToolCandidate) -> bool {
            false
        }
    }

    fn config_in(dir: &Path) -> Arc<HarnessConfig> {
        Arc::new(HarnessConfig::default().with_work_dir(dir))
    }

    #[tokio::test]
    async fn test_pending_session_is_refused() {
        let temp_dir = tempfile::tempdir().unwrap();
        let harness = RunHarness::new(config_in(temp_dir.path()));

        let err = harness
            .run(&BuildSession::new(Language::C))
            .await
            .unwrap_err();
        assert!(matches!(err, HarnessError::NothingToRun));
    }

    #[tokio::test]
    async fn test_failed_session_is_refused() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let invoker = ToolchainInvoker::with_probe(Arc::clone(&config), Arc::new(NothingInstalled));
        let harness = RunHarness::with_probe(config, Arc::new(NothingInstalled));

        let session = invoker.build(Language::C, "int main() { return 0; }").await;
        let err = harness.run(&session).await.unwrap_err();
        assert!(matches!(err, HarnessError::NothingToRun));
    }

    #[tokio::test]
    async fn test_script_launch_spec() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let probe = Arc::new(CountingProbe::default());
        let invoker = ToolchainInvoker::with_probe(Arc::clone(&config), probe.clone());
        let harness = RunHarness::with_probe(config, probe.clone());

        let session = invoker.build(Language::Python, "print('hi')\n").await;
        let spec = harness.launch_spec(&session).await.unwrap();

        let script = session.staged().unwrap().path().to_string_lossy().into_owned();
        assert_eq!(spec.program, "python3");
        assert_eq!(spec.args, vec![script]);
        assert_eq!(spec.current_dir, session.staged().unwrap().dir());
        assert!(spec.stdin_file.is_none());
    }

    #[tokio::test]
    async fn test_runtime_probed_once_per_session() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let probe = Arc::new(CountingProbe::default());
        let invoker = ToolchainInvoker::with_probe(Arc::clone(&config), probe.clone());
        let harness = RunHarness::with_probe(config, probe.clone());

        let session = invoker.build(Language::R, "cat('x')\n").await;
        assert_eq!(probe.probes.load(Ordering::SeqCst), 0);

        harness.launch_spec(&session).await.unwrap();
        harness.launch_spec(&session).await.unwrap();
        assert_eq!(probe.probes.load(Ordering::SeqCst), 1);

        let next = invoker.build(Language::R, "cat('y')\n").await;
        harness.launch_spec(&next).await.unwrap();
        assert_eq!(probe.probes.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_missing_runtime_is_tool_not_found() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let invoker = ToolchainInvoker::with_probe(Arc::clone(&config), Arc::new(NothingInstalled));
        let harness = RunHarness::with_probe(config, Arc::new(NothingInstalled));

        let session = invoker.build(Language::R, "cat('x')\n").await;
        assert!(session.is_succeeded());

        let err = harness.run(&session).await.unwrap_err();
        assert!(err.user_message().contains("To install R"));
    }

    #[tokio::test]
    async fn test_stdin_script_candidate() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = Arc::new(
            HarnessConfig::default()
                .with_work_dir(temp_dir.path())
                .with_toolchain(
                    Language::R,
                    crate::config::ToolchainOverride {
                        compile: None,
                        run: Some(vec![ToolCandidate::new("R")
                            .with_args(["--vanilla"])
                            .with_stdin_script(true)]),
                    },
                ),
        );
        let probe = Arc::new(CountingProbe::default());
        let invoker = ToolchainInvoker::with_probe(Arc::clone(&config), probe.clone());
        let harness = RunHarness::with_probe(config, probe);

        let session = invoker.build(Language::R, "cat('x')\n").await;
        let spec = harness.launch_spec(&session).await.unwrap();

        assert_eq!(spec.program, "R");
        assert_eq!(spec.args, vec!["--vanilla".to_string()]);
        assert_eq!(spec.stdin_file.as_deref(), session.staged().map(|s| s.path()));
    }

    #[tokio::test]
    async fn test_deleted_script_is_nothing_to_run() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = config_in(temp_dir.path());
        let probe = Arc::new(CountingProbe::default());
        let invoker = ToolchainInvoker::with_probe(Arc::clone(&config), probe.clone());
        let harness = RunHarness::with_probe(config, probe);

        let session = invoker.build(Language::Python, "print(1)\n").await;
        std::fs::remove_file(session.staged().unwrap().path()).unwrap();

        let err = harness.launch_spec(&session).await.unwrap_err();
        assert!(matches!(err, HarnessError::NothingToRun));
    }
}
