//! The workbench: one build/run slot driven by the editor.
//!
//! The Workbench owns the current [`BuildSession`] and its
//! [`StatusTracker`]. Builds replace the session (which also removes the
//! previous staging directory) and runs execute whatever the current session
//! produced. Progress is reported through an `Event` channel so that the
//! front-end never blocks on a compiler or a running program.
//!
//! Only one program runs at a time: starting a build or a run kills the
//! program that is still running.

use crate::config::HarnessConfig;
use crate::error::{HarnessError, HarnessResult};
use crate::harness::{KillSwitch, RunHarness, RunItem};
use crate::session::BuildSession;
use crate::state::tracker::StatusTracker;
use crate::toolchain::{SystemProbe, ToolProbe, ToolchainInvoker};
use nc_protocol::{BuildReport, BuildStatus, Event, Language, Op, RunState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio_stream::StreamExt;
use uuid::Uuid;

/// Message sent when `GetStatus` arrives before any build.
const NOTHING_BUILT: &str = "Nothing has been built yet.";

#[derive(Default)]
struct Slot {
    session: Option<Arc<BuildSession>>,
    tracker: StatusTracker,
    active_run: Option<KillSwitch>,

    /// Incremented by every run and build; only the newest run updates the
    /// run state.
    run_generation: u64,
}

impl Slot {
    fn kill_active_run(&mut self) -> bool {
        match self.active_run.take() {
            Some(kill) => {
                kill.kill();
                true
            }
            None => false,
        }
    }
}

/// Orchestrates builds and runs for the editor.
///
/// Cloning is cheap and every clone drives the same slot.
#[derive(Clone)]
pub struct Workbench {
    invoker: ToolchainInvoker,
    harness: RunHarness,
    slot: Arc<Mutex<Slot>>,

    /// Number of builds requested so far. A build is current while its
    /// ticket is the latest one.
    build_requests: Arc<AtomicU64>,

    /// Held for the whole compile. C and C++ share one artifact path, so
    /// two compiles must never overlap.
    build_lock: Arc<Mutex<()>>,
    events_tx: mpsc::Sender<Event>,
}

impl Workbench {
    /// Create a workbench that probes the real system for toolchains.
    ///
    /// # Arguments
    ///
    /// * `config` - Harness configuration shared by every build and run
    /// * `events_tx` - Channel for sending events to the front-end
    pub fn new(config: HarnessConfig, events_tx: mpsc::Sender<Event>) -> Self {
        Self::with_probe(config, Arc::new(SystemProbe), events_tx)
    }

    pub fn with_probe(
        config: HarnessConfig,
        probe: Arc<dyn ToolProbe>,
        events_tx: mpsc::Sender<Event>,
    ) -> Self {
        let config = Arc::new(config);
        Self {
            invoker: ToolchainInvoker::with_probe(Arc::clone(&config), Arc::clone(&probe)),
            harness: RunHarness::with_probe(config, probe),
            slot: Arc::new(Mutex::new(Slot::default())),
            build_requests: Arc::new(AtomicU64::new(0)),
            build_lock: Arc::new(Mutex::new(())),
            events_tx,
        }
    }

    /// Build a snapshot of the editor buffer and make it the current session.
    ///
    /// A running program is killed first. Emits `BuildStarted`, then
    /// `ToolchainSelected` if a compiler was chosen, then `BuildFinished`.
    ///
    /// Builds compile one at a time. A build overtaken by a newer request
    /// is skipped if it has not started compiling yet, never becomes the
    /// current session and emits no `BuildFinished`; its report is still
    /// returned (status Pending when it was skipped).
    pub async fn build(&self, language: Language, source: &str) -> BuildReport {
        let ticket = self.next_build_ticket();
        self.build_with_ticket(ticket, language, source).await
    }

    /// Start a build in the background.
    ///
    /// The build counts as requested as soon as this returns, so a later
    /// `build` call always supersedes it.
    pub fn spawn_build(&self, language: Language, source: String) -> JoinHandle<BuildReport> {
        let ticket = self.next_build_ticket();
        let workbench = self.clone();
        tokio::spawn(async move { workbench.build_with_ticket(ticket, language, &source).await })
    }

    fn next_build_ticket(&self) -> u64 {
        self.build_requests.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current_build(&self, ticket: u64) -> bool {
        self.build_requests.load(Ordering::SeqCst) == ticket
    }

    async fn build_with_ticket(&self, ticket: u64, language: Language, source: &str) -> BuildReport {
        let session = BuildSession::new(language);
        let session_id = session.id();

        {
            let mut slot = self.slot.lock().await;
            if !self.is_current_build(ticket) {
                tracing::debug!(session = %session_id, "build superseded before it started");
                return session.report();
            }
            if slot.kill_active_run() {
                tracing::debug!("killed running program for new build");
                slot.tracker.finish_run();
            }
            // a run still resolving its runtime must not start after this
            slot.run_generation += 1;
            slot.tracker.begin_build();
        }

        self.emit(Event::BuildStarted {
            session_id,
            language,
        })
        .await;

        let session = {
            let _compiling = self.build_lock.lock().await;
            if !self.is_current_build(ticket) {
                tracing::debug!(session = %session_id, "build superseded before compiling");
                return session.report();
            }
            self.invoker.build_session(session, source).await
        };
        let report = session.report();
        let compiler = session.compiler().map(ToString::to_string);

        {
            let mut slot = self.slot.lock().await;
            if !self.is_current_build(ticket) {
                tracing::debug!(session = %session_id, "build superseded by a newer build");
                return report;
            }
            slot.tracker.finish_build(session.status());
            slot.session = Some(Arc::new(session));
        }

        if let Some(command) = compiler {
            self.emit(Event::ToolchainSelected {
                session_id,
                language,
                command,
            })
            .await;
        }

        self.emit(Event::BuildFinished {
            report: report.clone(),
        })
        .await;

        report
    }

    /// Run the program of the current session.
    ///
    /// Returns once the program has been spawned; its output arrives as
    /// `Output` events followed by one `RunFinished`. A program still
    /// running from an earlier request is killed first.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::NothingToRun` if the last build did not
    /// succeed, or the runtime or launch error. Every error is also
    /// reported as a `Notice` event.
    pub async fn run(&self) -> HarnessResult<()> {
        match self.start_run().await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.emit(Event::Notice {
                    message: err.user_message(),
                })
                .await;
                Err(err)
            }
        }
    }

    async fn start_run(&self) -> HarnessResult<()> {
        let (session, generation) = {
            let mut slot = self.slot.lock().await;
            let session = slot.session.clone().ok_or(HarnessError::NothingToRun)?;
            slot.tracker.begin_run()?;
            slot.kill_active_run();
            slot.run_generation += 1;
            (session, slot.run_generation)
        };

        let probed_before = session.runtime().get().is_some();
        let handle = match self.harness.run(&session).await {
            Ok(handle) => handle,
            Err(err) => {
                self.finish_run(generation).await;
                return Err(err);
            }
        };

        if !probed_before {
            if let Some(runtime) = session.runtime().get() {
                self.emit(Event::ToolchainSelected {
                    session_id: session.id(),
                    language: session.language(),
                    command: runtime.to_string(),
                })
                .await;
            }
        }

        {
            let mut slot = self.slot.lock().await;
            if slot.run_generation != generation {
                // A newer request arrived while the runtime was probed.
                handle.kill_switch().kill();
                return Ok(());
            }
            slot.active_run = Some(handle.kill_switch());
        }

        let session_id = session.id();
        self.emit(Event::RunStarted { session_id }).await;

        let workbench = self.clone();
        tokio::spawn(async move {
            let mut stream = handle.into_stream();
            while let Some(item) = stream.next().await {
                match item {
                    RunItem::Line(line) => {
                        workbench.emit(Event::Output { session_id, line }).await;
                    }
                    RunItem::Exited(exit_code) => {
                        workbench.finish_run(generation).await;
                        workbench
                            .emit(Event::RunFinished {
                                session_id,
                                exit_code,
                            })
                            .await;
                    }
                }
            }
        });

        Ok(())
    }

    async fn finish_run(&self, generation: u64) {
        let mut slot = self.slot.lock().await;
        if slot.run_generation == generation {
            slot.active_run = None;
            slot.tracker.finish_run();
        }
    }

    /// Terminate the running program. Returns false if nothing was running.
    pub async fn kill(&self) -> bool {
        self.slot.lock().await.kill_active_run()
    }

    /// Dispatch one front-end operation.
    ///
    /// Returns false once `Op::Shutdown` has been handled.
    pub async fn handle_op(&self, op: Op) -> bool {
        match op {
            Op::Build { language, source } => {
                self.spawn_build(language, source);
            }
            Op::Run => {
                // already reported as a Notice
                let _ = self.run().await;
            }
            Op::Kill => {
                self.kill().await;
            }
            Op::GetStatus => {
                let event = match self.current_report().await {
                    Some(report) => Event::BuildFinished { report },
                    None => Event::Notice {
                        message: NOTHING_BUILT.to_string(),
                    },
                };
                self.emit(event).await;
            }
            Op::Shutdown => {
                self.kill().await;
                return false;
            }
        }
        true
    }

    pub async fn is_build_successful(&self) -> bool {
        self.slot.lock().await.tracker.is_build_successful()
    }

    pub async fn build_status(&self) -> Option<BuildStatus> {
        self.slot.lock().await.tracker.build_status()
    }

    pub async fn run_state(&self) -> RunState {
        self.slot.lock().await.tracker.run_state()
    }

    /// Report of the current session, if any build has finished.
    pub async fn current_report(&self) -> Option<BuildReport> {
        self.slot
            .lock()
            .await
            .session
            .as_ref()
            .map(|session| session.report())
    }

    pub async fn current_session_id(&self) -> Option<Uuid> {
        self.slot.lock().await.session.as_ref().map(|s| s.id())
    }

    async fn emit(&self, event: Event) {
        let _ = self.events_tx.send(event).await;
    }
}
