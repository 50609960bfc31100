//! The record of one build attempt.
//!
//! A [`BuildSession`] owns the staged source of its build. Dropping the
//! session removes the staging directory, so replacing the session of a
//! workbench is also what cleans up after the previous build.

use crate::config::ToolCandidate;
use crate::staging::StagedSource;
use chrono::{DateTime, Utc};
use nc_protocol::{ArtifactRef, BuildReport, BuildStatus, Language};
use tokio::sync::OnceCell;
use uuid::Uuid;

#[derive(Debug)]
pub struct BuildSession {
    id: Uuid,
    language: Language,
    status: BuildStatus,
    diagnostics: Option<String>,
    artifact: Option<ArtifactRef>,
    staged: Option<StagedSource>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
    compiler: Option<ToolCandidate>,
    /// Runtime toolchain selected for this session. Probed at most once per
    /// session; a new session probes again.
    runtime: OnceCell<ToolCandidate>,
}

impl BuildSession {
    /// Create a new session in Pending status.
    pub fn new(language: Language) -> Self {
        Self {
            id: Uuid::new_v4(),
            language,
            status: BuildStatus::Pending,
            diagnostics: None,
            artifact: None,
            staged: None,
            started_at: Utc::now(),
            finished_at: None,
            compiler: None,
            runtime: OnceCell::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn language(&self) -> Language {
        self.language
    }

    pub fn status(&self) -> BuildStatus {
        self.status
    }

    pub fn is_succeeded(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }

    /// Compiler output or error message of a failed build.
    pub fn diagnostics(&self) -> Option<&str> {
        self.diagnostics.as_deref()
    }

    pub fn artifact(&self) -> Option<&ArtifactRef> {
        self.artifact.as_ref()
    }

    pub fn staged(&self) -> Option<&StagedSource> {
        self.staged.as_ref()
    }

    /// Entry point discovered while staging, e.g. the Java class name.
    pub fn entry_point(&self) -> Option<&str> {
        self.staged.as_ref().and_then(StagedSource::entry_point)
    }

    /// Compiler selected for this build; `None` for interpreted languages or
    /// when no compiler was found.
    pub fn compiler(&self) -> Option<&ToolCandidate> {
        self.compiler.as_ref()
    }

    pub fn runtime(&self) -> &OnceCell<ToolCandidate> {
        &self.runtime
    }

    pub(crate) fn attach_staged(&mut self, staged: StagedSource) {
        self.staged = Some(staged);
    }

    pub(crate) fn record_compiler(&mut self, compiler: ToolCandidate) {
        self.compiler = Some(compiler);
    }

    pub(crate) fn succeed(&mut self, artifact: ArtifactRef) {
        self.status = BuildStatus::Succeeded;
        self.artifact = Some(artifact);
        self.diagnostics = None;
        self.finished_at = Some(Utc::now());
    }

    /// Mark the build failed. The staged source is kept until the session
    /// is dropped so that diagnostics can still refer to it.
    pub(crate) fn fail(&mut self, diagnostics: String) {
        self.status = BuildStatus::Failed;
        self.artifact = None;
        self.diagnostics = Some(diagnostics);
        self.finished_at = Some(Utc::now());
    }

    /// Snapshot for the front-end.
    pub fn report(&self) -> BuildReport {
        BuildReport {
            session_id: self.id,
            language: self.language,
            status: self.status,
            diagnostics: self.diagnostics.clone(),
            artifact: self.artifact.clone(),
            started_at: self.started_at,
            finished_at: self.finished_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_new_session_is_pending() {
        let session = BuildSession::new(Language::C);
        assert_eq!(session.status(), BuildStatus::Pending);
        assert!(session.artifact().is_none());
        assert!(session.diagnostics().is_none());
        assert!(session.runtime().get().is_none());
    }

    #[test]
    fn test_succeed_then_report() {
        let mut session = BuildSession::new(Language::Cpp);
        session.succeed(ArtifactRef::Binary {
            path: PathBuf::from("/tmp/nocopyoutput"),
        });

        let report = session.report();
        assert!(report.is_success());
        assert_eq!(report.session_id, session.id());
        assert!(report.diagnostics.is_none());
        assert!(report.finished_at.is_some());
    }

    #[test]
    fn test_fail_clears_artifact() {
        let mut session = BuildSession::new(Language::C);
        session.succeed(ArtifactRef::Binary {
            path: PathBuf::from("/tmp/nocopyoutput"),
        });
        session.fail("boom".to_string());

        assert_eq!(session.status(), BuildStatus::Failed);
        assert!(session.artifact().is_none());
        assert_eq!(session.diagnostics(), Some("boom"));
    }

    #[test]
    fn test_sessions_have_distinct_ids() {
        assert_ne!(
            BuildSession::new(Language::R).id(),
            BuildSession::new(Language::R).id()
        );
    }
}
