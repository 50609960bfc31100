//! Build and run status of the single editor slot.

use crate::error::{HarnessError, HarnessResult};
use nc_protocol::{BuildStatus, RunState};

/// Tracks whether the current buffer has been built successfully and
/// whether a program is running.
///
/// Every build moves the status back to Pending first, so an earlier
/// success can never vouch for a newer build.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct StatusTracker {
    build: Option<BuildStatus>,
    run: RunState,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// A build started; any terminal status is overwritten.
    pub fn begin_build(&mut self) {
        self.build = Some(BuildStatus::Pending);
    }

    pub fn finish_build(&mut self, status: BuildStatus) {
        self.build = Some(status);
    }

    /// `None` until the first build starts.
    pub fn build_status(&self) -> Option<BuildStatus> {
        self.build
    }

    pub fn is_build_successful(&self) -> bool {
        self.build == Some(BuildStatus::Succeeded)
    }

    /// Mark a run as started.
    ///
    /// # Errors
    ///
    /// Returns `HarnessError::NothingToRun` unless the last build succeeded.
    pub fn begin_run(&mut self) -> HarnessResult<()> {
        if !self.is_build_successful() {
            return Err(HarnessError::NothingToRun);
        }
        self.run = RunState::Running;
        Ok(())
    }

    pub fn finish_run(&mut self) {
        self.run = RunState::Finished;
    }

    pub fn run_state(&self) -> RunState {
        self.run
    }
}
