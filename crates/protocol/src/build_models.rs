//! Build and run state models.
//!
//! This module defines the structures reported back to the editor after a
//! build attempt, and the lines streamed while a built program runs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use ts_rs::TS;
use uuid::Uuid;

use crate::language::Language;

/// Status of a single build attempt.
///
/// Pending -> Succeeded | Failed. A new build always starts again from
/// Pending, overwriting the previous terminal status.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BuildStatus {
    /// A build has been requested and has not finished yet.
    Pending,

    /// The build produced a runnable artifact.
    Succeeded,

    /// Staging, toolchain discovery or compilation failed.
    Failed,
}

/// Lifecycle of the program started from a successful build.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Finished,
}

/// What a successful build left behind to execute.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ArtifactRef {
    /// A native executable produced by a C or C++ compiler.
    Binary { path: PathBuf },

    /// A compiled class, run with `java -cp <classpath> <class_name>`.
    JavaClass {
        classpath: PathBuf,
        class_name: String,
    },

    /// A staged script handed to an interpreter at run time.
    Script { path: PathBuf },
}

/// Outcome of one build request, as shown to the editor.
///
/// `diagnostics` is `None` on success: a successful compile produces no
/// visible compiler output.
#[derive(Serialize, Deserialize, Debug, Clone, TS)]
pub struct BuildReport {
    #[ts(type = "string")]
    pub session_id: Uuid,

    pub language: Language,

    pub status: BuildStatus,

    /// Raw compiler diagnostics or an error message, only for failures.
    pub diagnostics: Option<String>,

    pub artifact: Option<ArtifactRef>,

    #[ts(type = "string")]
    pub started_at: DateTime<Utc>,

    #[ts(type = "string | null")]
    pub finished_at: Option<DateTime<Utc>>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.status == BuildStatus::Succeeded
    }
}

/// Which pipe of the running program a line came from.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, TS)]
#[serde(rename_all = "lowercase")]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// One line of program output, without its trailing newline.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, TS)]
pub struct OutputLine {
    pub stream: OutputStream,
    pub text: String,
}

impl OutputLine {
    pub fn stdout(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stdout,
            text: text.into(),
        }
    }

    pub fn stderr(text: impl Into<String>) -> Self {
        Self {
            stream: OutputStream::Stderr,
            text: text.into(),
        }
    }
}
