//! Inter-process communication protocol.
//!
//! This module defines the message types for asynchronous communication
//! between the console front-end (editor, CLI) and the harness core.
//!
//! The protocol follows an Operation/Event pattern:
//! - `Op`: Commands sent from the front-end to the core
//! - `Event`: Status updates and program output sent back
//!
//! Communication is channel-based so that compilation and program output
//! never block the interactive surface.

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use crate::build_models::{BuildReport, OutputLine};
use crate::language::Language;

/// Operations sent from the front-end to the core.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "build",
///   "payload": {
///     "language": "C++",
///     "source": "int main() { return 0; }"
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Op {
    /// Build a snapshot of the editor buffer.
    ///
    /// Any program still running from a previous build is killed first.
    Build { language: Language, source: String },

    /// Run the artifact of the current build session.
    Run,

    /// Terminate the running program, if any.
    Kill,

    /// Request the status of the current build session.
    GetStatus,

    /// Shut down the core. A running program is killed.
    Shutdown,
}

/// Events sent from the core to the front-end.
///
/// Uses tagged enum serialization for TypeScript compatibility:
/// ```json
/// {
///   "type": "output",
///   "payload": {
///     "session_id": "uuid-here",
///     "line": { "stream": "stdout", "text": "Hello, World!" }
///   }
/// }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(tag = "type", content = "payload", rename_all = "camelCase")]
pub enum Event {
    /// A build has been accepted and the tracker moved to Pending.
    BuildStarted {
        #[ts(type = "string")]
        session_id: Uuid,
        language: Language,
    },

    /// A build reached a terminal status.
    BuildFinished { report: BuildReport },

    /// A toolchain candidate was probed and selected for a session.
    ToolchainSelected {
        #[ts(type = "string")]
        session_id: Uuid,
        language: Language,
        command: String,
    },

    /// The built program has been spawned.
    RunStarted {
        #[ts(type = "string")]
        session_id: Uuid,
    },

    /// One line of program output, in arrival order.
    Output {
        #[ts(type = "string")]
        session_id: Uuid,
        line: OutputLine,
    },

    /// The program exited and both of its output streams are drained.
    ///
    /// `exit_code` is informational for headless consumers; the console
    /// does not display it. It is `None` when the program was killed by
    /// a signal.
    RunFinished {
        #[ts(type = "string")]
        session_id: Uuid,
        exit_code: Option<i32>,
    },

    /// A human-readable message for the console, e.g. install guidance
    /// or a refusal to run before a successful build.
    Notice { message: String },
}
