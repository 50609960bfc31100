//! Console rendering of workbench events.
//!
//! Program output goes to stdout and stderr unchanged. Everything the
//! harness itself says goes to stderr, so piping stdout captures exactly
//! what the program printed.

use colored::Colorize;
use nc_protocol::{BuildStatus, Event, OutputStream};
use tokio::sync::mpsc::Receiver;

pub struct Renderer {
    /// One JSON object per line instead of console text.
    pub json: bool,

    /// Also report successful builds. `run` keeps a successful compile
    /// silent.
    pub announce_success: bool,
}

impl Renderer {
    /// Print events until every sender is gone.
    pub async fn drain(self, mut rx: Receiver<Event>) {
        while let Some(event) = rx.recv().await {
            if self.json {
                match serde_json::to_string(&event) {
                    Ok(line) => println!("{line}"),
                    Err(e) => tracing::warn!(error = %e, "failed to serialize event"),
                }
            } else {
                self.print(&event);
            }
        }
    }

    fn print(&self, event: &Event) {
        match event {
            Event::BuildFinished { report } => match report.status {
                BuildStatus::Succeeded if self.announce_success => {
                    eprintln!("{} {}", "Build succeeded:".green().bold(), report.language);
                }
                BuildStatus::Failed => {
                    if self.announce_success {
                        eprintln!("{} {}", "Build failed:".red().bold(), report.language);
                    }
                    if let Some(diagnostics) = &report.diagnostics {
                        // verbatim, as the compiler printed it
                        eprint!("{diagnostics}");
                        if !diagnostics.ends_with('\n') {
                            eprintln!();
                        }
                    }
                }
                _ => {}
            },
            Event::Output { line, .. } => match line.stream {
                OutputStream::Stdout => println!("{}", line.text),
                OutputStream::Stderr => eprintln!("{}", line.text),
            },
            Event::Notice { message } => {
                eprintln!("{}", message.yellow());
            }
            Event::ToolchainSelected { command, .. } => {
                tracing::debug!(command = %command, "toolchain selected");
            }
            // exit codes are not shown
            Event::BuildStarted { .. } | Event::RunStarted { .. } | Event::RunFinished { .. } => {}
        }
    }
}
