//! Spawning a user program and draining its output.
//!
//! stdout and stderr are read by two concurrent tasks that feed one bounded
//! channel, so lines reach the consumer in the order they were read. A slow
//! consumer slows the program down instead of buffering its whole output.
//! A waiter task owns the child; it reaps the process (or kills it on
//! request), waits for both drains to finish and only then publishes the
//! exit code.
//!
//! On unix the program leads its own process group and a kill signals the
//! whole group, so processes it started do not outlive it.

use crate::error::{HarnessError, HarnessResult};
use nc_protocol::{OutputLine, OutputStream};
use std::path::PathBuf;
use std::pin::Pin;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::process::Command;
use tokio::sync::{mpsc, oneshot, Notify};
use tokio::task::JoinHandle;
use tokio_stream::Stream;

/// Output lines buffered between the drains and the consumer.
const OUTPUT_BUFFER: usize = 1024;

/// How long the drains may keep reading after a kill. Pipes inherited by a
/// process that escaped the group would otherwise keep the run open.
const KILL_GRACE: Duration = Duration::from_millis(500);

/// A fully resolved program invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchSpec {
    pub program: String,
    pub args: Vec<String>,
    pub current_dir: PathBuf,

    /// File connected to the child's stdin. Without one, stdin is closed.
    pub stdin_file: Option<PathBuf>,
}

impl LaunchSpec {
    /// Program and arguments as one line, for logs and events.
    pub fn command_line(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Requests termination of a running program.
///
/// Cheap to clone. Killing a program that already exited does nothing.
#[derive(Debug, Clone, Default)]
pub struct KillSwitch(Arc<Notify>);

impl KillSwitch {
    pub fn kill(&self) {
        // notify_one stores a permit, so a kill issued before the waiter
        // starts listening is not lost.
        self.0.notify_one();
    }
}

/// One item of a run's output stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunItem {
    Line(OutputLine),

    /// Always the last item. `None` when the program was killed by a signal
    /// or its status could not be read.
    Exited(Option<i32>),
}

/// Everything a finished run produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunOutput {
    pub lines: Vec<OutputLine>,
    pub exit_code: Option<i32>,
}

impl RunOutput {
    /// stdout lines joined back together with newline terminators.
    pub fn stdout(&self) -> String {
        self.lines
            .iter()
            .filter(|line| line.stream == OutputStream::Stdout)
            .map(|line| format!("{}\n", line.text))
            .collect()
    }
}

/// Handle to a spawned program.
#[derive(Debug)]
pub struct RunHandle {
    pid: Option<u32>,
    command: String,
    lines: mpsc::Receiver<OutputLine>,
    exit: oneshot::Receiver<Option<i32>>,
    kill: KillSwitch,
}

impl RunHandle {
    pub fn pid(&self) -> Option<u32> {
        self.pid
    }

    /// The command line that was spawned.
    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn kill_switch(&self) -> KillSwitch {
        self.kill.clone()
    }

    /// Next output line, or `None` once both streams are closed.
    pub async fn next_line(&mut self) -> Option<OutputLine> {
        self.lines.recv().await
    }

    /// Wait for the program to exit and return its exit code.
    ///
    /// Output not yet read is discarded.
    pub async fn wait(self) -> Option<i32> {
        let Self { lines, exit, .. } = self;
        // the drains must not block on a channel nobody reads
        drop(lines);
        exit.await.ok().flatten()
    }

    /// Read all remaining output, then wait for the exit code.
    pub async fn collect(mut self) -> RunOutput {
        let mut lines = Vec::new();
        while let Some(line) = self.next_line().await {
            lines.push(line);
        }
        let exit_code = self.wait().await;
        RunOutput { lines, exit_code }
    }

    /// Turn the handle into a stream of lines ending with [`RunItem::Exited`].
    ///
    /// Take a [`KillSwitch`] first if the run may need to be stopped.
    pub fn into_stream(self) -> Pin<Box<dyn Stream<Item = RunItem> + Send>> {
        let Self {
            mut lines, exit, ..
        } = self;

        let stream = async_stream::stream! {
            while let Some(line) = lines.recv().await {
                yield RunItem::Line(line);
            }
            yield RunItem::Exited(exit.await.ok().flatten());
        };

        Box::pin(stream)
    }
}

/// Spawn `spec` and start draining its output.
///
/// # Errors
///
/// Returns `HarnessError::RuntimeExecution` if the stdin file cannot be
/// opened or the process cannot be spawned.
pub fn spawn(spec: &LaunchSpec) -> HarnessResult<RunHandle> {
    let command = spec.command_line();
    let launch_error = |source| HarnessError::RuntimeExecution {
        command: command.clone(),
        source,
    };

    let stdin = match &spec.stdin_file {
        Some(path) => Stdio::from(std::fs::File::open(path).map_err(launch_error)?),
        None => Stdio::null(),
    };

    tracing::debug!(command = %command, dir = %spec.current_dir.display(), "spawning program");

    let mut cmd = Command::new(&spec.program);
    cmd.args(&spec.args)
        .current_dir(&spec.current_dir)
        .stdin(stdin)
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);

    let mut child = cmd.spawn().map_err(launch_error)?;

    let pid = child.id();
    let (lines_tx, lines_rx) = mpsc::channel(OUTPUT_BUFFER);
    let (exit_tx, exit_rx) = oneshot::channel();
    let kill = KillSwitch::default();

    let stdout_task = child
        .stdout
        .take()
        .map(|out| drain(out, OutputStream::Stdout, lines_tx.clone()));
    let stderr_task = child
        .stderr
        .take()
        .map(|err| drain(err, OutputStream::Stderr, lines_tx));

    let notify = Arc::clone(&kill.0);
    let waited_command = command.clone();
    tokio::spawn(async move {
        let mut killed = false;
        let status = tokio::select! {
            status = child.wait() => status,
            _ = notify.notified() => {
                tracing::debug!(command = %waited_command, "killing program");
                killed = true;
                if let Err(e) = kill_process_tree(&mut child, pid) {
                    tracing::warn!(command = %waited_command, error = %e, "failed to kill program");
                }
                child.wait().await
            }
        };

        for mut task in [stdout_task, stderr_task].into_iter().flatten() {
            if !killed {
                let _ = task.await;
                continue;
            }
            if tokio::time::timeout(KILL_GRACE, &mut task).await.is_err() {
                tracing::debug!(command = %waited_command, "output still open after kill, closing it");
                task.abort();
            }
        }

        let exit_code = match status {
            Ok(status) => status.code(),
            Err(e) => {
                tracing::warn!(command = %waited_command, error = %e, "failed to reap program");
                None
            }
        };
        tracing::debug!(command = %waited_command, exit_code = ?exit_code, "program exited");
        let _ = exit_tx.send(exit_code);
    });

    Ok(RunHandle {
        pid,
        command,
        lines: lines_rx,
        exit: exit_rx,
        kill,
    })
}

/// Kill the program and every process in its group.
#[cfg(unix)]
fn kill_process_tree(child: &mut tokio::process::Child, pid: Option<u32>) -> std::io::Result<()> {
    let Some(pgid) = pid.and_then(|pid| libc::pid_t::try_from(pid).ok()) else {
        // already reaped
        return child.start_kill();
    };
    // SAFETY: kill(2) takes plain integers; a negative pid addresses the
    // process group the child leads.
    let rc = unsafe { libc::kill(-pgid, libc::SIGKILL) };
    if rc == 0 {
        Ok(())
    } else {
        // the group may be gone already; fall back to the child itself
        child.start_kill()
    }
}

#[cfg(not(unix))]
fn kill_process_tree(child: &mut tokio::process::Child, _pid: Option<u32>) -> std::io::Result<()> {
    child.start_kill()
}

/// Forward every line of `reader` until EOF.
///
/// Bytes are decoded lossily and the line terminator is stripped. While the
/// receiver is alive a full channel pauses reading; once it is gone, reading
/// continues so the child never blocks on a full pipe.
fn drain<R>(reader: R, stream: OutputStream, tx: mpsc::Sender<OutputLine>) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut reader = BufReader::new(reader);
        let mut buf = Vec::new();
        loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf).await {
                Ok(0) => break,
                Ok(_) => {
                    if buf.last() == Some(&b'\n') {
                        buf.pop();
                    }
                    if buf.last() == Some(&b'\r') {
                        buf.pop();
                    }
                    let text = String::from_utf8_lossy(&buf).into_owned();
                    let _ = tx.send(OutputLine { stream, text }).await;
                }
                Err(e) => {
                    tracing::debug!(?stream, error = %e, "output stream closed");
                    break;
                }
            }
        }
    })
}
