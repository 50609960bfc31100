//! Helpers for collecting and inspecting workbench events.

use nc_protocol::{Event, OutputLine, OutputStream};
use std::time::Duration;
use tokio::sync::mpsc::Receiver;

/// Receive events until `RunFinished` (inclusive) or until the channel
/// closes.
///
/// Panics if nothing arrives within 30 seconds.
pub async fn collect_until_run_finished(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    loop {
        let event = tokio::time::timeout(Duration::from_secs(30), rx.recv())
            .await
            .expect("Timed out waiting for RunFinished");
        match event {
            Some(event) => {
                let done = matches!(event, Event::RunFinished { .. });
                events.push(event);
                if done {
                    return events;
                }
            }
            None => return events,
        }
    }
}

/// Events currently queued, without waiting.
pub fn drain_pending(rx: &mut Receiver<Event>) -> Vec<Event> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}

/// Output lines carried by `events`, in order.
pub fn output_lines(events: &[Event]) -> Vec<OutputLine> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Output { line, .. } => Some(line.clone()),
            _ => None,
        })
        .collect()
}

/// stdout text of `events`, one newline per line.
pub fn stdout_text(events: &[Event]) -> String {
    output_lines(events)
        .into_iter()
        .filter(|line| line.stream == OutputStream::Stdout)
        .map(|line| format!("{}\n", line.text))
        .collect()
}

/// Messages of all `Notice` events.
pub fn notices(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::Notice { message } => Some(message.clone()),
            _ => None,
        })
        .collect()
}

/// Commands of all `ToolchainSelected` events.
pub fn selected_toolchains(events: &[Event]) -> Vec<String> {
    events
        .iter()
        .filter_map(|event| match event {
            Event::ToolchainSelected { command, .. } => Some(command.clone()),
            _ => None,
        })
        .collect()
}
