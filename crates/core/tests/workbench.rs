//! Workbench event flow tests with fake toolchains.

#![cfg(unix)]

mod common;

use common::*;
use nc_core::state::Workbench;
use nc_protocol::{BuildStatus, Event, Language, Op, RunState};
use std::time::Duration;
use tokio::sync::mpsc;

fn workbench(config: nc_core::config::HarnessConfig) -> (Workbench, mpsc::Receiver<Event>) {
    let (tx, rx) = mpsc::channel(1024);
    (Workbench::new(config, tx), rx)
}

#[tokio::test]
async fn test_build_then_run_event_sequence() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.fake_c_config());

    let report = workbench.build(Language::C, HELLO_C).await;
    assert!(report.is_success());
    assert!(workbench.is_build_successful().await);

    workbench.run().await.unwrap();
    let events = collect_until_run_finished(&mut rx).await;

    assert!(matches!(events[0], Event::BuildStarted { .. }));
    assert!(matches!(events[1], Event::ToolchainSelected { .. }));
    assert!(matches!(events[2], Event::BuildFinished { .. }));
    assert!(matches!(events[3], Event::RunStarted { .. }));
    match events.last() {
        Some(Event::RunFinished {
            session_id,
            exit_code,
        }) => {
            assert_eq!(*session_id, report.session_id);
            assert_eq!(*exit_code, Some(0));
        }
        other => panic!("Expected RunFinished, got {other:?}"),
    }

    assert_eq!(stdout_text(&events), "Hello, World!\n");
    assert!(selected_toolchains(&events)[0].starts_with("sh "));
    assert_eq!(workbench.run_state().await, RunState::Finished);
}

#[tokio::test]
async fn test_run_refused_after_failed_build() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.fake_c_config());

    workbench.build(Language::C, HELLO_C).await;
    let report = workbench.build(Language::C, BROKEN_C).await;
    assert_eq!(report.status, BuildStatus::Failed);
    drain_pending(&mut rx);

    assert!(workbench.run().await.is_err());
    let events = drain_pending(&mut rx);
    assert_eq!(
        notices(&events),
        vec!["No compiled program found. Please compile first.".to_string()]
    );
    assert!(output_lines(&events).is_empty());

    // fixing the source unblocks the run
    workbench.build(Language::C, HELLO_C).await;
    drain_pending(&mut rx);
    workbench.run().await.unwrap();
    let events = collect_until_run_finished(&mut rx).await;
    assert_eq!(stdout_text(&events), "Hello, World!\n");
}

#[tokio::test]
async fn test_runtime_fallback_is_reported() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.r_fallback_config());

    workbench.build(Language::R, "echo 'Hello, World!'\n").await;
    workbench.run().await.unwrap();
    let events = collect_until_run_finished(&mut rx).await;

    assert_eq!(selected_toolchains(&events), vec!["sh -s".to_string()]);
    assert_eq!(stdout_text(&events), "Hello, World!\n");

    // the runtime is probed once per session
    workbench.run().await.unwrap();
    let events = collect_until_run_finished(&mut rx).await;
    assert!(selected_toolchains(&events).is_empty());
}

#[tokio::test]
async fn test_new_build_kills_running_program() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.r_fallback_config());

    workbench
        .build(Language::R, "echo started\nexec sleep 30\n")
        .await;
    workbench.run().await.unwrap();

    // wait until the program is really running
    loop {
        match rx.recv().await {
            Some(Event::Output { line, .. }) if line.text == "started" => break,
            Some(_) => continue,
            None => panic!("channel closed"),
        }
    }
    assert_eq!(workbench.run_state().await, RunState::Running);

    workbench.build(Language::R, "echo again\n").await;
    let events = collect_until_run_finished(&mut rx).await;
    assert!(matches!(
        events.last(),
        Some(Event::RunFinished {
            exit_code: None,
            ..
        })
    ));
}

#[tokio::test]
async fn test_kill_op_stops_program() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.r_fallback_config());

    workbench.build(Language::R, "echo started\nexec sleep 30\n").await;
    assert!(workbench.handle_op(Op::Run).await);
    loop {
        if let Some(Event::Output { line, .. }) = rx.recv().await {
            if line.text == "started" {
                break;
            }
        }
    }

    assert!(workbench.handle_op(Op::Kill).await);
    let events = collect_until_run_finished(&mut rx).await;
    assert!(matches!(events.last(), Some(Event::RunFinished { .. })));
    assert!(!workbench.kill().await);
}

#[tokio::test]
async fn test_build_op_runs_in_background() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.fake_c_config());

    assert!(
        workbench
            .handle_op(Op::Build {
                language: Language::C,
                source: HELLO_C.to_string(),
            })
            .await
    );

    loop {
        match tokio::time::timeout(std::time::Duration::from_secs(30), rx.recv())
            .await
            .expect("Timed out waiting for BuildFinished")
        {
            Some(Event::BuildFinished { report }) => {
                assert_eq!(report.status, BuildStatus::Succeeded);
                break;
            }
            Some(_) => continue,
            None => panic!("channel closed"),
        }
    }
    assert_eq!(workbench.build_status().await, Some(BuildStatus::Succeeded));
}

#[tokio::test]
async fn test_overtaken_build_does_not_replace_the_artifact() {
    let sandbox = Sandbox::new().unwrap();
    let (workbench, mut rx) = workbench(sandbox.fake_c_config());

    let slow_source = format!("/* {SLOW_MARKER} */\n{HELLO_C}");
    let slow = workbench.spawn_build(Language::C, slow_source);
    // let the slow compile get going
    tokio::time::sleep(Duration::from_millis(300)).await;

    let fresh = workbench.build(Language::C, HELLO_C).await;
    let overtaken = slow.await.unwrap();
    assert_ne!(overtaken.session_id, fresh.session_id);
    assert_eq!(workbench.current_session_id().await, Some(fresh.session_id));
    assert!(workbench.is_build_successful().await);

    workbench.run().await.unwrap();
    let events = collect_until_run_finished(&mut rx).await;
    assert_eq!(stdout_text(&events), "Hello, World!\n");

    // only the current build reports a result
    let finished: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::BuildFinished { report } => Some(report.session_id),
            _ => None,
        })
        .collect();
    assert_eq!(finished, vec![fresh.session_id]);
}
