//! Tests for running child processes.

use std::time::Duration;

use ai_services_mcp::cli::{CommandRunner, ProcessRunner, SpawnError};
use ai_services_mcp::error::ToolError;

#[tokio::test]
async fn captures_both_streams_and_exit_code() {
    let result = ProcessRunner
        .run("sh", &["-c", "echo out; echo err >&2; exit 3"])
        .await
        .unwrap();

    assert_eq!(result.stdout, "out\n");
    assert_eq!(result.stderr, "err\n");
    assert_eq!(result.exit_code, 3);
    assert!(!result.success());
    assert_eq!(result.combined_output(), "out\nerr");
}

#[tokio::test]
async fn arguments_are_passed_verbatim() {
    let result = ProcessRunner
        .run("sh", &["-c", "printf '%s|' \"$@\"", "sh", "a b", "--template", ""])
        .await
        .unwrap();

    assert_eq!(result.stdout, "a b|--template||");
    assert!(result.success());
}

#[tokio::test]
async fn stdin_is_closed() {
    let result = tokio::time::timeout(Duration::from_secs(5), ProcessRunner.run("cat", &[]))
        .await
        .expect("cat should see end of input immediately")
        .unwrap();

    assert_eq!(result.stdout, "");
    assert!(result.success());
}

#[tokio::test]
async fn invalid_utf8_is_replaced() {
    let result = ProcessRunner
        .run("sh", &["-c", "printf 'ok\\377done'"])
        .await
        .unwrap();

    assert!(result.stdout.starts_with("ok"));
    assert!(result.stdout.ends_with("done"));
    assert!(result.stdout.contains('\u{FFFD}'));
}

#[tokio::test]
async fn signal_termination_reports_minus_one() {
    let result = ProcessRunner
        .run("sh", &["-c", "kill -9 $$"])
        .await
        .unwrap();

    assert_eq!(result.exit_code, -1);
    assert!(!result.success());
}

#[tokio::test]
async fn missing_binary_is_launch_error() {
    let err = ProcessRunner
        .run("/nonexistent/ai-services", &["version"])
        .await
        .unwrap_err();

    match err {
        ToolError::Launch { program, source } => {
            assert_eq!(program, "/nonexistent/ai-services");
            assert!(matches!(source, SpawnError::NotFound));
        }
        other => panic!("expected launch error, got {other:?}"),
    }
}

#[tokio::test]
async fn cancelled_run_returns_promptly() {
    let started = std::time::Instant::now();
    let outcome = tokio::time::timeout(
        Duration::from_millis(200),
        ProcessRunner.run("sleep", &["30"]),
    )
    .await;

    assert!(outcome.is_err());
    assert!(started.elapsed() < Duration::from_secs(5));
}
