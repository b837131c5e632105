//! End-to-end tests of the CLI client against a scripted stand-in binary.

use ai_services_mcp::cli::{AiServicesCli, SpawnError};
use ai_services_mcp::error::ToolError;
use tokio_test::assert_ok;

use crate::support::{fake_cli, FAKE_CLI_BODY};

#[tokio::test]
async fn version_is_parsed_from_cli_output() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fake_cli(dir.path(), FAKE_CLI_BODY);
    let cli = AiServicesCli::new(binary.to_string_lossy());

    let info = assert_ok!(cli.version().await);

    assert_eq!(info.version, "v0.4.1");
    assert_eq!(info.git_commit, "9f2c1ab");
    assert_eq!(info.build_date.as_deref(), Some("2025-06-02T10:11:12Z"));
    assert!(info.raw_output.starts_with("Version: v0.4.1"));
}

#[tokio::test]
async fn templates_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fake_cli(dir.path(), FAKE_CLI_BODY);
    let cli = AiServicesCli::new(binary.to_string_lossy());

    let list = assert_ok!(cli.templates().await);

    assert_eq!(list.templates, vec!["rag", "summarize"]);
    assert_eq!(list.count, 2);
}

#[tokio::test]
async fn template_images_are_listed() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fake_cli(dir.path(), FAKE_CLI_BODY);
    let cli = AiServicesCli::new(binary.to_string_lossy());

    let list = assert_ok!(cli.template_images("rag").await);

    assert_eq!(list.template, "rag");
    assert_eq!(
        list.images,
        vec![
            "icr.io/ai-services/rag-ui:1.0",
            "icr.io/ai-services/vllm:0.9"
        ]
    );
    assert_eq!(list.count, 2);
    assert!(list
        .raw_output
        .starts_with("Container images for application template rag:"));
}

#[tokio::test]
async fn stderr_is_appended_to_parsed_output() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fake_cli(
        dir.path(),
        "printf 'Available application templates:\\n- rag\\n'\necho 'warning: cache is stale' >&2",
    );
    let cli = AiServicesCli::new(binary.to_string_lossy());

    let list = assert_ok!(cli.templates().await);

    assert_eq!(list.templates, vec!["rag"]);
    assert!(list.raw_output.ends_with("warning: cache is stale"));
}

#[tokio::test]
async fn non_zero_exit_carries_streams() {
    let dir = tempfile::tempdir().unwrap();
    let binary = fake_cli(dir.path(), "echo 'partial'\necho 'no such template' >&2\nexit 4");
    let binary = binary.to_string_lossy().to_string();
    let cli = AiServicesCli::new(binary.clone());

    let err = cli.template_images("missing").await.unwrap_err();

    match &err {
        ToolError::NonZeroExit {
            command,
            code,
            stdout,
            stderr,
        } => {
            assert_eq!(
                command,
                &format!("{binary} application image list --template missing")
            );
            assert_eq!(*code, 4);
            assert_eq!(stdout, "partial");
            assert_eq!(stderr, "no such template");
        }
        other => panic!("expected non-zero exit, got {other:?}"),
    }
    assert!(err.to_string().contains("exited with code 4"));
}

#[tokio::test]
async fn non_executable_binary_is_permission_denied() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ai-services");
    std::fs::write(&path, "#!/bin/sh\necho hi\n").unwrap();

    let cli = AiServicesCli::new(path.to_string_lossy());
    let err = cli.version().await.unwrap_err();

    assert!(matches!(
        err,
        ToolError::Launch {
            source: SpawnError::PermissionDenied,
            ..
        }
    ));
}
