//! Command handlers driven through mocked ports.

#![allow(clippy::expect_used, clippy::unwrap_used)]

use std::path::Path;

use proxmox_provider::commands;
use proxmox_provider::commands::command::CommandArgs;
use proxmox_provider::domain::{InconclusiveStatus, MachineStatus, ProviderError, ToolPhase};

use crate::mocks::{CannedTool, RecordingInstaller, ScriptedShell, lifecycle};

const RUNNING: &str = r#"{"values":{"outputs":{"public_ip":{"value":"192.168.1.40/24","type":"string"}}}}"#;
const BUSY: &str = r#"{"values":{"root_module":{}}}"#;
const GONE: &str = r#"{"format_version":"1.0"}"#;
const ADDRESS: &str = r#"{"public_ip":{"sensitive":false,"type":"string","value":"192.168.1.40/24"}}"#;

fn command(cmd: &str) -> CommandArgs {
    CommandArgs {
        command: cmd.to_string(),
    }
}

// ── init ─────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_init_installs_pinned_release_when_probe_fails() {
    let installer = RecordingInstaller::default();
    let binary = Path::new("/home/dev/.devpod/bin/terraform");
    commands::init::run(binary, &CannedTool::new("{}", "{}").not_installed(), &installer)
        .await
        .expect("init");

    let installs = installer.installs.lock().unwrap().clone();
    assert_eq!(installs, vec![("1.4.0".to_string(), binary.to_path_buf())]);
}

#[tokio::test]
async fn test_init_is_noop_when_binary_works() {
    let installer = RecordingInstaller::default();
    commands::init::run(
        Path::new("/home/dev/.devpod/bin/terraform"),
        &CannedTool::new("{}", "{}"),
        &installer,
    )
    .await
    .expect("init");
    assert!(installer.installs.lock().unwrap().is_empty());
}

// ── create / delete ──────────────────────────────────────────────────────────

#[tokio::test]
async fn test_create_runs_init_apply_refresh() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let tool = CannedTool::new("{}", "{}");
    let log = tool.call_log();
    commands::create::run(&lifecycle(&dir, tool)).await.expect("create");
    assert_eq!(log.phases(), vec!["init", "apply", "refresh"]);
}

#[tokio::test]
async fn test_create_reports_refresh_failure() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let tool = CannedTool::new("{}", "{}").failing_at(ToolPhase::Refresh);
    let err = commands::create::run(&lifecycle(&dir, tool))
        .await
        .expect_err("should fail");
    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::ExternalToolFailure {
            phase: ToolPhase::Refresh,
            ..
        })
    ));
}

#[tokio::test]
async fn test_delete_runs_init_destroy() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let tool = CannedTool::new("{}", "{}");
    let log = tool.call_log();
    commands::delete::run(&lifecycle(&dir, tool)).await.expect("delete");
    assert_eq!(log.phases(), vec!["init", "destroy"]);
}

// ── status ───────────────────────────────────────────────────────────────────

async fn printed_status(snapshot: &'static str) -> String {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let mut out = Vec::new();
    commands::status::run(&lifecycle(&dir, CannedTool::new("{}", snapshot)), &mut out)
        .await
        .expect("status");
    String::from_utf8(out).expect("utf8")
}

#[tokio::test]
async fn test_status_prints_each_classification() {
    assert_eq!(printed_status(RUNNING).await, "Running");
    assert_eq!(printed_status(BUSY).await, "Busy");
    assert_eq!(printed_status(GONE).await, "NotFound");
}

#[tokio::test]
async fn test_status_failure_is_inconclusive_and_prints_nothing() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let tool = CannedTool::new("{}", RUNNING).failing_at(ToolPhase::Refresh);
    let mut out = Vec::new();
    let err = commands::status::run(&lifecycle(&dir, tool), &mut out)
        .await
        .expect_err("should fail");

    assert!(out.is_empty());
    let inconclusive = err
        .downcast_ref::<InconclusiveStatus>()
        .expect("InconclusiveStatus");
    assert_eq!(inconclusive.status, MachineStatus::NotFound);
}

// ── command ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_command_connects_to_stripped_address_as_guest_user() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let shell = ScriptedShell::exiting(0);
    commands::command::run(
        &lifecycle(&dir, CannedTool::new(ADDRESS, "{}")),
        &shell,
        &command("uptime"),
    )
    .await
    .expect("command");

    let targets = shell.connects();
    assert_eq!(targets.len(), 1);
    assert_eq!(targets[0].host, "192.168.1.40");
    assert_eq!(targets[0].user, "ubuntu");
    assert_eq!(targets[0].port, 22);
    assert!(targets[0].key_file.ends_with("machine/id_devpod_rsa"));
    assert_eq!(shell.ran.lock().unwrap().clone(), vec!["uptime"]);
    assert_eq!(shell.closes(), 1);
}

#[tokio::test]
async fn test_command_propagates_remote_exit_code() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let shell = ScriptedShell::exiting(42);
    let err = commands::command::run(
        &lifecycle(&dir, CannedTool::new(ADDRESS, "{}")),
        &shell,
        &command("false"),
    )
    .await
    .expect_err("should fail");

    let provider_err = err.downcast_ref::<ProviderError>().expect("ProviderError");
    assert!(matches!(
        provider_err,
        ProviderError::RemoteCommandFailed { code: 42 }
    ));
    assert_eq!(provider_err.exit_code(), 42);
    assert_eq!(shell.closes(), 1);
}

#[tokio::test]
async fn test_command_without_address_never_connects() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let shell = ScriptedShell::exiting(0);
    let err = commands::command::run(
        &lifecycle(&dir, CannedTool::new(r#"{"public_ip":{"value":null}}"#, "{}")),
        &shell,
        &command("uptime"),
    )
    .await
    .expect_err("should fail");

    assert!(matches!(
        err.downcast_ref::<ProviderError>(),
        Some(ProviderError::NoExternalAddress { user }) if user == "ubuntu"
    ));
    assert!(shell.connects().is_empty());
    assert_eq!(shell.closes(), 0);
}

#[tokio::test]
async fn test_blank_command_is_rejected_before_any_phase() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let tool = CannedTool::new(ADDRESS, "{}");
    let log = tool.call_log();
    let shell = ScriptedShell::exiting(0);
    commands::command::run(&lifecycle(&dir, tool), &shell, &command("  "))
        .await
        .expect_err("should fail");

    assert!(log.phases().is_empty());
    assert!(shell.connects().is_empty());
}
