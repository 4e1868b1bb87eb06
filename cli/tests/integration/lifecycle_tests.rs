//! End-to-end lifecycle against a stub `terraform` executable.

#![cfg(unix)]
#![allow(clippy::expect_used)]

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;

/// Prints a state snapshot for `show` and records every invocation.
const STUB: &str = r#"#!/bin/sh
echo "$@" >> "$(dirname "$0")/calls.log"
for arg in "$@"; do
  case "$arg" in
    show) printf '%s' "$STUB_STATE"; exit 0 ;;
    output) printf '%s' "$STUB_OUTPUTS"; exit 0 ;;
    destroy) [ -n "$STUB_FAIL_DESTROY" ] && { echo "Error: 401 Unauthorized" >&2; exit 1; } ;;
  esac
done
exit 0
"#;

struct Machine {
    _dir: tempfile::TempDir,
    home: PathBuf,
    folder: PathBuf,
    project: PathBuf,
}

impl Machine {
    fn new() -> Self {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let home = dir.path().join("devpod");
        let bin = home.join("bin");
        std::fs::create_dir_all(&bin).expect("mkdir");
        let stub = bin.join("terraform");
        std::fs::write(&stub, STUB).expect("write stub");
        std::fs::set_permissions(&stub, std::fs::Permissions::from_mode(0o755)).expect("chmod");

        let project = dir.path().join("project");
        std::fs::create_dir_all(&project).expect("mkdir");
        std::fs::write(project.join("main.tf"), "output \"public_ip\" {}").expect("write");

        let folder = dir.path().join("machine");
        std::fs::create_dir_all(&folder).expect("mkdir");
        std::fs::write(folder.join("id_devpod_rsa.pub"), "ssh-rsa AAAA devpod\n").expect("write");
        std::fs::write(folder.join("id_devpod_rsa"), "-----BEGIN KEY-----\n").expect("write");

        Self {
            _dir: dir,
            home,
            folder,
            project,
        }
    }

    fn provider(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("proxmox-provider"));
        cmd.env_clear()
            .env("PATH", std::env::var_os("PATH").unwrap_or_default())
            .env("DEVPOD_HOME", &self.home)
            .env("MACHINE_FOLDER", &self.folder)
            .env("MACHINE_ID", "box1")
            .env("NODE_NAME", "pve")
            .env("PROXMOX_API_URL", "https://pve.lan:8006/api2/json")
            .env("PROXMOX_API_TOKEN_ID", "devpod@pve!provider")
            .env("PROXMOX_API_TOKEN_SECRET", "s3cret")
            .env("PROXMOX_VM_ID", "120")
            .env("CLOUDINIT_SSH_KEY", "ssh-ed25519 AAAA user")
            .env("CLOUDINIT_USERNAME", "ubuntu")
            .env("CLOUDINIT_PASSWORD", "hunter2")
            .env("CLOUDINIT_IP", "192.168.1.40/24")
            .env("CLOUDINIT_GATEWAY", "192.168.1.1")
            .env("TERRAFORM_PROJECT", &self.project)
            .env("NO_COLOR", "1");
        cmd
    }

    fn calls(&self) -> Vec<String> {
        std::fs::read_to_string(self.home.join("bin").join("calls.log"))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    fn working_dir(&self) -> PathBuf {
        self.folder.join(".terraform")
    }
}

fn subcommand_of(call: &str, working_dir: &Path) -> String {
    let prefix = format!("-chdir={} ", working_dir.display());
    call.strip_prefix(&prefix)
        .and_then(|rest| rest.split_whitespace().next())
        .unwrap_or_default()
        .to_string()
}

#[test]
fn test_init_with_working_binary_does_not_download() {
    let machine = Machine::new();
    machine.provider().arg("init").assert().success();
    assert_eq!(machine.calls(), vec!["version"]);
}

#[test]
fn test_create_copies_project_and_applies_then_refreshes() {
    let machine = Machine::new();
    machine.provider().arg("create").assert().success();

    assert!(machine.working_dir().join("main.tf").is_file());
    let calls = machine.calls();
    let phases: Vec<String> = calls
        .iter()
        .skip(1)
        .map(|c| subcommand_of(c, &machine.working_dir()))
        .collect();
    assert_eq!(phases, vec!["init", "apply", "refresh"]);

    let apply = &calls[2];
    assert!(apply.contains("-lock=false"));
    assert!(apply.contains("-parallelism=99"));
    assert!(apply.contains("node_name=pve"));
    assert!(apply.contains("devpod_ssh_key=ssh-rsa AAAA devpod"));
    assert!(apply.contains(&format!("-state={}", machine.folder.join("main.tfstate").display())));
}

#[test]
fn test_status_prints_running_without_newline() {
    let machine = Machine::new();
    machine
        .provider()
        .arg("status")
        .env(
            "STUB_STATE",
            r#"{"values":{"outputs":{"public_ip":{"value":"192.168.1.40/24"}}}}"#,
        )
        .assert()
        .success()
        .stdout("Running");
}

#[test]
fn test_status_of_empty_state_is_not_found() {
    let machine = Machine::new();
    machine
        .provider()
        .arg("status")
        .env("STUB_STATE", r#"{"format_version":"1.0"}"#)
        .assert()
        .success()
        .stdout("NotFound");
}

#[test]
fn test_delete_failure_reports_tool_stderr() {
    let machine = Machine::new();
    machine
        .provider()
        .arg("delete")
        .env("STUB_FAIL_DESTROY", "1")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("terraform destroy failed"))
        .stderr(predicate::str::contains("401 Unauthorized"));
}

#[test]
fn test_command_without_address_output_fails_before_ssh() {
    let machine = Machine::new();
    machine
        .provider()
        .args(["command", "uptime"])
        .env("STUB_OUTPUTS", "{}")
        .assert()
        .code(1)
        .stderr(predicate::str::contains(
            "instance ubuntu-devbox doesn't have an external address",
        ));
}
