//! Port trait definitions for the Application layer.
//!
//! Ports are the interfaces (contracts) that infrastructure must fulfill.
//! This file imports only from `crate::domain` — never from `crate::infra`
//! or `crate::commands`.

use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};

use anyhow::Result;

use crate::domain::{ProviderConfig, StateSnapshot, VariableSet};

// ── Constants ─────────────────────────────────────────────────────────────────

/// Terraform release installed when the binary is missing.
pub const TERRAFORM_VERSION: semver::Version = semver::Version::new(1, 4, 0);

/// Port the guest's SSH daemon listens on.
pub const SSH_PORT: u16 = 22;

// ── Value Types ───────────────────────────────────────────────────────────────

/// Paths for one provider invocation. Rebuilt on every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProvisioningSession {
    /// Terraform executable, installed on demand.
    pub binary: PathBuf,
    /// `{machine folder}/.terraform`, the local project copy.
    pub working_dir: PathBuf,
    /// `{machine folder}/main.tfstate`.
    pub state_file: PathBuf,
}

impl ProvisioningSession {
    #[must_use]
    pub fn new(binary: PathBuf, config: &ProviderConfig) -> Self {
        Self {
            binary,
            working_dir: config.working_dir(),
            state_file: config.state_file(),
        }
    }
}

/// Where and as whom to open a remote session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteTarget {
    pub user: String,
    pub host: String,
    pub port: u16,
    /// Private key file handed to the SSH client.
    pub key_file: PathBuf,
}

// ── Command Runner Port ───────────────────────────────────────────────────────

/// Abstracts process execution so infrastructure can be swapped or mocked.
#[allow(async_fn_in_trait)]
pub trait CommandRunner {
    /// Run a program to completion and capture its output.
    async fn run(&self, program: &str, args: &[&str]) -> Result<Output>;
}

// ── Infrastructure Tool Port ──────────────────────────────────────────────────

/// The declarative infrastructure tool, driven as an external process.
///
/// Every failure is reported as `ProviderError::ExternalToolFailure`.
#[allow(async_fn_in_trait)]
pub trait InfraTool {
    /// Whether `binary` is a working executable of the tool.
    async fn probe(&self, binary: &Path) -> bool;
    /// Initialise the working directory, upgrading cached dependencies.
    async fn init(&self, session: &ProvisioningSession) -> Result<()>;
    /// Apply with locking off, refresh-before-apply on and fixed parallelism.
    async fn apply(&self, session: &ProvisioningSession, vars: &VariableSet) -> Result<()>;
    /// Reconcile the state file against real infrastructure.
    async fn refresh(&self, session: &ProvisioningSession, vars: &VariableSet) -> Result<()>;
    /// Destroy everything recorded in the state file.
    async fn destroy(&self, session: &ProvisioningSession) -> Result<()>;
    /// Output values recorded in the state file.
    async fn outputs(
        &self,
        session: &ProvisioningSession,
    ) -> Result<serde_json::Map<String, serde_json::Value>>;
    /// Parse the persisted state file.
    async fn show_state(&self, session: &ProvisioningSession) -> Result<StateSnapshot>;
}

/// Acquires a pinned release of the infrastructure tool.
#[allow(async_fn_in_trait)]
pub trait ToolInstaller {
    /// Install `version` so that it is runnable at `binary`.
    ///
    /// # Errors
    ///
    /// Fails with `ProviderError::InstallFailed`.
    async fn install(&self, version: &semver::Version, binary: &Path) -> Result<()>;
}

// ── Project Port ──────────────────────────────────────────────────────────────

/// Materialises an infrastructure project into a working directory.
#[allow(async_fn_in_trait)]
pub trait ProjectFetcher {
    /// Clone a remote repository into `dest`.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;
    /// Recursively copy `src` into `dest`.
    async fn copy_tree(&self, src: &Path, dest: &Path) -> Result<()>;
}

// ── Credential Port ───────────────────────────────────────────────────────────

/// Read-only access to the key pair stored in a machine folder.
///
/// Keys are generated elsewhere; this port never creates or rotates them.
#[allow(async_fn_in_trait)]
pub trait CredentialStore {
    /// Public key text, trimmed.
    async fn public_key(&self, machine_folder: &Path) -> Result<String>;
    /// Path of a present, non-empty private key file.
    async fn private_key(&self, machine_folder: &Path) -> Result<PathBuf>;
}

// ── Remote Shell Port ─────────────────────────────────────────────────────────

/// Secure remote sessions to the provisioned host.
#[allow(async_fn_in_trait)]
pub trait RemoteShell {
    type Session;

    /// Open a session.
    async fn connect(&self, target: &RemoteTarget) -> Result<Self::Session>;
    /// Run `command` with the caller's stdio relayed to it.
    async fn run(&self, session: &Self::Session, command: &str) -> Result<ExitStatus>;
    /// Release the session.
    async fn close(&self, session: Self::Session) -> Result<()>;
}
