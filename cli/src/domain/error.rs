//! Typed domain error enums.
//!
//! This module has zero imports from `crate::infra`, `crate::commands`,
//! `crate::application`, `tokio`, `std::fs`, `std::process`, or `std::net`.
//! All error types implement `thiserror::Error` and convert to `anyhow::Error`
//! via the `?` operator.

use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

use crate::domain::status::MachineStatus;

// ── Tool phases ───────────────────────────────────────────────────────────────

/// A single external-tool invocation, named for error reporting and logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolPhase {
    Init,
    Apply,
    Refresh,
    Destroy,
    Output,
    Show,
}

impl ToolPhase {
    /// The tool subcommand that implements this phase.
    #[must_use]
    pub fn subcommand(self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Apply => "apply",
            Self::Refresh => "refresh",
            Self::Destroy => "destroy",
            Self::Output => "output",
            Self::Show => "show",
        }
    }
}

impl fmt::Display for ToolPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.subcommand())
    }
}

// ── Provider errors ───────────────────────────────────────────────────────────

/// Errors raised while resolving, provisioning or reaching a machine.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("couldn't find option {key} in environment, please make sure {key} is defined")]
    MissingConfiguration { key: String },

    #[error("terraform project not found: {project}")]
    ProjectNotFound { project: String },

    #[error("failed to install terraform: {reason}")]
    InstallFailed { reason: String },

    #[error("terraform {phase} failed: {detail}")]
    ExternalToolFailure { phase: ToolPhase, detail: String },

    #[error("output {name} not found in terraform state")]
    OutputNotFound { name: String },

    #[error("instance {user}-devbox doesn't have an external address")]
    NoExternalAddress { user: String },

    #[error("ssh session failed: {detail}")]
    RemoteSessionFailure { detail: String },

    #[error("machine key {} is missing or empty", path.display())]
    CredentialNotFound { path: PathBuf },

    #[error("remote command exited with status {code}")]
    RemoteCommandFailed { code: i32 },
}

impl ProviderError {
    /// Exit code the process should terminate with for this error.
    ///
    /// A failed remote command hands back its own status; everything else is 1.
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::RemoteCommandFailed { code } => *code,
            _ => 1,
        }
    }
}

// ── Status errors ─────────────────────────────────────────────────────────────

/// A status probe that could not complete.
///
/// `status` is always [`MachineStatus::NotFound`]; callers must treat it as
/// unknown, not as confirmed absence.
#[derive(Debug, Error)]
#[error("status probe inconclusive (reported {status}): {error:#}")]
pub struct InconclusiveStatus {
    pub status: MachineStatus,
    pub error: anyhow::Error,
}

impl InconclusiveStatus {
    #[must_use]
    pub fn new(error: anyhow::Error) -> Self {
        Self {
            status: MachineStatus::NotFound,
            error,
        }
    }
}
