//! Application layer — port trait definitions and use-case orchestration.
//!
//! This module depends only on `crate::domain` — never on `crate::infra`
//! or `crate::commands`.

pub mod ports;
pub mod services;

pub use ports::{
    CommandRunner, CredentialStore, InfraTool, ProjectFetcher, ProvisioningSession, RemoteShell,
    RemoteTarget, SSH_PORT, TERRAFORM_VERSION, ToolInstaller,
};
