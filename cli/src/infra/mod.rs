//! Infrastructure layer — concrete implementations of application port traits.
//!
//! This module contains all I/O-performing code: process execution, the
//! Terraform CLI, release downloads, project fetching, key files and SSH.
//!
//! Imports from `crate::domain` and `crate::application::ports` are allowed.
//! Imports from `crate::cli` or `crate::commands` are forbidden.

use std::path::{Path, PathBuf};

use anyhow::Result;

pub mod command_runner;
pub mod installer;
pub mod keys;
pub mod project;
pub mod ssh;
pub mod terraform;

/// Overrides the provider home directory.
pub const DEVPOD_HOME_ENV: &str = "DEVPOD_HOME";

/// Location of the managed Terraform binary: `$DEVPOD_HOME/bin/terraform`,
/// with `DEVPOD_HOME` defaulting to `~/.devpod`.
///
/// # Errors
///
/// Returns an error if `DEVPOD_HOME` is unset and the home directory cannot
/// be determined.
pub fn tool_binary_path() -> Result<PathBuf> {
    let devpod_home = match std::env::var_os(DEVPOD_HOME_ENV).filter(|v| !v.is_empty()) {
        Some(val) => PathBuf::from(val),
        None => dirs::home_dir()
            .ok_or_else(|| anyhow::anyhow!("cannot determine home directory"))?
            .join(".devpod"),
    };
    Ok(tool_binary_in(&devpod_home))
}

/// Terraform binary path under a provider home directory.
#[must_use]
pub fn tool_binary_in(devpod_home: &Path) -> PathBuf {
    let name = if cfg!(windows) {
        "terraform.exe"
    } else {
        "terraform"
    };
    devpod_home.join("bin").join(name)
}
