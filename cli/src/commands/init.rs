//! `proxmox-provider init` — install Terraform if it is missing.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{InfraTool, ToolInstaller};
use crate::application::services;

/// Run `proxmox-provider init`.
///
/// # Errors
///
/// Returns `ProviderError::InstallFailed` if the binary cannot be installed.
pub async fn run(binary: &Path, tool: &impl InfraTool, installer: &impl ToolInstaller) -> Result<()> {
    services::install(binary, tool, installer).await
}
