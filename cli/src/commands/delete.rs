//! `proxmox-provider delete` — destroy the machine.

use anyhow::Result;

use crate::application::ports::{CredentialStore, InfraTool, ProjectFetcher, ToolInstaller};
use crate::application::services::Lifecycle;

/// Run `proxmox-provider delete`.
///
/// # Errors
///
/// Returns the first failing phase of the lifecycle.
pub async fn run<T, I, F, K>(lifecycle: &Lifecycle<T, I, F, K>) -> Result<()>
where
    T: InfraTool,
    I: ToolInstaller,
    F: ProjectFetcher,
    K: CredentialStore,
{
    lifecycle.delete().await?;
    tracing::info!(machine = %lifecycle.config().machine_id, "machine deleted");
    Ok(())
}
