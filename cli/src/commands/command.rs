//! `proxmox-provider command <cmd>` — run a command on the machine over SSH.

use anyhow::Result;
use clap::Args;

use crate::application::ports::{
    CredentialStore, InfraTool, ProjectFetcher, RemoteShell, ToolInstaller,
};
use crate::application::services::Lifecycle;

/// Arguments for the command subcommand.
#[derive(Args, Debug)]
pub struct CommandArgs {
    /// Shell command to run on the machine
    #[arg(env = "COMMAND", value_name = "CMD")]
    pub command: String,
}

/// Run `proxmox-provider command`.
///
/// # Errors
///
/// Returns `ProviderError::RemoteCommandFailed` carrying the remote exit
/// code, or the failure that kept the command from running.
pub async fn run<T, I, F, K>(
    lifecycle: &Lifecycle<T, I, F, K>,
    shell: &impl RemoteShell,
    args: &CommandArgs,
) -> Result<()>
where
    T: InfraTool,
    I: ToolInstaller,
    F: ProjectFetcher,
    K: CredentialStore,
{
    anyhow::ensure!(!args.command.trim().is_empty(), "command must not be empty");
    lifecycle.command(shell, &args.command).await
}
