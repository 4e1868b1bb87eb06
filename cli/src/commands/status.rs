//! `proxmox-provider status` — print `NotFound`, `Busy` or `Running`.

use std::io::Write;

use anyhow::{Context, Result};

use crate::application::ports::{CredentialStore, InfraTool, ProjectFetcher, ToolInstaller};
use crate::application::services::Lifecycle;

/// Run `proxmox-provider status`, writing the status without a newline.
///
/// An inconclusive probe prints nothing and fails: callers must not read it
/// as confirmed absence.
///
/// # Errors
///
/// Returns [`crate::domain::InconclusiveStatus`] if the probe fails, or an
/// error if `out` cannot be written.
pub async fn run<T, I, F, K>(lifecycle: &Lifecycle<T, I, F, K>, out: &mut impl Write) -> Result<()>
where
    T: InfraTool,
    I: ToolInstaller,
    F: ProjectFetcher,
    K: CredentialStore,
{
    let status = lifecycle.status().await?;
    write!(out, "{status}").context("writing status")?;
    out.flush().context("writing status")
}
