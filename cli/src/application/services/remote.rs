//! Remote execution on the provisioned host.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use anyhow::Result;

use crate::application::ports::{RemoteShell, RemoteTarget};
use crate::domain::ProviderError;

/// Run one command on `target`, relaying the caller's stdio.
///
/// Once a session is open it is closed exactly once, whatever the command or
/// transport does. A close failure is only logged, never returned.
///
/// # Errors
///
/// - `NoExternalAddress` when the target has no host; no connection is tried.
/// - `RemoteSessionFailure` when connecting or relaying fails.
/// - `RemoteCommandFailed` carrying the remote exit code when it is non-zero.
pub async fn execute(shell: &impl RemoteShell, target: &RemoteTarget, command: &str) -> Result<()> {
    if target.host.trim().is_empty() {
        return Err(ProviderError::NoExternalAddress {
            user: target.user.clone(),
        }
        .into());
    }

    tracing::info!(host = %target.host, user = %target.user, "opening ssh session");
    let session = shell
        .connect(target)
        .await
        .map_err(|e| ProviderError::RemoteSessionFailure {
            detail: format!("connecting to {}@{}:{}: {e:#}", target.user, target.host, target.port),
        })?;

    let outcome = shell.run(&session, command).await;
    if let Err(e) = shell.close(session).await {
        tracing::warn!(error = %format!("{e:#}"), "closing ssh session");
    }

    let status = outcome.map_err(|e| ProviderError::RemoteSessionFailure {
        detail: format!("{e:#}"),
    })?;

    if status.success() {
        Ok(())
    } else {
        Err(ProviderError::RemoteCommandFailed {
            code: status.code().unwrap_or(1),
        }
        .into())
    }
}
