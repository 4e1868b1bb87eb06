//! `RemoteShell` backed by the system OpenSSH client in multiplexed mode.

use std::process::ExitStatus;

use anyhow::{Context, Result};
use openssh::{KnownHosts, Session, SessionBuilder, Stdio};

use crate::application::ports::{RemoteShell, RemoteTarget};

/// Opens one control-master session per command.
///
/// Host keys are accepted without prompting: machines are recreated often
/// and come up with fresh keys.
#[derive(Debug, Clone, Copy, Default)]
pub struct OpenSshShell;

/// Session builder for `target`, without connecting.
#[must_use]
pub fn session_builder(target: &RemoteTarget) -> SessionBuilder {
    let mut builder = SessionBuilder::default();
    builder
        .user(target.user.clone())
        .port(target.port)
        .keyfile(&target.key_file)
        .known_hosts_check(KnownHosts::Accept);
    builder
}

impl RemoteShell for OpenSshShell {
    type Session = Session;

    async fn connect(&self, target: &RemoteTarget) -> Result<Session> {
        tracing::debug!(user = %target.user, host = %target.host, port = target.port, "opening ssh session");
        session_builder(target)
            .connect_mux(&target.host)
            .await
            .with_context(|| format!("connecting to {}@{}", target.user, target.host))
    }

    async fn run(&self, session: &Session, command: &str) -> Result<ExitStatus> {
        tracing::debug!(command, "running remote command");
        session
            .raw_command(command)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit())
            .status()
            .await
            .context("remote command")
    }

    async fn close(&self, session: Session) -> Result<()> {
        session.close().await.context("closing ssh session")
    }
}
