//! Infrastructure implementation of the `InfraTool` port.
//!
//! `TerraformCli<R>` routes every Terraform invocation through a
//! `CommandRunner`, running inside the session's working directory via
//! `-chdir`.

use std::path::Path;

use anyhow::Result;

use crate::application::ports::{CommandRunner, InfraTool, ProvisioningSession};
use crate::domain::{ProviderError, StateSnapshot, ToolPhase, VariableSet};
use crate::infra::command_runner::TokioCommandRunner;

/// Parallelism hint passed to `apply` and `destroy`.
pub const PARALLELISM: u32 = 99;

/// Terraform driven through its CLI.
///
/// Generic over `R: CommandRunner` so that tests can inject a mock runner
/// without spawning real processes.
pub struct TerraformCli<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> TerraformCli<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }

    async fn invoke(
        &self,
        session: &ProvisioningSession,
        phase: ToolPhase,
        args: Vec<String>,
    ) -> Result<Vec<u8>> {
        let bin = session.binary.to_string_lossy();
        let mut full = vec![
            format!("-chdir={}", session.working_dir.display()),
            phase.subcommand().to_string(),
        ];
        full.extend(args);
        let argv: Vec<&str> = full.iter().map(String::as_str).collect();

        tracing::debug!(%phase, "running terraform");
        let output = self.runner.run(&bin, &argv).await.map_err(|e| {
            ProviderError::ExternalToolFailure {
                phase,
                detail: format!("{e:#}"),
            }
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let detail = if stderr.is_empty() {
                format!("exited with {}", output.status)
            } else {
                stderr
            };
            return Err(ProviderError::ExternalToolFailure { phase, detail }.into());
        }
        Ok(output.stdout)
    }
}

impl TerraformCli<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner)
    }
}

fn state_arg(session: &ProvisioningSession) -> String {
    format!("-state={}", session.state_file.display())
}

fn parse_json<T: serde::de::DeserializeOwned>(phase: ToolPhase, stdout: &[u8]) -> Result<T> {
    serde_json::from_slice(stdout).map_err(|e| {
        ProviderError::ExternalToolFailure {
            phase,
            detail: format!("unreadable json output: {e}"),
        }
        .into()
    })
}

impl<R: CommandRunner> InfraTool for TerraformCli<R> {
    async fn probe(&self, binary: &Path) -> bool {
        self.runner
            .run(&binary.to_string_lossy(), &["version"])
            .await
            .is_ok_and(|o| o.status.success())
    }

    async fn init(&self, session: &ProvisioningSession) -> Result<()> {
        let args = ["-input=false", "-no-color", "-upgrade"];
        self.invoke(session, ToolPhase::Init, args.map(String::from).to_vec())
            .await
            .map(drop)
    }

    async fn apply(&self, session: &ProvisioningSession, vars: &VariableSet) -> Result<()> {
        let mut args: Vec<String> = [
            "-no-color",
            "-auto-approve",
            "-input=false",
            "-lock=false",
            "-refresh=true",
        ]
        .map(String::from)
        .to_vec();
        args.push(format!("-parallelism={PARALLELISM}"));
        args.push(state_arg(session));
        args.extend(vars.to_args());
        self.invoke(session, ToolPhase::Apply, args).await.map(drop)
    }

    async fn refresh(&self, session: &ProvisioningSession, vars: &VariableSet) -> Result<()> {
        let mut args: Vec<String> = ["-no-color", "-input=false", "-lock=false"]
            .map(String::from)
            .to_vec();
        args.push(state_arg(session));
        args.extend(vars.to_args());
        self.invoke(session, ToolPhase::Refresh, args).await.map(drop)
    }

    async fn destroy(&self, session: &ProvisioningSession) -> Result<()> {
        let mut args: Vec<String> = [
            "-no-color",
            "-auto-approve",
            "-input=false",
            "-lock=false",
            "-refresh=true",
        ]
        .map(String::from)
        .to_vec();
        args.push(format!("-parallelism={PARALLELISM}"));
        args.push(state_arg(session));
        self.invoke(session, ToolPhase::Destroy, args).await.map(drop)
    }

    async fn outputs(
        &self,
        session: &ProvisioningSession,
    ) -> Result<serde_json::Map<String, serde_json::Value>> {
        let args = vec![
            "-no-color".to_string(),
            "-json".to_string(),
            state_arg(session),
        ];
        let stdout = self.invoke(session, ToolPhase::Output, args).await?;
        parse_json(ToolPhase::Output, &stdout)
    }

    async fn show_state(&self, session: &ProvisioningSession) -> Result<StateSnapshot> {
        let args = vec![
            "-json".to_string(),
            "-no-color".to_string(),
            session.state_file.display().to_string(),
        ];
        let stdout = self.invoke(session, ToolPhase::Show, args).await?;
        parse_json(ToolPhase::Show, &stdout)
    }
}
