//! Machine lifecycle operations: install, create, delete, status, command.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::Path;

use anyhow::{Context, Result};

use crate::application::ports::{
    CredentialStore, InfraTool, ProjectFetcher, ProvisioningSession, RemoteShell, RemoteTarget,
    SSH_PORT, TERRAFORM_VERSION, ToolInstaller,
};
use crate::application::services::{project, remote};
use crate::domain::{
    InconclusiveStatus, MachineStatus, PUBLIC_IP_OUTPUT, ProviderConfig, ProviderError,
    VariableSet, output_value, strip_cidr,
};

/// Install the pinned Terraform release unless `binary` already runs.
///
/// # Errors
///
/// Returns `ProviderError::InstallFailed` if the download or the destination
/// directory cannot be set up.
pub async fn install(
    binary: &Path,
    tool: &impl InfraTool,
    installer: &impl ToolInstaller,
) -> Result<()> {
    if tool.probe(binary).await {
        tracing::debug!(binary = %binary.display(), "terraform already installed");
        return Ok(());
    }
    tracing::info!(version = %TERRAFORM_VERSION, binary = %binary.display(), "installing terraform");
    installer.install(&TERRAFORM_VERSION, binary).await
}

/// Drives one machine's infrastructure through Terraform.
///
/// Generic over every port so tests can inject fakes without spawning
/// processes. Calls against one machine folder must be serialized by the
/// caller; Terraform's own state lock is disabled.
pub struct Lifecycle<T, I, F, K> {
    config: ProviderConfig,
    session: ProvisioningSession,
    tool: T,
    installer: I,
    fetcher: F,
    keys: K,
}

impl<T, I, F, K> Lifecycle<T, I, F, K>
where
    T: InfraTool,
    I: ToolInstaller,
    F: ProjectFetcher,
    K: CredentialStore,
{
    pub fn new(
        config: ProviderConfig,
        session: ProvisioningSession,
        tool: T,
        installer: I,
        fetcher: F,
        keys: K,
    ) -> Self {
        Self {
            config,
            session,
            tool,
            installer,
            fetcher,
            keys,
        }
    }

    #[must_use]
    pub fn config(&self) -> &ProviderConfig {
        &self.config
    }

    /// Install the tool, ensure the project copy, then `terraform init -upgrade`.
    async fn bootstrap(&self) -> Result<()> {
        install(&self.session.binary, &self.tool, &self.installer).await?;
        project::ensure_project(&self.config.project, &self.session.working_dir, &self.fetcher)
            .await?;
        self.tool.init(&self.session).await
    }

    async fn variables(&self) -> Result<VariableSet> {
        let public_key = self
            .keys
            .public_key(&self.config.machine_folder)
            .await
            .context("loading machine public key")?;
        let vars = VariableSet::for_machine(&self.config, &public_key);
        tracing::debug!(?vars, "bound terraform variables");
        Ok(vars)
    }

    /// Provision the machine: apply, then refresh with the same variables.
    ///
    /// # Errors
    ///
    /// Returns the first failure of bootstrap, key loading, apply or refresh.
    pub async fn create(&self) -> Result<()> {
        self.bootstrap().await?;
        let vars = self.variables().await?;

        tracing::info!(machine = %self.config.machine_id, "applying terraform project");
        self.tool.apply(&self.session, &vars).await?;
        tracing::info!(machine = %self.config.machine_id, "refreshing terraform state");
        self.tool.refresh(&self.session, &vars).await?;
        Ok(())
    }

    /// Destroy the machine's infrastructure.
    ///
    /// # Errors
    ///
    /// Returns the first failure of bootstrap or destroy.
    pub async fn delete(&self) -> Result<()> {
        self.bootstrap().await?;
        tracing::info!(machine = %self.config.machine_id, "destroying terraform resources");
        self.tool.destroy(&self.session).await
    }

    /// Refresh the state and classify the machine.
    ///
    /// # Errors
    ///
    /// Any failure yields [`InconclusiveStatus`], which reports `NotFound`
    /// alongside the cause.
    pub async fn status(&self) -> Result<MachineStatus, InconclusiveStatus> {
        self.probe_status().await.map_err(InconclusiveStatus::new)
    }

    async fn probe_status(&self) -> Result<MachineStatus> {
        self.bootstrap().await?;
        let vars = self.variables().await?;
        self.tool.refresh(&self.session, &vars).await?;
        let snapshot = self.tool.show_state(&self.session).await?;
        let status = snapshot.status();
        tracing::debug!(%status, "classified terraform state");
        Ok(status)
    }

    /// The machine's public address with any CIDR suffix removed.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::OutputNotFound` if the state has no non-null
    /// `public_ip` output, or the failure of bootstrap or the output query.
    pub async fn external_ip(&self) -> Result<String> {
        self.bootstrap().await?;
        let outputs = self.tool.outputs(&self.session).await?;
        let raw = output_value(&outputs, PUBLIC_IP_OUTPUT).ok_or_else(|| {
            ProviderError::OutputNotFound {
                name: PUBLIC_IP_OUTPUT.to_string(),
            }
        })?;
        Ok(strip_cidr(&raw).to_string())
    }

    /// Run `command` on the machine over SSH.
    ///
    /// # Errors
    ///
    /// - `CredentialNotFound` if the machine's private key is missing.
    /// - `NoExternalAddress` if the state yields no usable address.
    /// - Any error of [`remote::execute`].
    pub async fn command(&self, shell: &impl RemoteShell, command: &str) -> Result<()> {
        let key_file = self
            .keys
            .private_key(&self.config.machine_folder)
            .await
            .context("loading machine private key")?;

        let user = self.config.cloud_init.username.clone();
        let host = match self.external_ip().await {
            Ok(host) => host,
            Err(e)
                if matches!(
                    e.downcast_ref::<ProviderError>(),
                    Some(ProviderError::OutputNotFound { .. })
                ) =>
            {
                tracing::debug!(error = %e, "no address output");
                String::new()
            }
            Err(e) => return Err(e),
        };

        let target = RemoteTarget {
            user,
            host,
            port: SSH_PORT,
            key_file,
        };
        remote::execute(shell, &target, command).await
    }
}
