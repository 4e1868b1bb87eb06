//! Application context: production adapters wired into the lifecycle.

use std::path::PathBuf;

use anyhow::Result;

use crate::application::ports::ProvisioningSession;
use crate::application::services::Lifecycle;
use crate::domain::ProviderConfig;
use crate::infra::command_runner::TokioCommandRunner;
use crate::infra::installer::ReleaseInstaller;
use crate::infra::keys::MachineKeys;
use crate::infra::project::GitProjectFetcher;
use crate::infra::terraform::TerraformCli;
use crate::infra::tool_binary_path;

/// Lifecycle backed by real processes, downloads and files.
pub type ProductionLifecycle = Lifecycle<
    TerraformCli<TokioCommandRunner>,
    ReleaseInstaller,
    GitProjectFetcher<TokioCommandRunner>,
    MachineKeys,
>;

/// State shared by every command handler.
///
/// Constructed once in `Cli::run()`. The machine configuration is read
/// lazily so `init` works without it.
pub struct AppContext {
    /// Managed Terraform executable.
    pub binary: PathBuf,
}

impl AppContext {
    /// # Errors
    ///
    /// Returns an error if the provider home directory cannot be determined.
    pub fn new() -> Result<Self> {
        Ok(Self {
            binary: tool_binary_path()?,
        })
    }

    /// Resolve the machine configuration and build a lifecycle for it.
    ///
    /// # Errors
    ///
    /// Returns `ProviderError::MissingConfiguration` naming the first
    /// absent environment key.
    pub fn lifecycle(&self) -> Result<ProductionLifecycle> {
        let config = ProviderConfig::from_env()?;
        tracing::debug!(?config, "resolved configuration");
        let session = ProvisioningSession::new(self.binary.clone(), &config);
        Ok(Lifecycle::new(
            config,
            session,
            TerraformCli::default_runner(),
            ReleaseInstaller::default(),
            GitProjectFetcher::default_runner(),
            MachineKeys,
        ))
    }
}
