//! Provider configuration resolved from the process environment.
//!
//! Pure functions only — the environment is reached through a lookup closure
//! so that resolution can be exercised without touching process state.

use std::path::PathBuf;

use crate::domain::error::ProviderError;

// ── Environment keys ─────────────────────────────────────────────────────────

pub const MACHINE_FOLDER: &str = "MACHINE_FOLDER";
pub const MACHINE_ID: &str = "MACHINE_ID";
pub const NODE_NAME: &str = "NODE_NAME";
pub const PROXMOX_API_URL: &str = "PROXMOX_API_URL";
pub const PROXMOX_API_TOKEN_ID: &str = "PROXMOX_API_TOKEN_ID";
pub const PROXMOX_API_TOKEN_SECRET: &str = "PROXMOX_API_TOKEN_SECRET";
pub const PROXMOX_VM_ID: &str = "PROXMOX_VM_ID";
pub const CLOUDINIT_SSH_KEY: &str = "CLOUDINIT_SSH_KEY";
pub const CLOUDINIT_USERNAME: &str = "CLOUDINIT_USERNAME";
pub const CLOUDINIT_PASSWORD: &str = "CLOUDINIT_PASSWORD";
pub const CLOUDINIT_IP: &str = "CLOUDINIT_IP";
pub const CLOUDINIT_GATEWAY: &str = "CLOUDINIT_GATEWAY";
pub const TERRAFORM_PROJECT: &str = "TERRAFORM_PROJECT";

/// Every key [`ProviderConfig::from_lookup`] requires, in resolution order.
pub const REQUIRED_KEYS: &[&str] = &[
    MACHINE_FOLDER,
    MACHINE_ID,
    NODE_NAME,
    PROXMOX_API_URL,
    PROXMOX_API_TOKEN_ID,
    PROXMOX_API_TOKEN_SECRET,
    PROXMOX_VM_ID,
    CLOUDINIT_SSH_KEY,
    CLOUDINIT_USERNAME,
    CLOUDINIT_PASSWORD,
    CLOUDINIT_IP,
    CLOUDINIT_GATEWAY,
    TERRAFORM_PROJECT,
];

/// Prefix applied to caller-supplied machine ids.
pub const MACHINE_ID_PREFIX: &str = "devpod-";

// ── Config schema ────────────────────────────────────────────────────────────

/// Proxmox API endpoint and token.
#[derive(Clone)]
pub struct ProxmoxConfig {
    pub api_url: String,
    pub token_id: String,
    pub token_secret: String,
    /// Target node name.
    pub node_name: String,
    /// Numeric VM identifier, kept as given.
    pub vm_id: String,
}

/// Cloud-init parameters handed to the guest on first boot.
#[derive(Clone)]
pub struct CloudInitConfig {
    pub ssh_key: String,
    pub username: String,
    pub password: String,
    pub ip: String,
    pub gateway: String,
}

/// Immutable configuration for one provider invocation.
#[derive(Clone)]
pub struct ProviderConfig {
    /// Machine id with [`MACHINE_ID_PREFIX`] applied.
    pub machine_id: String,
    /// Directory owned exclusively by this machine.
    pub machine_folder: PathBuf,
    pub proxmox: ProxmoxConfig,
    pub cloud_init: CloudInitConfig,
    /// Terraform project location: an `http(s)://` URL or a local path.
    pub project: String,
}

impl ProviderConfig {
    /// Resolve the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingConfiguration`] naming the first
    /// required key that is unset or empty.
    pub fn from_env() -> Result<Self, ProviderError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve the configuration through an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::MissingConfiguration`] naming the first
    /// required key that resolves to `None` or an empty string.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ProviderError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| -> Result<String, ProviderError> {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ProviderError::MissingConfiguration {
                    key: key.to_string(),
                })
        };

        let machine_folder = PathBuf::from(required(MACHINE_FOLDER)?);
        let machine_id = format!("{MACHINE_ID_PREFIX}{}", required(MACHINE_ID)?);

        let proxmox = ProxmoxConfig {
            node_name: required(NODE_NAME)?,
            api_url: required(PROXMOX_API_URL)?,
            token_id: required(PROXMOX_API_TOKEN_ID)?,
            token_secret: required(PROXMOX_API_TOKEN_SECRET)?,
            vm_id: required(PROXMOX_VM_ID)?,
        };

        let cloud_init = CloudInitConfig {
            ssh_key: required(CLOUDINIT_SSH_KEY)?,
            username: required(CLOUDINIT_USERNAME)?,
            password: required(CLOUDINIT_PASSWORD)?,
            ip: required(CLOUDINIT_IP)?,
            gateway: required(CLOUDINIT_GATEWAY)?,
        };

        Ok(Self {
            machine_id,
            machine_folder,
            proxmox,
            cloud_init,
            project: required(TERRAFORM_PROJECT)?,
        })
    }

    /// Local working copy of the Terraform project.
    #[must_use]
    pub fn working_dir(&self) -> PathBuf {
        self.machine_folder.join(".terraform")
    }

    /// Terraform state file owned by this machine.
    #[must_use]
    pub fn state_file(&self) -> PathBuf {
        self.machine_folder.join("main.tfstate")
    }
}

// Secrets stay out of debug output and therefore out of logs.
impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("machine_id", &self.machine_id)
            .field("machine_folder", &self.machine_folder)
            .field("node_name", &self.proxmox.node_name)
            .field("api_url", &self.proxmox.api_url)
            .field("vm_id", &self.proxmox.vm_id)
            .field("username", &self.cloud_init.username)
            .field("project", &self.project)
            .finish_non_exhaustive()
    }
}
