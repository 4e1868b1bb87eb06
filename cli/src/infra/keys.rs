//! Machine key pair stored in the machine folder.
//!
//! The keys are created by whoever owns the machine folder; this module only
//! reads them.

use std::path::{Path, PathBuf};

use anyhow::Result;

use crate::application::ports::CredentialStore;
use crate::domain::ProviderError;

pub const PRIVATE_KEY_FILE: &str = "id_devpod_rsa";
pub const PUBLIC_KEY_FILE: &str = "id_devpod_rsa.pub";

/// Reads `id_devpod_rsa` / `id_devpod_rsa.pub` from a machine folder.
#[derive(Debug, Clone, Copy, Default)]
pub struct MachineKeys;

async fn read_non_empty(path: PathBuf) -> Result<Vec<u8>> {
    match tokio::fs::read(&path).await {
        Ok(bytes) if !bytes.iter().all(u8::is_ascii_whitespace) => Ok(bytes),
        Ok(_) => Err(ProviderError::CredentialNotFound { path }.into()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            Err(ProviderError::CredentialNotFound { path }.into())
        }
        Err(e) => Err(anyhow::Error::new(e).context(format!("reading {}", path.display()))),
    }
}

impl CredentialStore for MachineKeys {
    async fn public_key(&self, machine_folder: &Path) -> Result<String> {
        let bytes = read_non_empty(machine_folder.join(PUBLIC_KEY_FILE)).await?;
        Ok(String::from_utf8_lossy(&bytes).trim().to_string())
    }

    async fn private_key(&self, machine_folder: &Path) -> Result<PathBuf> {
        let path = machine_folder.join(PRIVATE_KEY_FILE);
        read_non_empty(path.clone()).await?;
        Ok(path)
    }
}
