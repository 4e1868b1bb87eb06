//! Project resolution: make sure the machine has its own copy of the
//! Terraform project before any tool invocation.
//!
//! Imports only from `crate::domain` and `crate::application::ports`.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::application::ports::ProjectFetcher;
use crate::domain::ProviderError;

/// Where the Terraform project comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProjectSource {
    /// Git repository reachable over HTTP(S).
    Remote(String),
    /// Directory on the local filesystem.
    Local(PathBuf),
}

impl ProjectSource {
    /// Classify a configured project string.
    #[must_use]
    pub fn parse(project: &str) -> Self {
        if project.starts_with("http://") || project.starts_with("https://") {
            Self::Remote(project.to_string())
        } else {
            Self::Local(PathBuf::from(project))
        }
    }
}

/// Ensure `working_dir` holds the project.
///
/// A no-op once the directory exists. Otherwise clones a remote source or
/// copies a local one. A failed fetch or copy may leave a partial directory
/// behind; it is not cleaned up.
///
/// # Errors
///
/// Returns `ProviderError::ProjectNotFound` when a local source does not
/// exist, or the fetcher's error when cloning or copying fails.
pub async fn ensure_project(
    project: &str,
    working_dir: &Path,
    fetcher: &impl ProjectFetcher,
) -> Result<()> {
    if tokio::fs::try_exists(working_dir).await.unwrap_or(false) {
        tracing::debug!(dir = %working_dir.display(), "terraform project already present");
        return Ok(());
    }

    match ProjectSource::parse(project) {
        ProjectSource::Remote(url) => {
            tracing::info!(%url, "cloning terraform project");
            fetcher
                .clone_repo(&url, working_dir)
                .await
                .with_context(|| format!("cloning terraform project {url}"))
        }
        ProjectSource::Local(src) => {
            if !tokio::fs::try_exists(&src).await.unwrap_or(false) {
                return Err(ProviderError::ProjectNotFound {
                    project: project.to_string(),
                }
                .into());
            }
            tracing::info!(src = %src.display(), "copying terraform project");
            fetcher
                .copy_tree(&src, working_dir)
                .await
                .with_context(|| format!("copying terraform project {}", src.display()))
        }
    }
}
