//! Infrastructure implementation of the `ProjectFetcher` port.

use std::path::Path;

use anyhow::{Context, Result};
use walkdir::WalkDir;

use crate::application::ports::{CommandRunner, ProjectFetcher};
use crate::infra::command_runner::TokioCommandRunner;

/// Clones with `git`, copies with the filesystem.
pub struct GitProjectFetcher<R: CommandRunner> {
    runner: R,
}

impl<R: CommandRunner> GitProjectFetcher<R> {
    pub fn new(runner: R) -> Self {
        Self { runner }
    }
}

impl GitProjectFetcher<TokioCommandRunner> {
    /// Convenience constructor for production use.
    #[must_use]
    pub fn default_runner() -> Self {
        Self::new(TokioCommandRunner)
    }
}

impl<R: CommandRunner> ProjectFetcher for GitProjectFetcher<R> {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        let dest_str = dest.to_string_lossy();
        let output = self
            .runner
            .run("git", &["clone", url, &dest_str])
            .await
            .context("git clone")?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("git clone {url} failed: {}", stderr.trim());
        }
        Ok(())
    }

    async fn copy_tree(&self, src: &Path, dest: &Path) -> Result<()> {
        let src = src.to_path_buf();
        let dest = dest.to_path_buf();
        tokio::task::spawn_blocking(move || copy_tree_blocking(&src, &dest))
            .await
            .context("spawn_blocking for copy_tree")?
    }
}

/// Recursively copy `src` into `dest`, recreating symlinks rather than
/// following them.
///
/// # Errors
///
/// Returns an error on the first entry that cannot be read or written.
pub fn copy_tree_blocking(src: &Path, dest: &Path) -> Result<()> {
    std::fs::create_dir_all(dest).with_context(|| format!("creating {}", dest.display()))?;

    for entry in WalkDir::new(src).min_depth(1) {
        let entry = entry.with_context(|| format!("walking {}", src.display()))?;
        let relative = entry
            .path()
            .strip_prefix(src)
            .context("walkdir entry outside source")?;
        let target = dest.join(relative);
        let file_type = entry.file_type();

        if file_type.is_dir() {
            std::fs::create_dir_all(&target)
                .with_context(|| format!("creating {}", target.display()))?;
        } else if file_type.is_symlink() {
            copy_symlink(entry.path(), &target)?;
        } else {
            std::fs::copy(entry.path(), &target).with_context(|| {
                format!("copying {} to {}", entry.path().display(), target.display())
            })?;
        }
    }
    Ok(())
}

#[cfg(unix)]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    let points_to =
        std::fs::read_link(link).with_context(|| format!("reading link {}", link.display()))?;
    std::os::unix::fs::symlink(&points_to, target)
        .with_context(|| format!("creating link {}", target.display()))
}

#[cfg(not(unix))]
fn copy_symlink(link: &Path, target: &Path) -> Result<()> {
    std::fs::copy(link, target)
        .map(drop)
        .with_context(|| format!("copying {} to {}", link.display(), target.display()))
}
