//! Terraform release download, verification, and installation.

use std::io::{Cursor, Read};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use sha2::{Digest, Sha256};

use crate::application::ports::ToolInstaller;
use crate::domain::ProviderError;

/// HashiCorp release index.
pub const RELEASES_URL: &str = "https://releases.hashicorp.com/terraform";

/// Installs Terraform from the official HashiCorp releases.
#[derive(Debug, Clone)]
pub struct ReleaseInstaller {
    base_url: String,
}

impl Default for ReleaseInstaller {
    fn default() -> Self {
        Self {
            base_url: RELEASES_URL.to_string(),
        }
    }
}

impl ToolInstaller for ReleaseInstaller {
    async fn install(&self, version: &semver::Version, binary: &Path) -> Result<()> {
        let base_url = self.base_url.clone();
        let version = version.clone();
        let binary = binary.to_path_buf();
        tokio::task::spawn_blocking(move || install_blocking(&base_url, &version, &binary))
            .await
            .context("spawn_blocking for terraform install")?
            .map_err(|e| {
                ProviderError::InstallFailed {
                    reason: format!("{e:#}"),
                }
                .into()
            })
    }
}

fn install_blocking(base_url: &str, version: &semver::Version, binary: &Path) -> Result<()> {
    let dest_dir = binary
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    std::fs::create_dir_all(&dest_dir)
        .with_context(|| format!("creating {}", dest_dir.display()))?;

    let archive_name = archive_name(version, std::env::consts::OS, std::env::consts::ARCH)?;
    let archive_url = format!("{base_url}/{version}/{archive_name}");
    let sums_url = format!("{base_url}/{version}/terraform_{version}_SHA256SUMS");

    tracing::info!(url = %archive_url, "downloading terraform");
    let archive = download(&archive_url)?;
    let sums = String::from_utf8(download(&sums_url)?).context("SHA256SUMS is not UTF-8")?;
    let expected = expected_checksum(&sums, &archive_name)
        .with_context(|| format!("{archive_name} not listed in SHA256SUMS"))?;
    verify_checksum(&archive, expected)?;

    extract_binary(&archive, binary)?;
    tracing::info!(binary = %binary.display(), "terraform installed");
    Ok(())
}

/// Release archive file name for a platform, in HashiCorp's naming.
///
/// # Errors
///
/// Returns an error for operating systems or architectures without a release.
pub fn archive_name(version: &semver::Version, os: &str, arch: &str) -> Result<String> {
    let os = match os {
        "linux" => "linux",
        "macos" => "darwin",
        "windows" => "windows",
        "freebsd" => "freebsd",
        "openbsd" => "openbsd",
        "solaris" => "solaris",
        other => anyhow::bail!("unsupported operating system: {other}"),
    };
    let arch = match arch {
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "x86" => "386",
        "arm" => "arm",
        other => anyhow::bail!("unsupported architecture: {other}"),
    };
    Ok(format!("terraform_{version}_{os}_{arch}.zip"))
}

fn download(url: &str) -> Result<Vec<u8>> {
    let response = match ureq::get(url).set("User-Agent", "proxmox-provider").call() {
        Ok(resp) => resp,
        Err(ureq::Error::Status(code, _)) => anyhow::bail!("GET {url}: HTTP {code}"),
        Err(e) => return Err(e).with_context(|| format!("GET {url}")),
    };
    let mut body = Vec::new();
    response
        .into_reader()
        .read_to_end(&mut body)
        .with_context(|| format!("reading {url}"))?;
    Ok(body)
}

/// Find the checksum for `file_name` in a `SHA256SUMS` listing.
#[must_use]
pub fn expected_checksum<'a>(sums: &'a str, file_name: &str) -> Option<&'a str> {
    sums.lines().find_map(|line| {
        let mut parts = line.split_whitespace();
        let hash = parts.next()?;
        (parts.next()? == file_name).then_some(hash)
    })
}

/// Compare the SHA-256 of `data` against a hex digest.
///
/// # Errors
///
/// Returns an error on mismatch.
pub fn verify_checksum(data: &[u8], expected: &str) -> Result<()> {
    let actual = hex_encode(&Sha256::digest(data));
    anyhow::ensure!(
        actual.eq_ignore_ascii_case(expected),
        "checksum mismatch: expected {expected}, got {actual}"
    );
    Ok(())
}

fn hex_encode(bytes: &[u8]) -> String {
    const HEX: &[u8; 16] = b"0123456789abcdef";
    let mut out = String::with_capacity(bytes.len() * 2);
    for &b in bytes {
        out.push(char::from(HEX[(b >> 4) as usize]));
        out.push(char::from(HEX[(b & 0xf) as usize]));
    }
    out
}

/// Write the archive's Terraform executable to `binary` and mark it executable.
///
/// # Errors
///
/// Returns an error if the archive is unreadable or has no Terraform entry.
pub fn extract_binary(archive: &[u8], binary: &Path) -> Result<()> {
    let mut zip = zip::ZipArchive::new(Cursor::new(archive)).context("opening release archive")?;
    let entry_name = if cfg!(windows) {
        "terraform.exe"
    } else {
        "terraform"
    };
    let mut entry = zip
        .by_name(entry_name)
        .with_context(|| format!("{entry_name} missing from release archive"))?;

    let mut out = std::fs::File::create(binary)
        .with_context(|| format!("creating {}", binary.display()))?;
    std::io::copy(&mut entry, &mut out).with_context(|| format!("writing {}", binary.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(binary, std::fs::Permissions::from_mode(0o755))
            .with_context(|| format!("setting permissions on {}", binary.display()))?;
    }
    Ok(())
}
