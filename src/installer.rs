//! Install, update and uninstall of the hostedit executable.
//!
//! The binary is placed in the install dir as `hostedit`, with `hostadd` and
//! `hostrm` links that select the add/rm shorthands by invocation name.
//! Every replacement goes through a temp file in the install dir, so a failed
//! copy or download never leaves a partial executable behind.

use anyhow::{Context, Result};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::{debug, info};

use crate::config::HostsPaths;

pub const BIN_NAME: &str = "hostedit";
pub const ADD_ALIAS: &str = "hostadd";
pub const RM_ALIAS: &str = "hostrm";

const DOWNLOAD_TIMEOUT_SECS: u64 = 30;

#[cfg(unix)]
const EXEC_MODE: u32 = 0o755;

/// Installed executable path.
pub fn installed_path(paths: &HostsPaths) -> PathBuf {
    paths.install_dir.join(BIN_NAME)
}

/// Write `bytes` to `dest` via a temp file in the same directory.
fn replace_executable(dest: &Path, bytes: &[u8]) -> Result<()> {
    let dir = dest
        .parent()
        .ok_or_else(|| anyhow::anyhow!("invalid install path: {}", dest.display()))?;
    fs::create_dir_all(dir).with_context(|| format!("create {}", dir.display()))?;
    let mut tmp = NamedTempFile::new_in(dir)
        .with_context(|| format!("create temp file in {}", dir.display()))?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(tmp.path(), fs::Permissions::from_mode(EXEC_MODE))
            .context("set executable permissions")?;
    }
    tmp.persist(dest)
        .with_context(|| format!("replace {}", dest.display()))?;
    Ok(())
}

#[cfg(unix)]
fn link_alias(paths: &HostsPaths, alias: &str) -> Result<()> {
    let link = paths.install_dir.join(alias);
    if link.symlink_metadata().is_ok() {
        fs::remove_file(&link).with_context(|| format!("remove {}", link.display()))?;
    }
    std::os::unix::fs::symlink(BIN_NAME, &link)
        .with_context(|| format!("link {}", link.display()))?;
    debug!("linked {} -> {BIN_NAME}", link.display());
    Ok(())
}

#[cfg(not(unix))]
fn link_alias(paths: &HostsPaths, alias: &str) -> Result<()> {
    let link = paths.install_dir.join(alias);
    fs::copy(installed_path(paths), &link).with_context(|| format!("copy {}", link.display()))?;
    Ok(())
}

/// Copy the running executable into the install dir and create alias links.
pub fn install(paths: &HostsPaths) -> Result<PathBuf> {
    let current = std::env::current_exe().context("locate running executable")?;
    let dest = installed_path(paths);
    let bytes = fs::read(&current).with_context(|| format!("read {}", current.display()))?;
    info!("installing {} to {}", current.display(), dest.display());
    replace_executable(&dest, &bytes)?;
    link_alias(paths, ADD_ALIAS)?;
    link_alias(paths, RM_ALIAS)?;
    Ok(dest)
}

/// Remove the installed executable and its aliases.
pub fn uninstall(paths: &HostsPaths) -> Result<Vec<PathBuf>> {
    let mut removed = Vec::new();
    for name in [ADD_ALIAS, RM_ALIAS, BIN_NAME] {
        let path = paths.install_dir.join(name);
        if path.symlink_metadata().is_ok() {
            fs::remove_file(&path).with_context(|| format!("remove {}", path.display()))?;
            removed.push(path);
        }
    }
    if removed.is_empty() {
        anyhow::bail!("hostedit is not installed in {}", paths.install_dir.display());
    }
    Ok(removed)
}

async fn download(url: &str) -> Result<Vec<u8>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(DOWNLOAD_TIMEOUT_SECS))
        .user_agent(format!("hostedit/{}", env!("CARGO_PKG_VERSION")))
        .build()
        .context("build HTTP client")?;
    let response = client
        .get(url)
        .send()
        .await
        .with_context(|| format!("fetch {url}"))?
        .error_for_status()
        .with_context(|| format!("fetch {url}"))?;
    let bytes = response.bytes().await.context("read update body")?;
    Ok(bytes.to_vec())
}

/// Download a new executable from `update_url` and replace the installed one.
pub fn update(paths: &HostsPaths) -> Result<PathBuf> {
    let url = paths
        .update_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("no update_url configured in {}", paths.config_file.display()))?;
    let rt = tokio::runtime::Runtime::new()?;
    let bytes = rt.block_on(download(url))?;
    if bytes.is_empty() {
        anyhow::bail!("update from {url} returned an empty body");
    }
    debug!("downloaded {} bytes from {url}", bytes.len());
    let dest = installed_path(paths);
    replace_executable(&dest, &bytes)?;
    Ok(dest)
}
