//! Settings loading and path resolution.
//!
//! Supports HOSTEDIT_CONFIG and HOSTEDIT_HOSTS_FILE env overrides for testing.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::backup::BackupManager;
use crate::hosts::HostsStore;

pub const CONFIG_ENV: &str = "HOSTEDIT_CONFIG";
pub const HOSTS_FILE_ENV: &str = "HOSTEDIT_HOSTS_FILE";
/// Set to any value to act as `require_root = false` for one invocation.
/// Only the up-front uid check is skipped; the OS still refuses writes the
/// caller has no permission for, and those surface as `PermissionDenied`.
pub const SKIP_ROOT_CHECK_ENV: &str = "HOSTEDIT_SKIP_ROOT_CHECK";

pub const DEFAULT_INSTALL_DIR: &str = "/usr/local/bin";

/// Optional config.toml contents. Every key may be omitted.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub hosts_file: Option<PathBuf>,
    #[serde(default)]
    pub backup_dir: Option<PathBuf>,
    #[serde(default)]
    pub install_dir: Option<PathBuf>,
    #[serde(default)]
    pub update_url: Option<String>,
    /// Check for root before mutating (default true). Useful off when the
    /// hosts file is writable by a non-root user. Also settable through
    /// HOSTEDIT_SKIP_ROOT_CHECK.
    #[serde(default)]
    pub require_root: Option<bool>,
}

impl Settings {
    /// Load settings; a missing file yields defaults.
    pub fn load(path: &Path) -> Result<Settings> {
        if !path.is_file() {
            return Ok(Settings::default());
        }
        let s = fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        let settings: Settings =
            toml::from_str(&s).with_context(|| format!("parse config: {}", path.display()))?;
        debug!("loaded settings from {}", path.display());
        Ok(settings)
    }
}

/// Resolved locations and policy for one invocation.
#[derive(Debug, Clone)]
pub struct HostsPaths {
    pub config_file: PathBuf,
    pub hosts_file: PathBuf,
    pub backup_dir: PathBuf,
    pub install_dir: PathBuf,
    pub update_url: Option<String>,
    pub require_root: bool,
}

impl HostsPaths {
    /// Apply settings on top of platform defaults.
    pub fn from_settings(config_file: PathBuf, settings: Settings) -> Self {
        let hosts_file = settings
            .hosts_file
            .unwrap_or_else(crate::platform::default_hosts_path);
        let backup_dir = settings
            .backup_dir
            .unwrap_or_else(|| parent_dir(&hosts_file));
        Self {
            config_file,
            hosts_file,
            backup_dir,
            install_dir: settings
                .install_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_INSTALL_DIR)),
            update_url: settings.update_url,
            require_root: settings.require_root.unwrap_or(true),
        }
    }

    /// Paths for testing: hosts file in `base`, backups beside it, no root check.
    pub fn for_test(base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        let settings = Settings {
            hosts_file: Some(base.join("hosts")),
            install_dir: Some(base.join("bin")),
            require_root: Some(false),
            ..Settings::default()
        };
        Self::from_settings(base.join("config.toml"), settings)
    }

    /// Get default paths (respects HOSTEDIT_CONFIG, HOSTEDIT_HOSTS_FILE, HOSTEDIT_SKIP_ROOT_CHECK).
    pub fn default_paths() -> Result<Self> {
        let config_file = config_path();
        let mut settings = Settings::load(&config_file)?;
        if let Some(hosts) = std::env::var_os(HOSTS_FILE_ENV) {
            settings.hosts_file = Some(PathBuf::from(hosts));
        }
        if std::env::var_os(SKIP_ROOT_CHECK_ENV).is_some() {
            settings.require_root = Some(false);
        }
        Ok(Self::from_settings(config_file, settings))
    }

    pub fn store(&self) -> HostsStore {
        HostsStore::new(
            &self.hosts_file,
            BackupManager::new(&self.hosts_file, &self.backup_dir),
        )
    }
}

fn parent_dir(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

/// Path to config.toml (respects HOSTEDIT_CONFIG).
pub fn config_path() -> PathBuf {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return PathBuf::from(path);
    }
    if let Some(dirs) = directories::ProjectDirs::from("org", "hostedit", "hostedit") {
        dirs.config_dir().join("config.toml")
    } else {
        PathBuf::from(".hostedit.toml")
    }
}
