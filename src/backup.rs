//! Timestamped snapshots of the hosts file, taken before every mutation.
//!
//! Backups sit next to the hosts file as `<name>.bak-YYYYmmdd_HHMMSS`. Two
//! snapshots in the same second share a name and the later one wins. Old
//! backups are never pruned.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::debug;

use crate::error::HostsError;

const BACKUP_MARKER: &str = ".bak-";
const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Mode applied to backups: world-readable, owner-writable.
#[cfg(unix)]
const BACKUP_MODE: u32 = 0o644;

/// A snapshot that has been written to disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Backup {
    pub path: PathBuf,
}

/// Creates backups of one hosts file into one directory.
#[derive(Debug, Clone)]
pub struct BackupManager {
    source: PathBuf,
    dir: PathBuf,
}

impl BackupManager {
    pub fn new(source: impl Into<PathBuf>, dir: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            dir: dir.into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn prefix(&self) -> String {
        let name = self
            .source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "hosts".to_string());
        format!("{name}{BACKUP_MARKER}")
    }

    /// Path a snapshot taken now would be written to.
    pub fn next_path(&self) -> PathBuf {
        let stamp = Local::now().format(TIMESTAMP_FORMAT);
        self.dir.join(format!("{}{stamp}", self.prefix()))
    }

    /// Copy the source file byte-for-byte to a new timestamped backup.
    pub fn snapshot(&self) -> Result<Backup, HostsError> {
        let path = self.next_path();
        fs::create_dir_all(&self.dir).map_err(|e| HostsError::backup(&path, e))?;
        fs::copy(&self.source, &path).map_err(|e| HostsError::backup(&path, e))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&path, fs::Permissions::from_mode(BACKUP_MODE))
                .map_err(|e| HostsError::backup(&path, e))?;
        }
        debug!("backup written to {}", path.display());
        Ok(Backup { path })
    }

    /// Existing backups of the source file, oldest first.
    pub fn list_backups(&self) -> Result<Vec<PathBuf>, HostsError> {
        let entries = match fs::read_dir(&self.dir) {
            Ok(e) => e,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(HostsError::read(&self.dir, e)),
        };
        let prefix = self.prefix();
        let mut backups: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.is_file()
                    && p.file_name()
                        .map(|n| n.to_string_lossy().starts_with(&prefix))
                        .unwrap_or(false)
            })
            .collect();
        // Timestamps are zero-padded, so name order is creation order.
        backups.sort();
        Ok(backups)
    }
}
