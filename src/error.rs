//! Error kinds for hosts file operations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HostsError {
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    #[error("invalid domain: {0}")]
    InvalidDomain(String),

    #[error("{0} cannot be empty")]
    EmptyField(&'static str),

    #[error("entry already exists: {address} {domains}")]
    DuplicateEntry { address: String, domains: String },

    #[error("no entry matches {0}")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("could not back up {path}: {source}")]
    BackupFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not write {path}: {source}")]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("could not read {path}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("file not found: {0}")]
    FileNotFound(PathBuf),
}

impl HostsError {
    /// Classify a failed write; permission problems get their own kind.
    pub fn write(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            return HostsError::PermissionDenied(format!("cannot write {}", path.display()));
        }
        HostsError::WriteFailed { path, source }
    }

    /// Classify a failed backup step.
    pub fn backup(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::PermissionDenied {
            return HostsError::PermissionDenied(format!("cannot create backup {}", path.display()));
        }
        HostsError::BackupFailed { path, source }
    }

    /// Classify a failed read.
    pub fn read(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        match source.kind() {
            io::ErrorKind::PermissionDenied => {
                HostsError::PermissionDenied(format!("cannot read {}", path.display()))
            }
            io::ErrorKind::NotFound => HostsError::FileNotFound(path),
            _ => HostsError::ReadFailed { path, source },
        }
    }
}
