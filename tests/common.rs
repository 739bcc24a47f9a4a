//! Shared test helpers.
#![allow(dead_code)]

use assert_cmd::Command;
use hostedit::config::{HostsPaths, CONFIG_ENV, HOSTS_FILE_ENV, SKIP_ROOT_CHECK_ENV};
use hostedit::hosts::HostsStore;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

pub const SAMPLE_HOSTS: &str = "\
# static table lookup for hostnames
127.0.0.1\tlocalhost
::1\tlocalhost ip6-localhost

# dev services
10.0.0.5\tapi.test web.test
";

/// Create a temp directory holding the hosts file and its backups.
/// Uses current dir (workspace) so sandbox allows full access.
pub fn temp_dir() -> TempDir {
    tempfile::Builder::new()
        .prefix("hostedit_test_")
        .tempdir_in(std::env::current_dir().unwrap_or_else(|_| Path::new(".").into()))
        .expect("temp dir")
}

/// Write `content` as the hosts file in `dir`.
pub fn write_hosts(dir: &Path, content: &str) -> PathBuf {
    let path = dir.join("hosts");
    std::fs::write(&path, content).unwrap();
    path
}

pub fn read_hosts(dir: &Path) -> String {
    std::fs::read_to_string(dir.join("hosts")).unwrap()
}

/// Store over a fresh hosts file in `dir`.
pub fn store_with(dir: &Path, content: &str) -> HostsStore {
    write_hosts(dir, content);
    HostsPaths::for_test(dir).store()
}

/// The binary, pointed at `dir/hosts` with no user config and no root check.
pub fn hostedit(dir: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hostedit").unwrap();
    cmd.current_dir(dir)
        .env(HOSTS_FILE_ENV, dir.join("hosts"))
        .env(CONFIG_ENV, dir.join("config.toml"))
        .env(SKIP_ROOT_CHECK_ENV, "1");
    cmd
}
