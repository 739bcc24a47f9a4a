//! Platform specifics: default hosts location and the privilege check.

use std::path::PathBuf;

use crate::error::HostsError;

/// Default hosts file for this platform.
pub fn default_hosts_path() -> PathBuf {
    #[cfg(windows)]
    return PathBuf::from(r"C:\Windows\System32\drivers\etc\hosts");

    #[cfg(not(windows))]
    return PathBuf::from("/etc/hosts");
}

/// True if the process runs with an effective uid of 0.
#[cfg(unix)]
pub fn is_elevated() -> bool {
    // SAFETY: geteuid has no preconditions and cannot fail.
    unsafe { libc::geteuid() == 0 }
}

/// No portable check off unix; writes fail with PermissionDenied instead.
#[cfg(not(unix))]
pub fn is_elevated() -> bool {
    true
}

/// Fail unless the process may modify system files.
pub fn ensure_elevated(required: bool) -> Result<(), HostsError> {
    if required && !is_elevated() {
        return Err(HostsError::PermissionDenied(
            "this operation requires root privileges; re-run with sudo".to_string(),
        ));
    }
    Ok(())
}
