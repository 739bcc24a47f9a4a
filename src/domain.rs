//! Hostname validation for the domain field of an entry.
//!
//! One field may carry several whitespace-separated hostnames that share an
//! address, so every token is checked on its own and one bad token rejects
//! the whole field.

use crate::error::HostsError;

/// Shortest and longest hostname accepted.
pub const MIN_HOSTNAME_LEN: usize = 2;
pub const MAX_HOSTNAME_LEN: usize = 255;
/// Longest single label.
pub const MAX_LABEL_LEN: usize = 63;

/// True if every whitespace-separated token in `field` is a valid hostname.
pub fn is_valid_domains(field: &str) -> bool {
    let mut tokens = field.split_whitespace().peekable();
    tokens.peek().is_some() && tokens.all(is_valid_hostname)
}

/// Validate a domains field, naming the first offending token on failure.
pub fn validate_domains(field: &str) -> Result<(), HostsError> {
    if field.trim().is_empty() {
        return Err(HostsError::EmptyField("domain"));
    }
    match field.split_whitespace().find(|t| !is_valid_hostname(t)) {
        Some(bad) => Err(HostsError::InvalidDomain(bad.to_string())),
        None => Ok(()),
    }
}

/// Validate a single hostname.
pub fn is_valid_hostname(hostname: &str) -> bool {
    if !(MIN_HOSTNAME_LEN..=MAX_HOSTNAME_LEN).contains(&hostname.len()) {
        return false;
    }
    hostname.split('.').all(is_valid_label)
}

fn is_valid_label(label: &str) -> bool {
    let bytes = label.as_bytes();
    let (Some(first), Some(last)) = (bytes.first(), bytes.last()) else {
        return false;
    };
    label.len() <= MAX_LABEL_LEN
        && first.is_ascii_alphanumeric()
        && last.is_ascii_alphanumeric()
        && bytes.iter().all(|b| b.is_ascii_alphanumeric() || *b == b'-')
}

/// Collapse a domains field to single-space separated tokens.
pub fn normalize_domains(field: &str) -> String {
    field.split_whitespace().collect::<Vec<_>>().join(" ")
}
