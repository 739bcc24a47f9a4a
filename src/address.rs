//! IPv4 / IPv6 literal validation.
//!
//! Purely lexical: no loopback, multicast or reachability checks. IPv4 octets
//! with leading zeros are rejected so `010.0.0.1` is never read as octal.

use crate::error::HostsError;

/// True if `address` is a valid IPv4 or IPv6 literal.
///
/// A colon anywhere selects the IPv6 rules.
pub fn is_valid_address(address: &str) -> bool {
    if address.contains(':') {
        is_valid_ipv6(address)
    } else {
        is_valid_ipv4(address)
    }
}

/// Validate address, returning `InvalidAddress` (or `EmptyField`) on failure.
pub fn validate_address(address: &str) -> Result<(), HostsError> {
    if address.trim().is_empty() {
        return Err(HostsError::EmptyField("address"));
    }
    if !is_valid_address(address) {
        return Err(HostsError::InvalidAddress(address.to_string()));
    }
    Ok(())
}

/// Four dot-separated decimal octets, 0-255, no leading zeros.
pub fn is_valid_ipv4(address: &str) -> bool {
    let octets: Vec<&str> = address.split('.').collect();
    octets.len() == 4 && octets.iter().all(|o| is_valid_octet(o))
}

fn is_valid_octet(octet: &str) -> bool {
    if octet.is_empty() || octet.len() > 3 || !octet.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    if octet.len() > 1 && octet.starts_with('0') {
        return false;
    }
    octet.parse::<u16>().map(|v| v <= 255).unwrap_or(false)
}

/// Full eight-group form, or a single `::` compression anywhere (including bare `::`).
pub fn is_valid_ipv6(address: &str) -> bool {
    match address.matches("::").count() {
        0 => {
            let groups: Vec<&str> = address.split(':').collect();
            groups.len() == 8 && groups.iter().all(|g| is_valid_group(g))
        }
        1 => {
            let Some((head, tail)) = address.split_once("::") else {
                return false;
            };
            let (Some(head), Some(tail)) = (groups_of(head), groups_of(tail)) else {
                return false;
            };
            // `::` stands in for at least one zero group.
            head + tail <= 7
        }
        _ => false,
    }
}

/// Count the groups on one side of a `::`, or None if any group is malformed.
fn groups_of(side: &str) -> Option<usize> {
    if side.is_empty() {
        return Some(0);
    }
    let groups: Vec<&str> = side.split(':').collect();
    if groups.iter().all(|g| is_valid_group(g)) {
        Some(groups.len())
    } else {
        None
    }
}

fn is_valid_group(group: &str) -> bool {
    (1..=4).contains(&group.len()) && group.bytes().all(|b| b.is_ascii_hexdigit())
}
