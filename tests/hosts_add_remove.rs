//! Append and removal against a temp hosts file.

mod common;

use hostedit::error::HostsError;
use std::fs;

#[test]
fn add_then_remove_by_address_round_trip() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);

    let change = store.add("192.168.1.50", "nas.test").unwrap();
    assert_eq!(change.outcome.to_string(), "192.168.1.50 nas.test");

    let entries = store.list().unwrap();
    assert!(entries
        .iter()
        .any(|e| e.line.contains("192.168.1.50") && e.line.contains("nas.test")));

    store.remove_by_address("192.168.1.50").unwrap();
    let entries = store.list().unwrap();
    assert!(!entries.iter().any(|e| e.line.contains("nas.test")));
}

#[test]
fn add_appends_single_line_and_keeps_the_rest() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);

    store.add("fd00::10", "  db.test   cache.test ").unwrap();

    let content = common::read_hosts(dir.path());
    assert_eq!(content, format!("{}fd00::10 db.test cache.test\n", common::SAMPLE_HOSTS));
}

#[test]
fn add_to_file_without_trailing_newline() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), "127.0.0.1 localhost");

    store.add("10.0.0.9", "svc.test").unwrap();

    assert_eq!(
        common::read_hosts(dir.path()),
        "127.0.0.1 localhost\n10.0.0.9 svc.test\n"
    );
}

#[test]
fn duplicate_add_is_rejected() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), "");

    store.add("10.0.0.7", "dup.test").unwrap();
    let err = store.add("10.0.0.7", "dup.test").unwrap_err();
    assert!(matches!(err, HostsError::DuplicateEntry { .. }));

    let content = common::read_hosts(dir.path());
    assert_eq!(content.matches("dup.test").count(), 1);
}

#[test]
fn duplicate_check_matches_substrings() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), "10.0.0.5\tmyapp.test\n");

    let err = store.add("10.0.0.5", "app.test").unwrap_err();
    assert!(matches!(err, HostsError::DuplicateEntry { .. }));

    // Same domain on a different address is not a duplicate.
    store.add("10.0.0.6", "app.test").unwrap();
}

#[test]
fn duplicate_check_anchors_address_at_line_start() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), "10.0.0.50 api.test\n");

    store.add("10.0.0.5", "api.test").unwrap();
}

#[test]
fn invalid_input_leaves_file_untouched() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);

    assert!(matches!(
        store.add("001.002.003.004", "ok.test"),
        Err(HostsError::InvalidAddress(_))
    ));
    assert!(matches!(
        store.add("10.0.0.1", "test@#$.local"),
        Err(HostsError::InvalidDomain(_))
    ));
    assert!(matches!(store.add("10.0.0.1", ""), Err(HostsError::EmptyField(_))));

    assert_eq!(common::read_hosts(dir.path()), common::SAMPLE_HOSTS);
    assert!(store.backups().list_backups().unwrap().is_empty());
}

#[test]
fn remove_by_position_removes_exactly_one() {
    let dir = common::temp_dir();
    let content = "10.0.0.1 a.test\n10.0.0.1 a.test\n10.0.0.2 b.test\n";
    let store = common::store_with(dir.path(), content);

    let last = store.list().unwrap().last().unwrap().position;
    let change = store.remove_by_position(last).unwrap();
    assert_eq!(change.outcome, vec!["10.0.0.2 b.test"]);

    store.remove_by_position(1).unwrap();
    assert_eq!(common::read_hosts(dir.path()), "10.0.0.1 a.test\n");
}

#[test]
fn remove_by_address_matches_first_field_only() {
    let dir = common::temp_dir();
    let content = "10.0.0.1 a.test\n10.0.0.10 b.test\n10.0.0.1\tc.test d.test\n# 10.0.0.1 old.test\n";
    let store = common::store_with(dir.path(), content);

    let change = store.remove_by_address("10.0.0.1").unwrap();
    assert_eq!(change.outcome.len(), 2);
    assert_eq!(
        common::read_hosts(dir.path()),
        "10.0.0.10 b.test\n# 10.0.0.1 old.test\n"
    );
}

#[test]
fn remove_by_address_handles_ipv6_literals() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), "::1 localhost\nfe80::1 link.test\n");

    store.remove_by_address("fe80::1").unwrap();
    assert_eq!(common::read_hosts(dir.path()), "::1 localhost\n");
}

#[test]
fn remove_by_domain_is_substring_based() {
    let dir = common::temp_dir();
    let content = "10.0.0.1 app.test\n10.0.0.2 myapp.test\n10.0.0.3 other.test\n";
    let store = common::store_with(dir.path(), content);

    let change = store.remove_by_domain("app.test").unwrap();
    assert_eq!(change.outcome.len(), 2);
    assert_eq!(common::read_hosts(dir.path()), "10.0.0.3 other.test\n");
}

#[test]
fn remove_preserves_comments_and_blank_lines() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);

    store.remove_by_domain("web.test").unwrap();

    let content = common::read_hosts(dir.path());
    assert!(content.starts_with("# static table lookup for hostnames\n"));
    assert!(content.contains("\n\n# dev services\n"));
    assert!(!content.contains("api.test"));
}

#[test]
fn remove_without_match_is_not_found() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);

    assert!(matches!(store.remove_by_position(9), Err(HostsError::NotFound(_))));
    assert!(matches!(store.remove_by_address("10.9.9.9"), Err(HostsError::NotFound(_))));
    assert!(matches!(store.remove_by_domain("ghost.test"), Err(HostsError::NotFound(_))));
    assert_eq!(fs::read_to_string(store.path()).unwrap(), common::SAMPLE_HOSTS);
}

#[cfg(unix)]
#[test]
fn rewrite_keeps_file_permissions() {
    use std::os::unix::fs::PermissionsExt;

    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);
    fs::set_permissions(store.path(), fs::Permissions::from_mode(0o640)).unwrap();

    store.add("10.0.0.8", "perm.test").unwrap();

    let mode = fs::metadata(store.path()).unwrap().permissions().mode();
    assert_eq!(mode & 0o777, 0o640);
}

#[test]
fn exists_reads_the_live_file() {
    let dir = common::temp_dir();
    let store = common::store_with(dir.path(), common::SAMPLE_HOSTS);

    assert!(store.exists("10.0.0.5", "web.test").unwrap());
    assert!(store.exists("::1", "ip6-localhost").unwrap());
    assert!(!store.exists("10.0.0.5", "db.test").unwrap());

    fs::write(store.path(), "10.0.0.5 db.test\n").unwrap();
    assert!(store.exists("10.0.0.5", "db.test").unwrap());
}

#[cfg(unix)]
#[test]
fn symlinked_hosts_file_stays_a_link() {
    let dir = common::temp_dir();
    let real = dir.path().join("hosts.real");
    fs::write(&real, "127.0.0.1 localhost\n").unwrap();
    let link = dir.path().join("hosts");
    std::os::unix::fs::symlink(&real, &link).unwrap();
    let store = hostedit::config::HostsPaths::for_test(dir.path()).store();

    store.add("10.0.0.11", "linked.test").unwrap();

    assert!(fs::symlink_metadata(&link).unwrap().file_type().is_symlink());
    assert_eq!(
        fs::read_to_string(&real).unwrap(),
        "127.0.0.1 localhost\n10.0.0.11 linked.test\n"
    );
}
