use statwox_submission::ip::{UNKNOWN_IP, client_ip, ip_allowed, matches_entry};

#[test]
fn forwarded_for_takes_precedence() {
    assert_eq!(client_ip(Some("203.0.113.7, 10.0.0.1"), Some("10.9.9.9")), "203.0.113.7");
    assert_eq!(client_ip(None, Some("10.9.9.9")), "10.9.9.9");
    assert_eq!(client_ip(Some(""), Some("10.9.9.9")), "10.9.9.9");
    assert_eq!(client_ip(None, None), UNKNOWN_IP);
}

#[test]
fn exact_and_cidr_entries() {
    assert!(matches_entry("192.168.1.10", "192.168.1.10"));
    assert!(!matches_entry("192.168.1.10", "192.168.1.11"));

    assert!(matches_entry("10.0.0.0/24", "10.0.0.5"));
    assert!(!matches_entry("10.0.0.0/24", "10.0.1.5"));
    assert!(matches_entry("10.0.0.0/8", "10.200.1.5"));
    assert!(matches_entry("0.0.0.0/0", "8.8.8.8"));
    assert!(matches_entry("10.0.0.7/32", "10.0.0.7"));
    assert!(!matches_entry("10.0.0.7/32", "10.0.0.8"));
}

#[test]
fn malformed_entries_and_addresses_never_match() {
    assert!(!matches_entry("10.0.0.0/33", "10.0.0.1"));
    assert!(!matches_entry("banana/8", "10.0.0.1"));
    assert!(!matches_entry("10.0.0.0/24", UNKNOWN_IP));
}

#[test]
fn empty_allowlist_allows_everyone() {
    assert!(ip_allowed(&[], "anything"));
    let list = vec!["172.16.0.0/12".to_string(), "127.0.0.1".to_string()];
    assert!(ip_allowed(&list, "127.0.0.1"));
    assert!(ip_allowed(&list, "172.20.3.4"));
    assert!(!ip_allowed(&list, "192.168.0.1"));
}
