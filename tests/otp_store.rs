use std::{thread, time::Duration};

use campus_crave_api::otp::OtpStore;

#[test]
fn issued_code_verifies_once() {
    let store = OtpStore::new(Duration::from_secs(60));
    let code = store.issue("9876543210");
    assert_eq!(code.len(), 4);

    assert!(store.verify("9876543210", &code));
    assert!(!store.verify("9876543210", &code), "code must be single use");
    assert!(store.is_empty());
}

#[test]
fn wrong_code_keeps_the_stored_one() {
    let store = OtpStore::new(Duration::from_secs(60));
    store.insert("111", "1234".into());

    assert!(!store.verify("111", "0000"));
    assert_eq!(store.len(), 1);
    assert!(store.verify("111", "1234"));
}

#[test]
fn unknown_phone_fails() {
    let store = OtpStore::new(Duration::from_secs(60));
    assert!(!store.verify("222", "1234"));
}

#[test]
fn reissue_replaces_previous_code() {
    let store = OtpStore::new(Duration::from_secs(60));
    store.insert("333", "1111".into());
    store.insert("333", "2222".into());

    assert_eq!(store.len(), 1);
    assert!(!store.verify("333", "1111"));
    assert!(store.verify("333", "2222"));
}

#[test]
fn expired_codes_are_rejected_and_dropped() {
    let store = OtpStore::new(Duration::from_millis(20));
    store.insert("444", "1234".into());
    thread::sleep(Duration::from_millis(40));

    assert!(!store.verify("444", "1234"));
    assert!(store.is_empty());
}

#[test]
fn purge_removes_only_expired_entries() {
    let store = OtpStore::new(Duration::from_millis(50));
    store.insert("old", "1234".into());
    thread::sleep(Duration::from_millis(80));
    store.insert("new", "5678".into());

    assert_eq!(store.purge_expired(), 1);
    assert_eq!(store.len(), 1);
    assert!(store.verify("new", "5678"));
}

#[test]
fn clones_share_codes() {
    let store = OtpStore::new(Duration::from_secs(60));
    let handle = store.clone();
    store.insert("555", "9999".into());
    assert!(handle.verify("555", "9999"));
}
