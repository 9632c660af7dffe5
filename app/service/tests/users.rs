//! Credential store tests.

use callout_service::UserStore;
use std::io::Write;

fn write_store(json: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("users.json")).unwrap();
    file.write_all(json.as_bytes()).unwrap();
    dir
}

#[test]
fn load_and_lookup() {
    let dir = write_store(
        r#"{
            "alice": {
                "Pass": "alice",
                "Account": "DEVELOPMENT",
                "Permissions": {
                    "sub": { "allow": ["_INBOX.>", "TEST.test"] },
                    "pub": { "allow": ["$JS.API.STREAM.LIST"] },
                    "resp": { "maxMsgs": 1 }
                }
            },
            "bob": { "Pass": "hunter2", "Account": "TEST" }
        }"#,
    );
    let store = UserStore::load(&dir.path().join("users.json")).unwrap();
    assert_eq!(store.len(), 2);

    let alice = store.get("alice").unwrap();
    assert_eq!(alice.password, "alice");
    assert_eq!(alice.account, "DEVELOPMENT");
    assert_eq!(alice.permissions.resp.unwrap().max_msgs, 1);
    assert_eq!(alice.permissions.subscribe.allow, vec!["_INBOX.>", "TEST.test"]);

    // Permissions are optional in the file and default to deny-all.
    let bob = store.get("bob").unwrap();
    assert!(bob.permissions.is_empty());
}

#[test]
fn lookup_is_case_sensitive() {
    let dir = write_store(r#"{ "alice": { "Pass": "x", "Account": "A" } }"#);
    let store = UserStore::load(&dir.path().join("users.json")).unwrap();
    assert!(store.get("alice").is_some());
    assert!(store.get("Alice").is_none());
    assert!(store.get("ALICE").is_none());
}

#[test]
fn missing_file_fails() {
    let dir = tempfile::tempdir().unwrap();
    assert!(UserStore::load(&dir.path().join("nope.json")).is_err());
}

#[test]
fn malformed_file_fails() {
    let dir = write_store("not json at all");
    assert!(UserStore::load(&dir.path().join("users.json")).is_err());
}

#[test]
fn fallback_store_has_the_single_fake_principal() {
    let store = UserStore::fallback();
    assert_eq!(store.len(), 1);
    let fake = store.get("fake").unwrap();
    assert_eq!(fake.password, "fake");
    assert_eq!(fake.account, "Fake");
    assert!(fake.permissions.is_empty());
    assert!(store.get("alice").is_none());
}
