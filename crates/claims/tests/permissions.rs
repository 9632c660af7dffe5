//! Permission translator tests.

use claims::{Permission, Permissions, ResponsePermission};
use serde_json::json;

#[test]
fn full_document_translates() {
    let doc = json!({
        "pub": { "allow": ["$JS.API.>"], "deny": ["SECRET.>"] },
        "sub": { "allow": ["_INBOX.>", "TEST.>"] },
        "resp": { "max": 1 }
    });
    let set = Permissions::from_document(&doc);
    assert_eq!(set.publish.allow, vec!["$JS.API.>"]);
    assert_eq!(set.publish.deny, vec!["SECRET.>"]);
    assert_eq!(set.subscribe.allow, vec!["_INBOX.>", "TEST.>"]);
    assert!(set.subscribe.deny.is_empty());
    assert_eq!(set.resp, Some(ResponsePermission { max_msgs: 1 }));
}

#[test]
fn empty_document_is_default_deny() {
    let set = Permissions::from_document(&json!({}));
    assert!(set.is_empty());
    assert_eq!(set, Permissions::default());
}

#[test]
fn non_string_subjects_are_dropped() {
    let doc = json!({
        "pub": { "allow": ["ORDERS.>", 42, null, {"nested": true}, "EVENTS.>"] }
    });
    let set = Permissions::from_document(&doc);
    assert_eq!(set.publish.allow, vec!["ORDERS.>", "EVENTS.>"]);
}

#[test]
fn reply_bound_reads_both_spellings() {
    let bearer = Permissions::from_document(&json!({ "resp": { "max": 5 } }));
    let credential = Permissions::from_document(&json!({ "resp": { "maxMsgs": 5 } }));
    assert_eq!(bearer.resp, Some(ResponsePermission { max_msgs: 5 }));
    assert_eq!(bearer, credential);
}

#[test]
fn negative_reply_bound_drops_the_slot() {
    let set = Permissions::from_document(&json!({
        "sub": { "allow": ["_INBOX.>"] },
        "resp": { "max": -1 }
    }));
    assert!(set.resp.is_none());
    assert_eq!(set.subscribe.allow, vec!["_INBOX.>"]);
}

#[test]
fn non_integer_reply_bound_drops_the_slot() {
    let set = Permissions::from_document(&json!({ "resp": { "max": 1.5 } }));
    assert!(set.resp.is_none());
    let set = Permissions::from_document(&json!({ "resp": { "max": "1" } }));
    assert!(set.resp.is_none());
}

#[test]
fn malformed_slots_do_not_poison_the_rest() {
    let doc = json!({
        "pub": "not-an-object",
        "sub": { "allow": ["_INBOX.>"] },
        "resp": 7
    });
    let set = Permissions::from_document(&doc);
    assert!(set.publish.is_empty());
    assert_eq!(set.subscribe.allow, vec!["_INBOX.>"]);
    assert!(set.resp.is_none());
}

#[test]
fn translation_is_idempotent() {
    let doc = json!({
        "pub": { "allow": ["$JS.API.>"], "deny": [13] },
        "sub": { "allow": ["_INBOX.>"] },
        "resp": { "max": 1 }
    });
    let once = Permissions::from_document(&doc);
    let serialized = serde_json::to_value(&once).unwrap();
    let twice = Permissions::from_document(&serialized);
    assert_eq!(once, twice);
}

#[test]
fn empty_slots_are_omitted_from_serialization() {
    let set = Permissions {
        subscribe: Permission {
            allow: vec!["_INBOX.>".to_string()],
            deny: vec![],
        },
        ..Permissions::default()
    };
    let value = serde_json::to_value(&set).unwrap();
    let object = value.as_object().unwrap();
    assert!(!object.contains_key("pub"));
    assert!(!object.contains_key("resp"));
    assert!(object["sub"].as_object().unwrap().contains_key("allow"));
    assert!(!object["sub"].as_object().unwrap().contains_key("deny"));
}

#[test]
fn default_set_serializes_to_an_empty_object() {
    let value = serde_json::to_value(Permissions::default()).unwrap();
    assert_eq!(value, json!({}));
}

#[test]
fn store_shape_round_trips() {
    let set: Permissions = serde_json::from_value(json!({
        "pub": { "allow": ["$JS.API.STREAM.LIST"] },
        "sub": { "allow": ["_INBOX.>", "TEST.test"] },
        "resp": { "maxMsgs": 1 }
    }))
    .unwrap();
    assert_eq!(set.resp, Some(ResponsePermission { max_msgs: 1 }));
    let value = serde_json::to_value(&set).unwrap();
    assert_eq!(value["resp"]["maxMsgs"], 1);
}
