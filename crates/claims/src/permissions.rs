//! Subject permissions: allow/deny lists plus an optional reply bound.
//!
//! [`Permissions::from_document`] is the single boundary where a free-form
//! permissions document (as carried by bearer tokens) becomes the typed
//! shape embedded in credentials. Nothing outside this module knows the
//! bearer spelling of the reply bound.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Allow and deny lists over subject patterns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permission {
    /// Subject patterns the client may use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allow: Vec<String>,

    /// Subject patterns the client may not use.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub deny: Vec<String>,
}

impl Permission {
    /// Returns `true` if the allow and deny lists are both empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allow.is_empty() && self.deny.is_empty()
    }
}

/// Bound on the number of replies a responder may emit per request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsePermission {
    /// Maximum reply count.
    #[serde(rename = "maxMsgs")]
    pub max_msgs: i64,
}

/// Permission set carried by a user credential. Empty slots are omitted
/// from the serialized form, so the default value is the minimal
/// deny-everything shape.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    /// Publish permissions.
    #[serde(rename = "pub", default, skip_serializing_if = "Permission::is_empty")]
    pub publish: Permission,

    /// Subscribe permissions.
    #[serde(rename = "sub", default, skip_serializing_if = "Permission::is_empty")]
    pub subscribe: Permission,

    /// Reply bound for responders.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resp: Option<ResponsePermission>,
}

impl Permissions {
    /// Returns `true` if every slot is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.publish.is_empty() && self.subscribe.is_empty() && self.resp.is_none()
    }

    /// Translate a free-form permissions document into the typed set.
    ///
    /// Non-string allow/deny elements are dropped. An absent or empty slot
    /// stays empty, which the credential serializes as denied-by-default.
    /// The reply bound is read under `maxMsgs` or the bearer spelling
    /// `max`; negative or non-integer values drop the slot. Accepting both
    /// spellings makes translation a fixed point over its own output.
    pub fn from_document(document: &Value) -> Self {
        Self {
            publish: subject_slot(document.get("pub")),
            subscribe: subject_slot(document.get("sub")),
            resp: document.get("resp").and_then(response_slot),
        }
    }
}

fn subject_slot(value: Option<&Value>) -> Permission {
    let Some(value) = value else {
        return Permission::default();
    };
    Permission {
        allow: subjects(value.get("allow")),
        deny: subjects(value.get("deny")),
    }
}

fn subjects(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_owned)
                .collect()
        })
        .unwrap_or_default()
}

fn response_slot(value: &Value) -> Option<ResponsePermission> {
    let max_msgs = value
        .get("maxMsgs")
        .or_else(|| value.get("max"))?
        .as_i64()?;
    (max_msgs >= 0).then_some(ResponsePermission { max_msgs })
}
