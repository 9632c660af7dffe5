//! Static credential store.
//!
//! A JSON file maps user names to password, account, and permission set.
//! The store is immutable after load; lookups are case-sensitive exact
//! matches and never block.

use anyhow::Context;
use claims::Permissions;
use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

/// A named entry in the credential store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Principal {
    /// Opaque password, compared byte-wise.
    #[serde(rename = "Pass")]
    pub password: String,

    /// The account a minted credential binds the client to.
    #[serde(rename = "Account")]
    pub account: String,

    /// Permissions granted to the minted credential.
    #[serde(rename = "Permissions", default)]
    pub permissions: Permissions,
}

/// Immutable map of principals, keyed by user name.
#[derive(Debug, Default)]
pub struct UserStore {
    users: BTreeMap<CompactString, Principal>,
}

impl UserStore {
    /// Create from an explicit principal map.
    pub fn new(users: BTreeMap<CompactString, Principal>) -> Self {
        Self { users }
    }

    /// Load the store from a JSON file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let users: BTreeMap<CompactString, Principal> = serde_json::from_str(&data)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(Self { users })
    }

    /// Degraded-mode store used when the credential file is unavailable.
    /// Startup always succeeds; real logins miss and fail as unknown.
    pub fn fallback() -> Self {
        let mut users = BTreeMap::new();
        users.insert(
            CompactString::new("fake"),
            Principal {
                password: "fake".to_string(),
                account: "Fake".to_string(),
                permissions: Permissions::default(),
            },
        );
        Self { users }
    }

    /// Case-sensitive exact lookup.
    pub fn get(&self, username: &str) -> Option<&Principal> {
        self.users.get(username)
    }

    /// Number of principals in the store.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store holds no principals.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}
