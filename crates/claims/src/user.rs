//! User credential claims.

use crate::{Claims, ClaimsError, Permissions};
use serde::{Deserialize, Serialize};

/// Claim type tag for user credentials.
pub const USER_CLAIM_TYPE: &str = "user";

/// The `nats` section of a user credential.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Subject permissions granted to the user.
    #[serde(flatten)]
    pub permissions: Permissions,

    /// Maximum number of subscriptions; -1 is unlimited.
    pub subs: i64,

    /// Maximum message data size in bytes; -1 is unlimited.
    pub data: i64,

    /// Maximum message payload size in bytes; -1 is unlimited.
    pub payload: i64,

    /// Claim type tag, always `user`.
    #[serde(rename = "type")]
    pub claim_type: String,

    /// Claims schema version.
    pub version: i64,
}

impl User {
    /// Unlimited-resource user section with the given permissions.
    pub fn new(permissions: Permissions) -> Self {
        Self {
            permissions,
            subs: -1,
            data: -1,
            payload: -1,
            claim_type: USER_CLAIM_TYPE.to_string(),
            version: 2,
        }
    }
}

impl Claims<User> {
    /// Claims for a user credential: subject is the client's ephemeral
    /// nkey, audience the account it binds to.
    pub fn user(
        user_nkey: impl Into<String>,
        name: impl Into<String>,
        account: impl Into<String>,
        permissions: Permissions,
    ) -> Self {
        Claims::new(user_nkey, User::new(permissions))
            .name(name)
            .audience(account)
    }

    /// Self-consistency checks run before signing.
    pub fn validate(&self) -> Result<(), ClaimsError> {
        if self.subject.is_empty() {
            return Err(ClaimsError::Invalid("empty subject"));
        }
        if !self.subject.starts_with('U') || nkeys::KeyPair::from_public_key(&self.subject).is_err()
        {
            return Err(ClaimsError::Invalid("subject is not a user key"));
        }
        if self.nats.claim_type != USER_CLAIM_TYPE {
            return Err(ClaimsError::Invalid("wrong claim type"));
        }
        if let Some(resp) = &self.nats.permissions.resp
            && resp.max_msgs < 0
        {
            return Err(ClaimsError::Invalid("negative reply bound"));
        }
        Ok(())
    }
}
