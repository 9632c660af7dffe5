//! Authorization callout request and response claims.
//!
//! The broker wraps a connecting client's options in a signed request on
//! the callout subject; the service answers with response claims carrying
//! either a freshly minted user credential or an error string.

use crate::{Claims, ClaimsError};
use serde::{Deserialize, Serialize};

/// Claim type tag for authorization requests.
pub const AUTH_REQUEST_CLAIM_TYPE: &str = "authorization_request";

/// Claim type tag for authorization responses.
pub const AUTH_RESPONSE_CLAIM_TYPE: &str = "authorization_response";

/// Identity of the broker instance that issued a request and will consume
/// the response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerId {
    /// Server name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,

    /// Host the server is bound to.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub host: String,

    /// Unique server id; echoed back as the response audience.
    #[serde(default)]
    pub id: String,

    /// Server version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Cluster the server belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cluster: Option<String>,

    /// The server's ephemeral public curve key for this exchange.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xkey: Option<String>,
}

/// Connect options the client presented to the broker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConnectOptions {
    /// Static-flow user name.
    #[serde(rename = "user", default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Static-flow password.
    #[serde(rename = "pass", default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,

    /// Bearer token; non-empty selects the bearer flow.
    #[serde(
        rename = "auth_token",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub token: Option<String>,

    /// Client connection name.
    #[serde(rename = "name", default, skip_serializing_if = "Option::is_none")]
    pub client_name: Option<String>,

    /// Client library language.
    #[serde(rename = "lang", default, skip_serializing_if = "Option::is_none")]
    pub lang: Option<String>,
}

/// The `nats` section of an authorization request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationRequest {
    /// The broker instance consuming the response.
    #[serde(default)]
    pub server_id: ServerId,

    /// Ephemeral public identity assigned to the connecting client; the
    /// minted credential's subject.
    #[serde(default)]
    pub user_nkey: String,

    /// The client's connect options.
    #[serde(default)]
    pub connect_opts: ConnectOptions,

    /// Claim type tag, `authorization_request`.
    #[serde(rename = "type", default)]
    pub claim_type: String,

    /// Claims schema version.
    #[serde(default)]
    pub version: i64,
}

/// The `nats` section of an authorization response. Exactly one of `jwt`
/// and `error` is non-empty in a well-formed response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthorizationResponse {
    /// The minted user credential on success.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub jwt: String,

    /// Short error token on failure.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub error: String,

    /// Claim type tag, `authorization_response`.
    #[serde(rename = "type")]
    pub claim_type: String,

    /// Claims schema version.
    pub version: i64,
}

impl Claims<AuthorizationResponse> {
    /// Empty response claims addressed to `server_id` for `user_nkey`.
    /// The caller fills in exactly one of `jwt` and `error` before
    /// signing.
    pub fn response(user_nkey: impl Into<String>, server_id: impl Into<String>) -> Self {
        Claims::new(
            user_nkey,
            AuthorizationResponse {
                jwt: String::new(),
                error: String::new(),
                claim_type: AUTH_RESPONSE_CLAIM_TYPE.to_string(),
                version: 2,
            },
        )
        .audience(server_id)
    }
}

/// Decode and verify an authorization request token.
pub fn decode_authorization_request(
    token: &str,
) -> Result<Claims<AuthorizationRequest>, ClaimsError> {
    let claims = crate::decode::<AuthorizationRequest>(token)?;
    if claims.nats.claim_type != AUTH_REQUEST_CLAIM_TYPE {
        return Err(ClaimsError::WrongClaimType {
            expected: AUTH_REQUEST_CLAIM_TYPE,
            found: claims.nats.claim_type,
        });
    }
    Ok(claims)
}

/// Decode and verify an authorization response token.
pub fn decode_authorization_response(
    token: &str,
) -> Result<Claims<AuthorizationResponse>, ClaimsError> {
    let claims = crate::decode::<AuthorizationResponse>(token)?;
    if claims.nats.claim_type != AUTH_RESPONSE_CLAIM_TYPE {
        return Err(ClaimsError::WrongClaimType {
            expected: AUTH_RESPONSE_CLAIM_TYPE,
            found: claims.nats.claim_type,
        });
    }
    Ok(claims)
}
