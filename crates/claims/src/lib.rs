//! NATS-compatible JWT claims.
//!
//! A claim set is a three-segment token: a fixed `ed25519-nkey` header, a
//! JSON body whose `nats` section carries the kind-specific payload, and an
//! nkey signature over `header.body`. [`Claims::sign`] mints and signs a
//! token; [`decode`] parses one and verifies the signature against the
//! issuer key embedded in the body.

pub mod authorization;
pub mod permissions;
pub mod user;

pub use authorization::{
    AuthorizationRequest, AuthorizationResponse, ConnectOptions, ServerId,
    decode_authorization_request, decode_authorization_response,
};
pub use permissions::{Permission, Permissions, ResponsePermission};
pub use user::User;

use data_encoding::{BASE32HEX_NOPAD, BASE64URL_NOPAD};
use nkeys::KeyPair;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use sha2::{Digest, Sha256};
use std::time::SystemTime;

/// The only signing algorithm NATS JWTs use.
pub const ALGORITHM: &str = "ed25519-nkey";

const JWT_HEADER: &str = r#"{"typ":"JWT","alg":"ed25519-nkey"}"#;

/// Errors from minting or decoding a claim set.
#[derive(Debug)]
pub enum ClaimsError {
    /// Not a three-segment token, or the header is not a NATS JWT header.
    Malformed,
    /// The header names an algorithm other than `ed25519-nkey`.
    UnsupportedAlgorithm(String),
    /// A segment is not valid unpadded base64url.
    Encoding(data_encoding::DecodeError),
    /// The claim body is not valid JSON for the expected shape.
    Json(serde_json::Error),
    /// Key parsing, signing, or signature verification failed.
    Key(nkeys::error::Error),
    /// The `nats.type` field names a different claim kind.
    WrongClaimType { expected: &'static str, found: String },
    /// The claim set failed self-validation.
    Invalid(&'static str),
}

impl std::fmt::Display for ClaimsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed => write!(f, "malformed claims token"),
            Self::UnsupportedAlgorithm(alg) => write!(f, "unsupported algorithm: {alg}"),
            Self::Encoding(e) => write!(f, "decoding claims segment: {e}"),
            Self::Json(e) => write!(f, "parsing claims body: {e}"),
            Self::Key(e) => write!(f, "key error: {e}"),
            Self::WrongClaimType { expected, found } => {
                write!(f, "expected {expected} claims, found {found:?}")
            }
            Self::Invalid(reason) => write!(f, "invalid claims: {reason}"),
        }
    }
}

impl std::error::Error for ClaimsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Encoding(e) => Some(e),
            Self::Json(e) => Some(e),
            Self::Key(e) => Some(e),
            _ => None,
        }
    }
}

impl From<data_encoding::DecodeError> for ClaimsError {
    fn from(e: data_encoding::DecodeError) -> Self {
        Self::Encoding(e)
    }
}

impl From<serde_json::Error> for ClaimsError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<nkeys::error::Error> for ClaimsError {
    fn from(e: nkeys::error::Error) -> Self {
        Self::Key(e)
    }
}

/// Generic claim container. `T` is the kind-specific `nats` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims<T> {
    /// Seconds since the unix epoch when the token was signed.
    #[serde(rename = "iat")]
    pub issued_at: i64,

    /// Public key of the signing nkey; filled in by [`Claims::sign`].
    #[serde(rename = "iss")]
    pub issuer: String,

    /// Base32 hash of the body serialized with this field empty.
    #[serde(rename = "jti")]
    pub jwt_id: String,

    /// Public key of the entity the claims are issued to.
    #[serde(rename = "sub")]
    pub subject: String,

    /// Intended consumer of the claims.
    #[serde(rename = "aud", default, skip_serializing_if = "Option::is_none")]
    pub audience: Option<String>,

    /// Friendly name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Kind-specific payload.
    pub nats: T,

    /// Seconds since the unix epoch when the token expires.
    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires: Option<i64>,
}

impl<T> Claims<T> {
    /// Start a claim set for `subject`. Issuer, issue time, and id are
    /// filled in by [`Claims::sign`].
    pub fn new(subject: impl Into<String>, nats: T) -> Self {
        Self {
            issued_at: 0,
            issuer: String::new(),
            jwt_id: String::new(),
            subject: subject.into(),
            audience: None,
            name: None,
            nats,
            expires: None,
        }
    }

    /// Set the audience.
    #[must_use]
    pub fn audience(mut self, audience: impl Into<String>) -> Self {
        self.audience = Some(audience.into());
        self
    }

    /// Set the friendly name.
    #[must_use]
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

impl<T: Serialize> Claims<T> {
    /// Serialize, stamp the id hash, and sign with `issuer`, returning the
    /// encoded token.
    pub fn sign(mut self, issuer: &KeyPair) -> Result<String, ClaimsError> {
        self.issued_at = unix_now();
        self.issuer = issuer.public_key();
        self.jwt_id.clear();

        let body = serde_json::to_string(&self)?;
        self.jwt_id = BASE32HEX_NOPAD.encode(Sha256::digest(body.as_bytes()).as_slice());
        let body = serde_json::to_string(&self)?;

        let signing_input = format!(
            "{}.{}",
            BASE64URL_NOPAD.encode(JWT_HEADER.as_bytes()),
            BASE64URL_NOPAD.encode(body.as_bytes())
        );
        let signature = issuer.sign(signing_input.as_bytes())?;
        Ok(format!(
            "{signing_input}.{}",
            BASE64URL_NOPAD.encode(&signature)
        ))
    }
}

#[derive(Deserialize)]
struct Header {
    #[serde(default)]
    typ: String,
    #[serde(default)]
    alg: String,
}

/// Decode a claims token and verify its signature against the issuer key
/// embedded in the body.
pub fn decode<T: DeserializeOwned>(token: &str) -> Result<Claims<T>, ClaimsError> {
    let mut segments = token.split('.');
    let (Some(header), Some(body), Some(signature), None) = (
        segments.next(),
        segments.next(),
        segments.next(),
        segments.next(),
    ) else {
        return Err(ClaimsError::Malformed);
    };

    let parsed: Header = serde_json::from_slice(&BASE64URL_NOPAD.decode(header.as_bytes())?)?;
    if !parsed.typ.eq_ignore_ascii_case("jwt") {
        return Err(ClaimsError::Malformed);
    }
    if parsed.alg != ALGORITHM {
        return Err(ClaimsError::UnsupportedAlgorithm(parsed.alg));
    }

    let claims: Claims<T> = serde_json::from_slice(&BASE64URL_NOPAD.decode(body.as_bytes())?)?;
    let signature = BASE64URL_NOPAD.decode(signature.as_bytes())?;
    let issuer = KeyPair::from_public_key(&claims.issuer)?;
    issuer.verify(format!("{header}.{body}").as_bytes(), &signature)?;
    Ok(claims)
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
