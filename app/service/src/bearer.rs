//! Bearer-token validation for the token login flow.
//!
//! Tokens are compact HMAC-SHA256 JWTs minted by an external issuer that
//! shares a symmetric secret with this service. The secret is bound from
//! the environment once at startup; verification pins the algorithm to
//! HS256 before the signature is checked, so a token whose header names
//! `none` or an asymmetric scheme never reaches the comparison.

use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};
use serde::Deserialize;
use std::time::SystemTime;

/// Environment variable holding the shared HMAC secret.
pub const BEARER_SECRET_ENV: &str = "BEARER_TOKEN_SECRET";

/// Verified bearer-token claims.
#[derive(Debug, Clone, Deserialize)]
pub struct BearerClaims {
    /// Identity to place in the minted credential.
    pub user_id: String,

    /// Account the credential binds to.
    pub account: String,

    /// Free-form permissions document; translated by the caller.
    #[serde(default)]
    pub permissions: serde_json::Value,

    /// Expiry instant, seconds since the unix epoch.
    #[serde(default)]
    pub exp: Option<i64>,

    /// Issue instant, seconds since the unix epoch.
    #[serde(default)]
    pub iat: Option<i64>,
}

/// Bearer-token verification error.
#[derive(Debug)]
pub enum BearerError {
    /// No shared secret is bound; the bearer flow is disabled.
    Misconfigured,
    /// Not a three-segment token, or header/claims are unparseable.
    Malformed,
    /// The header names an algorithm other than HMAC-SHA256.
    Algorithm(String),
    /// The HMAC over `header.payload` did not match.
    Signature,
    /// `exp` is absent or not in the future.
    Expired,
    /// `user_id` is absent or empty.
    MissingUserId,
}

impl std::fmt::Display for BearerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Misconfigured => write!(f, "{BEARER_SECRET_ENV} is not set"),
            Self::Malformed => write!(f, "malformed bearer token"),
            Self::Algorithm(alg) => write!(f, "unexpected signing algorithm {alg}"),
            Self::Signature => write!(f, "bearer token signature mismatch"),
            Self::Expired => write!(f, "bearer token expired"),
            Self::MissingUserId => write!(f, "missing user_id claim"),
        }
    }
}

impl std::error::Error for BearerError {}

/// Validates bearer tokens against the process-scoped shared secret.
pub struct BearerVerifier {
    secret: Option<String>,
}

impl BearerVerifier {
    /// Create with an explicit secret. `None` or an empty string leaves
    /// the verifier misconfigured and every verification failing.
    pub fn new(secret: Option<String>) -> Self {
        Self {
            secret: secret.filter(|s| !s.is_empty()),
        }
    }

    /// Bind the secret from [`BEARER_SECRET_ENV`].
    pub fn from_env() -> Self {
        Self::new(std::env::var(BEARER_SECRET_ENV).ok())
    }

    /// Whether a secret is bound.
    pub fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verify `token` and return its claims.
    pub fn verify(&self, token: &str) -> Result<BearerClaims, BearerError> {
        let secret = self.secret.as_deref().ok_or(BearerError::Misconfigured)?;

        if token.split('.').count() != 3 {
            return Err(BearerError::Malformed);
        }

        let header = jsonwebtoken::decode_header(token).map_err(|_| BearerError::Malformed)?;
        if header.alg != Algorithm::HS256 {
            return Err(BearerError::Algorithm(format!("{:?}", header.alg)));
        }

        // Expiry is checked by hand below: the library's own check applies
        // leeway and an exclusive boundary, and this contract has neither.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.required_spec_claims.clear();

        let data = jsonwebtoken::decode::<BearerClaims>(
            token,
            &DecodingKey::from_secret(secret.as_bytes()),
            &validation,
        )
        .map_err(|e| match e.kind() {
            ErrorKind::InvalidSignature => BearerError::Signature,
            _ => BearerError::Malformed,
        })?;

        let claims = data.claims;
        match claims.exp {
            Some(exp) if exp > unix_now() => {}
            _ => return Err(BearerError::Expired),
        }
        if claims.user_id.is_empty() {
            return Err(BearerError::MissingUserId);
        }
        Ok(claims)
    }
}

fn unix_now() -> i64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}
