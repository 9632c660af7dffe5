//! The authorization callout state machine.
//!
//! Every request runs decode → authenticate → mint → respond, and every
//! failure short-circuits onto the respond step with a short stable error
//! token. [`Handler::respond_to`] is a pure bytes-in/bytes-out function,
//! so the single publish site in the service host is reached on every
//! path.

use crate::bearer::BearerVerifier;
use crate::envelope::{self, EnvelopeError};
use crate::keys::KeyMaterial;
use crate::users::{Principal, UserStore};
use claims::{
    AuthorizationRequest, AuthorizationResponse, Claims, ConnectOptions, Permissions,
    decode_authorization_request,
};

/// Terminal failure of a callout request. The display form is the stable
/// token returned to the broker; it never embeds seeds, validator output,
/// or store contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailure {
    /// Peer advertised a curve key, we have none.
    EncryptionUnsupported,
    /// Sealed-box open failed.
    DecryptFailed,
    /// Inner request claims unparseable.
    DecodeFailed,
    /// Neither bearer token nor username/password supplied.
    MissingCredentials,
    /// Any bearer verification failure.
    BadToken,
    /// Static flow, name not in store.
    UnknownUser,
    /// Static flow, password mismatch.
    BadPassword,
    /// Minted credential failed self-validation.
    BadClaims,
    /// Issuer signing produced an error.
    SignFailed,
}

impl std::fmt::Display for AuthFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let token = match self {
            Self::EncryptionUnsupported => "encryption-unsupported",
            Self::DecryptFailed => "decrypt-failed",
            Self::DecodeFailed => "decode-failed",
            Self::MissingCredentials => "missing-credentials",
            Self::BadToken => "bad-token",
            Self::UnknownUser => "unknown-user",
            Self::BadPassword => "bad-password",
            Self::BadClaims => "bad-claims",
            Self::SignFailed => "sign-failed",
        };
        f.write_str(token)
    }
}

impl std::error::Error for AuthFailure {}

/// Processes authorization requests against the injected key material,
/// credential store, and bearer verifier. Shared read-only across all
/// request tasks.
pub struct Handler {
    keys: KeyMaterial,
    users: UserStore,
    bearer: BearerVerifier,
}

impl Handler {
    /// Create a handler over the process-scoped dependencies.
    pub fn new(keys: KeyMaterial, users: UserStore, bearer: BearerVerifier) -> Self {
        Self {
            keys,
            users,
            bearer,
        }
    }

    /// Turn a request payload into the reply bytes to publish.
    ///
    /// `peer_xkey` is the value of the `Peer-Xkey` header when present;
    /// it selects sealed-box handling in both directions.
    pub fn respond_to(&self, payload: &[u8], peer_xkey: Option<&str>) -> Vec<u8> {
        let (user_nkey, server_id, outcome) = self.evaluate(payload, peer_xkey);

        let mut response = Claims::<AuthorizationResponse>::response(user_nkey, server_id);
        match outcome {
            Ok(jwt) => response.nats.jwt = jwt,
            Err(failure) => response.nats.error = failure.to_string(),
        }

        let signed = match response.sign(self.keys.issuer()) {
            Ok(signed) => signed,
            Err(e) => {
                tracing::error!(error = %e, "signing authorization response");
                return AuthFailure::SignFailed.to_string().into_bytes();
            }
        };

        match envelope::seal(&self.keys, signed.as_bytes(), peer_xkey) {
            Ok(sealed) => sealed,
            Err(EnvelopeError::Unsupported) => {
                // The peer asked for a sealed exchange and we have no
                // curve key. A signed token never goes out in the clear
                // on this path; the reply is the bare error token.
                tracing::warn!("cannot seal reply without a curve key");
                AuthFailure::EncryptionUnsupported.to_string().into_bytes()
            }
            Err(e) => {
                tracing::error!(error = %e, "sealing authorization response");
                b"failed to seal response".to_vec()
            }
        }
    }

    /// Run decode and authentication, returning the identities to echo and
    /// either a minted credential or the failure to report.
    fn evaluate(
        &self,
        payload: &[u8],
        peer_xkey: Option<&str>,
    ) -> (String, String, Result<String, AuthFailure>) {
        let token = match envelope::open(&self.keys, payload, peer_xkey) {
            Ok(token) => token,
            Err(EnvelopeError::Unsupported) => {
                tracing::warn!("peer advertised a curve key but none is configured");
                return (
                    String::new(),
                    String::new(),
                    Err(AuthFailure::EncryptionUnsupported),
                );
            }
            Err(e) => {
                tracing::warn!(error = %e, "opening request envelope");
                return (String::new(), String::new(), Err(AuthFailure::DecryptFailed));
            }
        };

        let token = match std::str::from_utf8(&token) {
            Ok(token) => token,
            Err(_) => {
                tracing::warn!("request payload is not utf-8");
                return (String::new(), String::new(), Err(AuthFailure::DecodeFailed));
            }
        };
        let request = match decode_authorization_request(token) {
            Ok(request) => request,
            Err(e) => {
                tracing::warn!(error = %e, "decoding authorization request");
                return (String::new(), String::new(), Err(AuthFailure::DecodeFailed));
            }
        };

        let user_nkey = request.nats.user_nkey.clone();
        let server_id = request.nats.server_id.id.clone();
        let outcome = self.authorize(&request.nats);
        (user_nkey, server_id, outcome)
    }

    /// Authenticate and mint the user credential.
    fn authorize(&self, request: &AuthorizationRequest) -> Result<String, AuthFailure> {
        let (principal, name) = self.authenticate(&request.connect_opts)?;

        let credential = Claims::user(
            &request.user_nkey,
            &name,
            &principal.account,
            principal.permissions.clone(),
        );
        if let Err(e) = credential.validate() {
            tracing::warn!(error = %e, user = %name, "minted credential failed validation");
            return Err(AuthFailure::BadClaims);
        }

        match credential.sign(self.keys.issuer()) {
            Ok(jwt) => {
                tracing::info!(user = %name, account = %principal.account, "issued user credential");
                Ok(jwt)
            }
            Err(e) => {
                tracing::error!(error = %e, "signing user credential");
                Err(AuthFailure::SignFailed)
            }
        }
    }

    /// Resolve the connect options to a principal and the name to mint.
    /// Bearer wins when both credential kinds are present.
    fn authenticate(&self, opts: &ConnectOptions) -> Result<(Principal, String), AuthFailure> {
        if let Some(token) = opts.token.as_deref().filter(|t| !t.is_empty()) {
            let claims = self.bearer.verify(token).map_err(|e| {
                tracing::warn!(error = %e, "bearer token rejected");
                AuthFailure::BadToken
            })?;
            let permissions = Permissions::from_document(&claims.permissions);
            tracing::info!(user = %claims.user_id, account = %claims.account, "validated bearer token");
            return Ok((
                Principal {
                    password: String::new(),
                    account: claims.account,
                    permissions,
                },
                claims.user_id,
            ));
        }

        let username = opts.username.as_deref().filter(|u| !u.is_empty());
        let password = opts.password.as_deref().filter(|p| !p.is_empty());
        let (Some(username), Some(password)) = (username, password) else {
            tracing::warn!("username or password missing");
            return Err(AuthFailure::MissingCredentials);
        };

        let principal = self.users.get(username).ok_or_else(|| {
            tracing::warn!(user = %username, "unknown user");
            AuthFailure::UnknownUser
        })?;
        if principal.password.as_bytes() != password.as_bytes() {
            tracing::warn!(user = %username, "password mismatch");
            return Err(AuthFailure::BadPassword);
        }

        tracing::info!(user = %username, account = %principal.account, "validated static credentials");
        Ok((principal.clone(), username.to_string()))
    }
}
