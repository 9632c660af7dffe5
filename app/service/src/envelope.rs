//! Sealed-box envelope handling for the callout exchange.
//!
//! When the broker advertises an ephemeral public curve key in the
//! `Peer-Xkey` header, the request payload is sealed to our curve key and
//! the reply must be sealed back to the peer's. Without the header both
//! directions pass through verbatim. The signed reply is treated as an
//! opaque byte string and never re-parsed here.

use crate::keys::KeyMaterial;
use nkeys::XKey;

/// Header carrying the broker's ephemeral public curve key, matched
/// case-insensitively.
pub const PEER_XKEY_HEADER: &str = "Peer-Xkey";

/// Envelope error.
#[derive(Debug)]
pub enum EnvelopeError {
    /// The peer advertised a curve key but we have none.
    Unsupported,
    /// Opening the sealed request failed.
    Open(nkeys::error::Error),
    /// Sealing the reply failed.
    Seal(nkeys::error::Error),
}

impl std::fmt::Display for EnvelopeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unsupported => write!(f, "encryption not supported: no curve key pair"),
            Self::Open(e) => write!(f, "opening sealed request: {e}"),
            Self::Seal(e) => write!(f, "sealing response: {e}"),
        }
    }
}

impl std::error::Error for EnvelopeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Open(e) | Self::Seal(e) => Some(e),
            Self::Unsupported => None,
        }
    }
}

/// Decrypt an inbound payload. Without a peer key the payload is taken
/// verbatim.
pub fn open(
    keys: &KeyMaterial,
    payload: &[u8],
    peer_xkey: Option<&str>,
) -> Result<Vec<u8>, EnvelopeError> {
    let Some(peer) = peer_xkey else {
        return Ok(payload.to_vec());
    };
    let curve = keys.curve().ok_or(EnvelopeError::Unsupported)?;
    let sender = XKey::from_public_key(peer).map_err(EnvelopeError::Open)?;
    curve.open(payload, &sender).map_err(EnvelopeError::Open)
}

/// Encrypt an outbound reply, symmetric with [`open`].
pub fn seal(
    keys: &KeyMaterial,
    reply: &[u8],
    peer_xkey: Option<&str>,
) -> Result<Vec<u8>, EnvelopeError> {
    let Some(peer) = peer_xkey else {
        return Ok(reply.to_vec());
    };
    let curve = keys.curve().ok_or(EnvelopeError::Unsupported)?;
    let recipient = XKey::from_public_key(peer).map_err(EnvelopeError::Seal)?;
    curve.seal(reply, &recipient).map_err(EnvelopeError::Seal)
}
