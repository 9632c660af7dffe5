//! Envelope codec tests.

use callout_service::{EnvelopeError, KeyMaterial, envelope};
use nkeys::{KeyPair, XKey};

fn keys_with_curve() -> (KeyMaterial, String) {
    let issuer_seed = KeyPair::new_account().seed().unwrap();
    let curve = XKey::new();
    let curve_public = curve.public_key();
    let keys = KeyMaterial::parse(&issuer_seed, &curve.seed().unwrap()).unwrap();
    (keys, curve_public)
}

fn keys_without_curve() -> KeyMaterial {
    let issuer_seed = KeyPair::new_account().seed().unwrap();
    KeyMaterial::parse(&issuer_seed, "").unwrap()
}

#[test]
fn no_header_passes_through() {
    let (keys, _) = keys_with_curve();
    let opened = envelope::open(&keys, b"payload", None).unwrap();
    assert_eq!(opened, b"payload");
    let sealed = envelope::seal(&keys, b"reply", None).unwrap();
    assert_eq!(sealed, b"reply");
}

#[test]
fn sealed_round_trip() {
    let (keys, service_public) = keys_with_curve();
    let peer = XKey::new();
    let service_key = XKey::from_public_key(&service_public).unwrap();

    // Peer seals to the service; the service opens with the peer's public.
    let sealed = peer.seal(b"the request", &service_key).unwrap();
    let opened = envelope::open(&keys, &sealed, Some(&peer.public_key())).unwrap();
    assert_eq!(opened, b"the request");

    // Symmetric on the way out: the peer can open the service's reply.
    let reply = envelope::seal(&keys, b"the reply", Some(&peer.public_key())).unwrap();
    assert_ne!(reply, b"the reply");
    let opened = peer.open(&reply, &service_key).unwrap();
    assert_eq!(opened, b"the reply");
}

#[test]
fn header_without_curve_key_is_unsupported() {
    let keys = keys_without_curve();
    let peer = XKey::new();
    let err = envelope::open(&keys, b"payload", Some(&peer.public_key())).unwrap_err();
    assert!(matches!(err, EnvelopeError::Unsupported));
    let err = envelope::seal(&keys, b"reply", Some(&peer.public_key())).unwrap_err();
    assert!(matches!(err, EnvelopeError::Unsupported));
}

#[test]
fn tampered_ciphertext_fails_to_open() {
    let (keys, service_public) = keys_with_curve();
    let peer = XKey::new();
    let service_key = XKey::from_public_key(&service_public).unwrap();

    let mut sealed = peer.seal(b"the request", &service_key).unwrap();
    let last = sealed.len() - 1;
    sealed[last] ^= 0xff;
    assert!(matches!(
        envelope::open(&keys, &sealed, Some(&peer.public_key())),
        Err(EnvelopeError::Open(_))
    ));
}

#[test]
fn wrong_peer_key_fails_to_open() {
    let (keys, service_public) = keys_with_curve();
    let peer = XKey::new();
    let other = XKey::new();
    let service_key = XKey::from_public_key(&service_public).unwrap();

    let sealed = peer.seal(b"the request", &service_key).unwrap();
    assert!(envelope::open(&keys, &sealed, Some(&other.public_key())).is_err());
}
