//! NATS authentication callout service.
//!
//! The broker externalizes its login decision by publishing signed
//! authorization requests on `$SYS.REQ.USER.AUTH`. This crate decodes the
//! (optionally sealed) request, authenticates the client through either a
//! static credential store or a bearer token, mints a permission-scoped
//! user credential, and always replies with a signed authorization
//! response.

pub mod bearer;
pub mod config;
pub mod envelope;
pub mod handler;
pub mod keys;
pub mod service;
pub mod users;

pub use bearer::{BEARER_SECRET_ENV, BearerClaims, BearerError, BearerVerifier};
pub use config::ServiceConfig;
pub use envelope::{EnvelopeError, PEER_XKEY_HEADER};
pub use handler::{AuthFailure, Handler};
pub use keys::{KeyError, KeyMaterial};
pub use users::{Principal, UserStore};
