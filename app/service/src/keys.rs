//! Issuer and curve key material.
//!
//! The issuer key signs every minted credential and every response; the
//! optional curve key unseals encrypted callout exchanges. Both are parsed
//! once at startup and shared read-only for the life of the process.

use nkeys::{KeyPair, XKey};

/// Human-readable prefix of account-class seeds.
const ISSUER_SEED_PREFIX: &str = "SA";

/// Human-readable prefix of curve-class seeds.
const CURVE_SEED_PREFIX: &str = "SX";

/// Key parsing error. Carries at most the first three characters of the
/// offending seed; a full seed never reaches logs or messages.
#[derive(Debug)]
pub enum KeyError {
    /// No issuer seed was supplied.
    EmptyIssuerSeed,
    /// The issuer seed did not parse.
    MalformedIssuerSeed {
        prefix: String,
        source: nkeys::error::Error,
    },
    /// The issuer seed is not an account-class seed.
    IssuerSeedPrefix { prefix: String },
    /// The curve seed did not parse.
    MalformedCurveSeed {
        prefix: String,
        source: nkeys::error::Error,
    },
    /// The curve seed is not a curve-class seed.
    CurveSeedPrefix { prefix: String },
}

impl std::fmt::Display for KeyError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyIssuerSeed => write!(f, "issuer seed cannot be empty"),
            Self::MalformedIssuerSeed { prefix, source } => {
                write!(f, "parsing issuer seed {prefix:?}: {source}")
            }
            Self::IssuerSeedPrefix { prefix } => {
                write!(f, "issuer seed {prefix:?} must start with {ISSUER_SEED_PREFIX:?}")
            }
            Self::MalformedCurveSeed { prefix, source } => {
                write!(f, "parsing xkey seed {prefix:?}: {source}")
            }
            Self::CurveSeedPrefix { prefix } => {
                write!(f, "xkey seed {prefix:?} must start with {CURVE_SEED_PREFIX:?}")
            }
        }
    }
}

impl std::error::Error for KeyError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::MalformedIssuerSeed { source, .. } | Self::MalformedCurveSeed { source, .. } => {
                Some(source)
            }
            _ => None,
        }
    }
}

/// The process's signing and encryption keys.
#[derive(Debug)]
pub struct KeyMaterial {
    issuer: KeyPair,
    curve: Option<XKey>,
}

impl KeyMaterial {
    /// Parse the issuer seed and the optional curve seed. An empty curve
    /// seed disables encrypted exchanges.
    pub fn parse(issuer_seed: &str, curve_seed: &str) -> Result<Self, KeyError> {
        if issuer_seed.is_empty() {
            return Err(KeyError::EmptyIssuerSeed);
        }
        if !issuer_seed.starts_with(ISSUER_SEED_PREFIX) {
            return Err(KeyError::IssuerSeedPrefix {
                prefix: truncate_seed(issuer_seed),
            });
        }
        let issuer =
            KeyPair::from_seed(issuer_seed).map_err(|source| KeyError::MalformedIssuerSeed {
                prefix: truncate_seed(issuer_seed),
                source,
            })?;

        let curve = if curve_seed.is_empty() {
            None
        } else {
            if !curve_seed.starts_with(CURVE_SEED_PREFIX) {
                return Err(KeyError::CurveSeedPrefix {
                    prefix: truncate_seed(curve_seed),
                });
            }
            Some(
                XKey::from_seed(curve_seed).map_err(|source| KeyError::MalformedCurveSeed {
                    prefix: truncate_seed(curve_seed),
                    source,
                })?,
            )
        };

        Ok(Self { issuer, curve })
    }

    /// The signing key pair.
    pub fn issuer(&self) -> &KeyPair {
        &self.issuer
    }

    /// The sealed-box key pair, when configured.
    pub fn curve(&self) -> Option<&XKey> {
        self.curve.as_ref()
    }

    /// Whether encrypted exchanges are supported.
    pub fn has_curve(&self) -> bool {
        self.curve.is_some()
    }
}

/// At most the first three characters of a seed, for error reporting.
fn truncate_seed(seed: &str) -> String {
    let prefix: String = seed.chars().take(3).collect();
    if prefix.len() < seed.len() {
        format!("{prefix}...")
    } else {
        prefix
    }
}
