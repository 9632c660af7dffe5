//! Service configuration loaded from YAML.
//!
//! Every key can be overridden through the environment using
//! dot-to-underscore uppercasing (`nats.url` → `NATS_URL`).

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level service configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Broker connection configuration.
    pub nats: NatsConfig,
    /// Key and credential-store configuration.
    pub auth: AuthConfig,
    /// Free-form deployment label, surfaced in service metadata.
    pub environment: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            nats: NatsConfig::default(),
            auth: AuthConfig::default(),
            environment: "development".to_string(),
        }
    }
}

/// Broker connection configuration.
#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NatsConfig {
    /// Broker URL the service connects to.
    pub url: String,
    /// Static user for the service's own broker login.
    pub user: Option<String>,
    /// Password for the service's own broker login.
    pub pass: Option<String>,
}

/// Key and credential-store configuration.
#[derive(Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Required seed for the issuer signing key (`SA...`).
    pub issuer_seed: String,
    /// Optional seed for the curve key (`SX...`); empty disables
    /// encrypted exchanges.
    pub xkey_seed: String,
    /// Path to the credential-store file.
    pub users_file: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            issuer_seed: String::new(),
            xkey_seed: String::new(),
            users_file: PathBuf::from("users.json"),
        }
    }
}

impl ServiceConfig {
    /// Parse a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).context("failed to parse configuration")
    }

    /// Load from a file, apply environment overrides, and validate.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        let mut config = Self::from_yaml(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Override any key set in the environment.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("NATS_URL") {
            self.nats.url = url;
        }
        if let Ok(user) = std::env::var("NATS_USER") {
            self.nats.user = Some(user);
        }
        if let Ok(pass) = std::env::var("NATS_PASS") {
            self.nats.pass = Some(pass);
        }
        if let Ok(seed) = std::env::var("AUTH_ISSUER_SEED") {
            self.auth.issuer_seed = seed;
        }
        if let Ok(seed) = std::env::var("AUTH_XKEY_SEED") {
            self.auth.xkey_seed = seed;
        }
        if let Ok(path) = std::env::var("AUTH_USERS_FILE") {
            self.auth.users_file = PathBuf::from(path);
        }
        if let Ok(environment) = std::env::var("ENVIRONMENT") {
            self.environment = environment;
        }
    }

    /// Check required keys.
    pub fn validate(&self) -> Result<()> {
        if self.auth.issuer_seed.is_empty() {
            bail!("auth.issuer_seed is required");
        }
        if self.nats.url.is_empty() {
            bail!("nats.url is required");
        }
        Ok(())
    }
}
