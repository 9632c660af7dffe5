//! Environment override tests.
//!
//! These mutate fixed-name process environment variables, so they live in
//! their own test binary and run one after another.

use callout_service::ServiceConfig;
use std::io::Write;

fn write_config(yaml: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    let mut file = std::fs::File::create(dir.path().join("config.yml")).unwrap();
    file.write_all(yaml.as_bytes()).unwrap();
    dir
}

#[test]
fn environment_overrides_every_key() {
    let dir = write_config(
        r#"
nats:
  url: nats://file:4222
  user: file-user
auth:
  issuer_seed: SAFROMFILE
environment: development
"#,
    );

    unsafe {
        std::env::set_var("NATS_URL", "nats://env:4222");
        std::env::set_var("NATS_PASS", "env-pass");
        std::env::set_var("AUTH_ISSUER_SEED", "SAFROMENV");
        std::env::set_var("AUTH_XKEY_SEED", "SXFROMENV");
        std::env::set_var("AUTH_USERS_FILE", "/env/users.json");
        std::env::set_var("ENVIRONMENT", "staging");
    }
    let config = ServiceConfig::load(&dir.path().join("config.yml")).unwrap();
    unsafe {
        std::env::remove_var("NATS_URL");
        std::env::remove_var("NATS_PASS");
        std::env::remove_var("AUTH_ISSUER_SEED");
        std::env::remove_var("AUTH_XKEY_SEED");
        std::env::remove_var("AUTH_USERS_FILE");
        std::env::remove_var("ENVIRONMENT");
    }

    assert_eq!(config.nats.url, "nats://env:4222");
    // Keys not set in the environment keep their file values.
    assert_eq!(config.nats.user.as_deref(), Some("file-user"));
    assert_eq!(config.nats.pass.as_deref(), Some("env-pass"));
    assert_eq!(config.auth.issuer_seed, "SAFROMENV");
    assert_eq!(config.auth.xkey_seed, "SXFROMENV");
    assert_eq!(config.auth.users_file.to_str(), Some("/env/users.json"));
    assert_eq!(config.environment, "staging");
}
