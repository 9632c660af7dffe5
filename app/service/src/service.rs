//! Broker connection and endpoint registration.
//!
//! Connects with the service's own static login, registers the callout
//! endpoint as a micro-service, and hands each request to the handler in
//! its own task so one failing request never takes down the rest. On the
//! interrupt signal the endpoint is stopped and the connection drained
//! within a bounded grace period.

use crate::bearer::{BEARER_SECRET_ENV, BearerVerifier};
use crate::config::ServiceConfig;
use crate::envelope::PEER_XKEY_HEADER;
use crate::handler::Handler;
use crate::keys::KeyMaterial;
use crate::users::UserStore;
use anyhow::{Context, Result, anyhow};
use async_nats::HeaderMap;
use async_nats::service::ServiceExt;
use futures_util::StreamExt;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Advertised service name.
pub const SERVICE_NAME: &str = "auth-callout";

/// Client name for the service's own broker connection.
pub const CLIENT_NAME: &str = "auth-service";

/// Subject group the callout endpoint registers under.
pub const AUTH_CALLOUT_GROUP: &str = "$SYS.REQ.USER";

/// Endpoint name within the group.
pub const AUTH_CALLOUT_ENDPOINT: &str = "AUTH";

/// How long shutdown waits for in-flight replies.
const DRAIN_GRACE: Duration = Duration::from_secs(10);

/// Run the service until the interrupt signal.
pub async fn run(config: ServiceConfig) -> Result<()> {
    let keys = KeyMaterial::parse(&config.auth.issuer_seed, &config.auth.xkey_seed)
        .context("parsing auth keys")?;
    if keys.has_curve() {
        tracing::info!("curve key loaded, encrypted callouts enabled");
    }

    let users = match UserStore::load(&config.auth.users_file) {
        Ok(users) => {
            tracing::info!(
                users = users.len(),
                path = %config.auth.users_file.display(),
                "loaded credential store"
            );
            users
        }
        Err(e) => {
            tracing::warn!(error = %e, "credential store unavailable, using fallback principal");
            UserStore::fallback()
        }
    };

    let bearer = BearerVerifier::from_env();
    if !bearer.is_configured() {
        tracing::warn!("{BEARER_SECRET_ENV} is not set, bearer logins will be rejected");
    }

    let mut options = async_nats::ConnectOptions::new().name(CLIENT_NAME);
    if let (Some(user), Some(pass)) = (&config.nats.user, &config.nats.pass) {
        options = options.user_and_password(user.clone(), pass.clone());
    }
    let client = options
        .connect(config.nats.url.as_str())
        .await
        .with_context(|| format!("connecting to {}", config.nats.url))?;
    tracing::info!(url = %config.nats.url, "connected to broker");

    let mut service = client
        .service_builder()
        .description("Authentication callout service")
        .metadata(HashMap::from([(
            "environment".to_string(),
            config.environment.clone(),
        )]))
        .start(SERVICE_NAME, env!("CARGO_PKG_VERSION"))
        .await
        .map_err(|e| anyhow!("creating service: {e}"))?;
    let mut endpoint = service
        .group(AUTH_CALLOUT_GROUP)
        .endpoint(AUTH_CALLOUT_ENDPOINT)
        .await
        .map_err(|e| anyhow!("adding endpoint: {e}"))?;

    let handler = Arc::new(Handler::new(keys, users, bearer));
    tracing::info!(
        subject = "$SYS.REQ.USER.AUTH",
        "service started, waiting for requests"
    );

    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);
    loop {
        tokio::select! {
            request = endpoint.next() => {
                let Some(request) = request else { break };
                let handler = Arc::clone(&handler);
                tokio::spawn(async move {
                    handle_request(&handler, request).await;
                });
            }
            _ = &mut shutdown => {
                tracing::info!("received shutdown signal");
                break;
            }
        }
    }

    match tokio::time::timeout(DRAIN_GRACE, async {
        if let Err(e) = service.stop().await {
            tracing::warn!(error = %e, "stopping service");
        }
        if let Err(e) = client.drain().await {
            tracing::warn!(error = %e, "draining broker connection");
        }
    })
    .await
    {
        Ok(()) => tracing::info!("shut down cleanly"),
        Err(_) => tracing::warn!("grace period elapsed before drain completed"),
    }
    Ok(())
}

/// Answer one callout request. Publish failures are logged and dropped;
/// the broker re-issues the callout on the client's next attempt.
async fn handle_request(handler: &Handler, request: async_nats::service::Request) {
    let peer = peer_xkey(request.message.headers.as_ref());
    let reply = handler.respond_to(&request.message.payload, peer.as_deref());
    if let Err(e) = request.respond(Ok(reply.into())).await {
        tracing::error!(error = %e, "publishing authorization reply");
    }
}

/// Case-insensitive lookup of the peer curve key header.
fn peer_xkey(headers: Option<&HeaderMap>) -> Option<String> {
    let headers = headers?;
    headers
        .iter()
        .find(|(name, _)| {
            let name: &str = name.as_ref();
            name.eq_ignore_ascii_case(PEER_XKEY_HEADER)
        })
        .and_then(|(_, values)| values.first())
        .map(|value| value.as_str().to_string())
}
