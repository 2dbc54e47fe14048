//! # CampusFound Binary
//!
//! The entry point that assembles the board client from the configured
//! backends. Presentation lives elsewhere; this process signs in, keeps the
//! post mirror live, and logs mirror transitions until interrupted.

use std::sync::Arc;

use anyhow::Context;
use configs::{AuthSettings, MediaSettings, Settings, StoreSettings};
use domains::{BoardStore, IdentityProvider, MediaHost, Principal};
use services::{BoardClient, SyncPhase};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("loading configuration")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(settings.log.filter.clone())),
        )
        .init();

    // 1. Document store
    let store: Arc<dyn BoardStore> = match settings.store {
        #[cfg(feature = "store-rest")]
        StoreSettings::Rest {
            base_url,
            api_key,
            poll_secs,
        } => {
            use secrecy::ExposeSecret;
            info!(%base_url, "using hosted document store");
            Arc::new(storage_adapters::RestBoardStore::new(
                base_url,
                api_key.expose_secret(),
                std::time::Duration::from_secs(poll_secs),
            ))
        }
        StoreSettings::Memory => {
            info!("using in-process document store");
            Arc::new(storage_adapters::MemoryBoardStore::new())
        }
    };

    // 2. Image host
    let media: Arc<dyn MediaHost> = match settings.media {
        #[cfg(feature = "media-imgbb")]
        MediaSettings::Imgbb { endpoint, api_key } => {
            use secrecy::ExposeSecret;
            info!(%endpoint, "using hosted image host");
            Arc::new(storage_adapters::HttpMediaHost::new(
                endpoint,
                api_key.expose_secret(),
            ))
        }
        MediaSettings::Memory => Arc::new(storage_adapters::MemoryMediaHost::new()),
    };

    // 3. Identity provider
    let provider: Arc<dyn IdentityProvider> = match settings.auth {
        #[cfg(feature = "auth-oidc")]
        AuthSettings::Oidc {
            issuer,
            client_id,
            token_secret,
        } => {
            use secrecy::ExposeSecret;
            info!(%issuer, "using campus identity gateway");
            Arc::new(auth_adapters::OidcIdentityProvider::new(
                auth_adapters::OidcConfig {
                    issuer,
                    client_id,
                    token_secret: token_secret.expose_secret().to_string(),
                },
            ))
        }
        AuthSettings::Dev {
            uid,
            display_name,
            email,
        } => Arc::new(auth_adapters::DevIdentityProvider::new(Principal {
            uid,
            display_name,
            email,
            photo_url: None,
        })),
    };

    // 4. Assemble and run
    let client = BoardClient::new(store, media, provider);
    let principal = client.session.sign_in().await?;
    info!(uid = %principal.uid, "session established");

    let mut mirror = client.sync.mirror();
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = mirror.changed() => {
                if changed.is_err() {
                    break;
                }
                let current = mirror.borrow_and_update().clone();
                match &current.phase {
                    SyncPhase::Loading => info!("mirror loading"),
                    SyncPhase::Live => info!(posts = current.posts.len(), "mirror updated"),
                    SyncPhase::Degraded { reason } => {
                        warn!(%reason, posts = current.posts.len(), "mirror degraded")
                    }
                }
            }
        }
    }

    client.sync.shutdown();
    client.session.sign_out().await?;
    Ok(())
}
