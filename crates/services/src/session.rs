//! Session tracking and the sign-in profile upsert.

use std::sync::Arc;

use domains::{BoardStore, IdentityProvider, Principal, Result, UserProfile};
use tokio::sync::watch;
use tracing::{info, warn};

/// Tracks the single authenticated principal for this client.
///
/// Sign-in itself is delegated to the configured identity provider; what
/// this service adds is the denormalized profile upsert. The upsert is
/// best-effort: session establishment never fails because the profile write
/// did.
pub struct SessionService {
    provider: Arc<dyn IdentityProvider>,
    store: Arc<dyn BoardStore>,
}

impl SessionService {
    pub fn new(provider: Arc<dyn IdentityProvider>, store: Arc<dyn BoardStore>) -> Self {
        Self { provider, store }
    }

    /// Runs the delegated sign-in flow and upserts the profile snapshot.
    pub async fn sign_in(&self) -> Result<Principal> {
        let principal = self.provider.sign_in().await?;
        info!(uid = %principal.uid, "signed in");
        let profile = UserProfile::from_principal(&principal);
        if let Err(e) = self.store.upsert_profile(&profile).await {
            warn!(uid = %principal.uid, error = %e, "profile upsert failed; session kept");
        }
        Ok(principal)
    }

    /// Clears the session. Local state clears without waiting on the
    /// provider's remote invalidation.
    pub async fn sign_out(&self) -> Result<()> {
        info!("signing out");
        self.provider.sign_out().await
    }

    /// Push-based view of the current principal (or absence).
    pub fn sessions(&self) -> watch::Receiver<Option<Principal>> {
        self.provider.sessions()
    }

    /// The principal as of now.
    pub fn current(&self) -> Option<Principal> {
        self.provider.sessions().borrow().clone()
    }
}
