//! Local identity provider: signs in a fixed principal instantly.
//!
//! Stands in for the campus gateway in development profiles and tests; the
//! consent flow collapses to an immediate success.

use async_trait::async_trait;
use domains::{IdentityProvider, Principal, Result};
use tokio::sync::watch;
use tracing::debug;

pub struct DevIdentityProvider {
    principal: Principal,
    sessions: watch::Sender<Option<Principal>>,
}

impl DevIdentityProvider {
    pub fn new(principal: Principal) -> Self {
        let (sessions, _) = watch::channel(None);
        Self {
            principal,
            sessions,
        }
    }
}

#[async_trait]
impl IdentityProvider for DevIdentityProvider {
    async fn sign_in(&self) -> Result<Principal> {
        debug!(uid = %self.principal.uid, "dev sign-in");
        self.sessions.send_replace(Some(self.principal.clone()));
        Ok(self.principal.clone())
    }

    async fn sign_out(&self) -> Result<()> {
        self.sessions.send_replace(None);
        Ok(())
    }

    fn sessions(&self) -> watch::Receiver<Option<Principal>> {
        self.sessions.subscribe()
    }
}
