//! Session lifecycle: owns the credential store and coalesces refreshes.

use std::sync::Arc;

use futures::future::{BoxFuture, Shared};
use futures::FutureExt;
use tokio::sync::Mutex;
use tracing::{debug, error, warn};

use crate::credentials::CredentialPair;
use crate::error::{AuthError, StoreError};
use crate::refresh::RefreshClient;
use crate::store::CredentialStore;

type SharedRefresh = Shared<BoxFuture<'static, Result<(), AuthError>>>;

/// In-flight refresh slot. The generation counter lets a finished waiter
/// clear only the refresh it actually awaited, not one started later.
#[derive(Default)]
struct RefreshGate {
    generation: u64,
    inflight: Option<SharedRefresh>,
}

/// Owns the credential store and the refresh client for one logical session.
///
/// Every service client built on top of the same manager shares its refresh
/// coalescing: no matter how many requests hit an unauthorized response at
/// once, at most one refresh call is in flight process-wide.
pub struct SessionManager {
    store: Arc<dyn CredentialStore>,
    refresher: RefreshClient,
    gate: Mutex<RefreshGate>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn CredentialStore>, refresher: RefreshClient) -> Self {
        Self {
            store,
            refresher,
            gate: Mutex::new(RefreshGate::default()),
        }
    }

    /// Current access token, if a session is stored.
    pub fn access_token(&self) -> Result<Option<String>, StoreError> {
        Ok(self.store.get()?.map(|pair| pair.access_token))
    }

    /// Installs a freshly issued pair (login or registration).
    pub fn sign_in(&self, pair: &CredentialPair) -> Result<(), StoreError> {
        self.store.set(pair)
    }

    /// Drops the stored session.
    pub fn sign_out(&self) -> Result<(), StoreError> {
        self.store.clear()
    }

    /// Exchanges the stored refresh token for a new pair, coalescing
    /// concurrent callers onto a single network call.
    ///
    /// The first caller installs a shared future; everyone arriving while it
    /// is pending awaits that same future and sees the same outcome. The
    /// slot is cleared after resolution, so a later failure starts a new
    /// refresh rather than replaying a stale result.
    ///
    /// Terminal failures (refresh token missing or refused) purge the store
    /// before surfacing; transport and storage trouble leaves it intact.
    pub async fn refresh(&self) -> Result<(), AuthError> {
        let (generation, fut) = {
            let mut gate = self.gate.lock().await;
            if let Some(fut) = gate.inflight.clone() {
                debug!("refresh already in flight, attaching");
                (gate.generation, fut)
            } else {
                gate.generation += 1;
                let fut = Self::run_refresh(self.store.clone(), self.refresher.clone())
                    .boxed()
                    .shared();
                gate.inflight = Some(fut.clone());
                (gate.generation, fut)
            }
        };

        let outcome = fut.await;

        let mut gate = self.gate.lock().await;
        if gate.generation == generation {
            gate.inflight = None;
        }
        drop(gate);

        outcome
    }

    async fn run_refresh(
        store: Arc<dyn CredentialStore>,
        refresher: RefreshClient,
    ) -> Result<(), AuthError> {
        let refresh_token = match store.get()? {
            Some(pair) if pair.has_refresh_token() => pair.refresh_token,
            _ => {
                warn!("no refresh token stored; ending session");
                purge(&store);
                return Err(AuthError::MissingRefreshToken);
            }
        };

        match refresher.refresh(&refresh_token).await {
            Ok(grant) => {
                store.set(&grant.into_pair())?;
                debug!("token refresh succeeded");
                Ok(())
            }
            Err(e) if e.is_terminal() => {
                error!("token refresh rejected; ending session: {}", e);
                purge(&store);
                Err(e)
            }
            Err(e) => {
                warn!("token refresh failed: {}", e);
                Err(e)
            }
        }
    }
}

fn purge(store: &Arc<dyn CredentialStore>) {
    if let Err(e) = store.clear() {
        error!("failed to clear credential store: {}", e);
    }
}
