//! The per-session domain collection
//!
//! An ordered sequence of [`Domain`] records, order as returned by the
//! server. Exclusively owned by the active session: loaded wholesale once per
//! session, then mutated element-wise with results already confirmed by the
//! editor. The collection itself never speculatively contacts the server
//! beyond [`load`].
//!
//! [`load`]: DomainCollection::load

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

use crate::error::{Error, Result};
use crate::session::SessionStore;
use crate::traits::api::{ConsoleApi, Domain};

/// Result of a [`DomainCollection::load`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The collection was replaced from the server
    Loaded {
        /// Number of domains fetched
        count: usize,
    },
    /// This session generation was already loaded; nothing was fetched
    AlreadyLoaded,
    /// The session changed while the request was in flight; the response
    /// was dropped
    Discarded,
}

#[derive(Debug, Default)]
struct CollectionState {
    domains: Vec<Domain>,
    /// Session generation the collection was loaded under, if any
    loaded_generation: Option<u64>,
}

/// In-memory list of domain resources for the current session
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Debug, Clone, Default)]
pub struct DomainCollection {
    inner: Arc<RwLock<CollectionState>>,
}

impl DomainCollection {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the full domain list, replacing the collection wholesale
    ///
    /// Requires an authenticated session. Runs exactly once per session
    /// generation: a repeat call under the same generation reports
    /// [`LoadOutcome::AlreadyLoaded`] without touching the network, and a
    /// response that resolves after the session has moved on is dropped as
    /// [`LoadOutcome::Discarded`].
    ///
    /// A 401 invalidates the session before the error is returned.
    pub async fn load(
        &self,
        api: &dyn ConsoleApi,
        session: &SessionStore,
    ) -> Result<LoadOutcome> {
        let Some(token) = session.token().await else {
            return Err(Error::Unauthorized);
        };
        let generation = session.generation().await;

        if self.inner.read().await.loaded_generation == Some(generation) {
            return Ok(LoadOutcome::AlreadyLoaded);
        }

        match api.list_domains(&token).await {
            Ok(domains) => {
                let mut state = self.inner.write().await;
                if session.generation().await != generation {
                    debug!("discarding domain list from a superseded session");
                    return Ok(LoadOutcome::Discarded);
                }
                let count = domains.len();
                state.domains = domains;
                state.loaded_generation = Some(generation);
                debug!("loaded {} domain(s)", count);
                Ok(LoadOutcome::Loaded { count })
            }
            Err(e) => {
                if e.is_unauthorized() && session.generation().await == generation {
                    session.invalidate().await;
                }
                Err(e)
            }
        }
    }

    /// Look up a domain by name
    ///
    /// An absent name always yields `None`, which callers interpret as "show
    /// overview", not as an error.
    pub async fn find_by_name(&self, name: Option<&str>) -> Option<Domain> {
        let name = name?;
        let state = self.inner.read().await;
        state.domains.iter().find(|d| d.name == name).cloned()
    }

    /// Replace the element with the matching name
    ///
    /// No-op if the name is absent from the collection.
    pub async fn replace(&self, name: &str, updated: Domain) {
        let mut state = self.inner.write().await;
        if let Some(slot) = state.domains.iter_mut().find(|d| d.name == name) {
            *slot = updated;
        }
    }

    /// Remove the element with the matching name (no-op if absent)
    pub async fn remove(&self, name: &str) {
        let mut state = self.inner.write().await;
        state.domains.retain(|d| d.name != name);
    }

    /// Snapshot of the collection in server order
    pub async fn all(&self) -> Vec<Domain> {
        self.inner.read().await.domains.clone()
    }

    /// Number of domains currently held
    pub async fn len(&self) -> usize {
        self.inner.read().await.domains.len()
    }

    /// Whether the collection is empty
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.domains.is_empty()
    }
}
