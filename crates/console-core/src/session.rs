//! Session lifecycle
//!
//! The `SessionStore` owns the credential token and the resolved user
//! identity. It is the single writer for both: consumers read state through
//! its accessors and never mutate token or user directly.
//!
//! ## State machine (token × user)
//!
//! ```text
//! UNAUTHENTICATED (token absent, user absent)
//!     --login / create-account--> VALIDATING (token present, user absent)
//! VALIDATING
//!     --identity fetch ok-->      AUTHENTICATED (token present, user present)
//!     --identity fetch fails-->   UNAUTHENTICATED
//! AUTHENTICATED
//!     --logout-->                 UNAUTHENTICATED
//!     --any call returns 401-->   UNAUTHENTICATED
//! ```
//!
//! `Validating` matters to consumers guarding a protected view: while the
//! token is present but the user is still unresolved they must show a neutral
//! loading state, not redirect to login.
//!
//! ## Stale-response guard
//!
//! Every token mutation bumps a session *generation*. Async operations
//! snapshot the generation before suspending and discard their result if it
//! has moved on, so a slow identity or domain response issued under an old
//! token can never repopulate state after de-authentication.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::traits::api::{ConsoleApi, User};
use crate::traits::token_store::TokenStore;

/// Server-side limit on username length, checked client-side before the call
const MAX_USERNAME_LEN: usize = 64;

/// Where the session currently sits in the token × user state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    /// No token held
    Unauthenticated,
    /// Token held, identity not yet confirmed
    Validating,
    /// Token held and identity confirmed
    Authenticated,
}

#[derive(Debug)]
struct SessionState {
    token: Option<String>,
    user: Option<User>,
    generation: u64,
}

/// Owner of the session credential and resolved identity
///
/// Cheap to clone; clones share the same underlying state.
#[derive(Clone)]
pub struct SessionStore {
    token_store: Arc<dyn TokenStore>,
    state: Arc<RwLock<SessionState>>,
}

impl std::fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // The token never appears in Debug output
        f.debug_struct("SessionStore").finish_non_exhaustive()
    }
}

impl SessionStore {
    /// Create a session store backed by the given token store
    ///
    /// The session starts unauthenticated; call [`initialize`] to pick up a
    /// persisted token.
    ///
    /// [`initialize`]: SessionStore::initialize
    pub fn new(token_store: Arc<dyn TokenStore>) -> Self {
        Self {
            token_store,
            state: Arc::new(RwLock::new(SessionState {
                token: None,
                user: None,
                generation: 0,
            })),
        }
    }

    /// Read the persisted token, if any
    ///
    /// Does not fetch the user: a present token only moves the session to
    /// `Validating`, and the caller follows up with [`revalidate_user`].
    ///
    /// [`revalidate_user`]: SessionStore::revalidate_user
    pub async fn initialize(&self) -> Result<SessionStatus> {
        let token = self.token_store.load().await?;

        let mut state = self.state.write().await;
        state.token = token;
        state.user = None;
        state.generation += 1;

        let status = if state.token.is_some() {
            debug!("session initialized with persisted token");
            SessionStatus::Validating
        } else {
            debug!("session initialized unauthenticated");
            SessionStatus::Unauthenticated
        };
        Ok(status)
    }

    /// The current bearer token, if any
    pub async fn token(&self) -> Option<String> {
        self.state.read().await.token.clone()
    }

    /// The resolved identity, if the session is authenticated
    pub async fn user(&self) -> Option<User> {
        self.state.read().await.user.clone()
    }

    /// Current position in the session state machine
    pub async fn status(&self) -> SessionStatus {
        let state = self.state.read().await;
        match (&state.token, &state.user) {
            (None, _) => SessionStatus::Unauthenticated,
            (Some(_), None) => SessionStatus::Validating,
            (Some(_), Some(_)) => SessionStatus::Authenticated,
        }
    }

    /// The session generation, bumped on every token mutation
    ///
    /// Operations that suspend snapshot this value and discard their result
    /// when it no longer matches on resume.
    pub async fn generation(&self) -> u64 {
        self.state.read().await.generation
    }

    /// Replace the token, persisting the change before returning
    ///
    /// The in-memory state change and the durable write both complete before
    /// this returns, ahead of any network validation, so a reload
    /// mid-validation still finds the token. Any token mutation resets the
    /// resolved user: a new token means an unconfirmed identity.
    pub async fn set_token(&self, token: Option<String>) -> Result<()> {
        {
            let mut state = self.state.write().await;
            state.token = token.clone();
            state.user = None;
            state.generation += 1;
        }

        match token {
            Some(t) => self.token_store.store(&t).await,
            None => self.token_store.clear().await,
        }
    }

    /// Log in, storing the issued token on success
    ///
    /// Leaves the session in `Validating`; follow up with
    /// [`revalidate_user`].
    ///
    /// [`revalidate_user`]: SessionStore::revalidate_user
    pub async fn login(&self, api: &dyn ConsoleApi, username: &str, password: &str) -> Result<()> {
        check_username(username)?;
        let token = api.login(username, password).await?;
        self.set_token(Some(token)).await?;
        info!("logged in as '{}'", username);
        Ok(())
    }

    /// Create an account, storing the issued token on success
    pub async fn create_account(
        &self,
        api: &dyn ConsoleApi,
        username: &str,
        password: &str,
    ) -> Result<()> {
        check_username(username)?;
        let token = api.create_account(username, password).await?;
        self.set_token(Some(token)).await?;
        info!("created account '{}'", username);
        Ok(())
    }

    /// Confirm the held token against the server
    ///
    /// On success the decoded identity becomes the session user. On any
    /// failure — wrong status or transport — the ambiguity is resolved by
    /// de-authenticating, never by retrying silently or leaving stale state.
    ///
    /// Runs at most once per token transition: the user is cleared on every
    /// token mutation, so an already-resolved user means this generation has
    /// been validated and the call is a no-op.
    pub async fn revalidate_user(&self, api: &dyn ConsoleApi) -> SessionStatus {
        let (token, generation) = {
            let state = self.state.read().await;
            if state.user.is_some() {
                return SessionStatus::Authenticated;
            }
            (state.token.clone(), state.generation)
        };

        let Some(token) = token else {
            return SessionStatus::Unauthenticated;
        };

        match api.fetch_user(&token).await {
            Ok(user) => {
                {
                    let mut state = self.state.write().await;
                    if state.generation == generation {
                        debug!("identity confirmed: '{}'", user.username);
                        state.user = Some(user);
                        return SessionStatus::Authenticated;
                    }
                }
                debug!("discarding identity response from a superseded session");
                self.status().await
            }
            Err(e) => {
                debug!("identity fetch failed ({}), de-authenticating", e);
                if self.generation().await == generation {
                    self.invalidate().await;
                }
                self.status().await
            }
        }
    }

    /// Terminate the session
    ///
    /// The server-side logout call is best-effort; the local session is
    /// cleared unconditionally regardless of its outcome. Logout cannot fail
    /// from the caller's perspective.
    pub async fn logout(&self, api: &dyn ConsoleApi) {
        let token = self.token().await;
        if let Some(token) = token {
            if let Err(e) = api.logout(&token).await {
                warn!("server logout failed (ignored): {}", e);
            }
        }
        self.invalidate().await;
        info!("logged out");
    }

    /// Force the session to `Unauthenticated`
    ///
    /// The shared de-auth path: failed revalidation and 401 responses from
    /// any authenticated call land here. Idempotent. Persisted-storage
    /// erasure is best-effort; the in-memory session is cleared regardless.
    pub async fn invalidate(&self) {
        {
            let mut state = self.state.write().await;
            state.token = None;
            state.user = None;
            state.generation += 1;
        }
        if let Err(e) = self.token_store.clear().await {
            warn!("failed to erase persisted token (ignored): {}", e);
        }
    }
}

fn check_username(username: &str) -> Result<()> {
    if username.is_empty() {
        return Err(Error::config("username cannot be empty"));
    }
    if username.len() > MAX_USERNAME_LEN {
        return Err(Error::config(format!(
            "username too long: {} bytes (max {})",
            username.len(),
            MAX_USERNAME_LEN
        )));
    }
    Ok(())
}
