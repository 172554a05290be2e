// # Memory Token Store
//
// In-memory implementation of TokenStore.
//
// ## Purpose
//
// Holds the token for the lifetime of the process only. A restart always
// comes up unauthenticated.
//
// ## When to Use
//
// - Testing environments
// - Ephemeral sessions where persistence across reloads is not wanted

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::Error;
use crate::traits::token_store::TokenStore;

/// In-memory token store implementation
///
/// # Example
///
/// ```rust,no_run
/// use console_core::store::MemoryTokenStore;
/// use console_core::traits::TokenStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryTokenStore::new();
///
///     store.store("abc").await?;
///     assert_eq!(store.load().await?, Some("abc".to_string()));
///
///     store.clear().await?;
///     assert_eq!(store.load().await?, None);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryTokenStore {
    inner: Arc<RwLock<Option<String>>>,
}

impl MemoryTokenStore {
    /// Create a new empty memory token store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store pre-seeded with a token (test convenience)
    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(token.into()))),
        }
    }
}

#[async_trait]
impl TokenStore for MemoryTokenStore {
    async fn load(&self) -> Result<Option<String>, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn store(&self, token: &str) -> Result<(), Error> {
        *self.inner.write().await = Some(token.to_string());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        *self.inner.write().await = None;
        Ok(())
    }
}
