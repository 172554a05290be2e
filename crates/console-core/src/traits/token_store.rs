// # Token Store Trait
//
// Defines the interface for persisting the session credential.
//
// ## Purpose
//
// The token store holds exactly one durable value: the raw bearer token
// string. Its presence across process restarts is what keeps a session alive
// through reloads; its absence means unauthenticated. No other client state
// is persisted.
//
// ## Implementations
//
// - File-based: single token file with atomic writes
// - In-memory: for tests and ephemeral sessions

use async_trait::async_trait;

/// Trait for token store implementations
///
/// All methods must be safe to call concurrently from multiple tasks.
///
/// The `SessionStore` is the single writer: it persists on every token
/// mutation, synchronously with the in-memory state change, so a reload
/// mid-validation still finds the token.
#[async_trait]
pub trait TokenStore: Send + Sync {
    /// Load the persisted token
    ///
    /// # Returns
    ///
    /// - `Ok(Some(String))`: a token is persisted
    /// - `Ok(None)`: no token persisted (unauthenticated)
    /// - `Err(Error)`: storage error
    async fn load(&self) -> Result<Option<String>, crate::Error>;

    /// Persist a token, replacing any previous one
    async fn store(&self, token: &str) -> Result<(), crate::Error>;

    /// Erase the persisted token (no-op if none is persisted)
    async fn clear(&self) -> Result<(), crate::Error>;
}
