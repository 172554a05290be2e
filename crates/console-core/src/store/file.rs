// # File Token Store
//
// File-based implementation of TokenStore.
//
// ## Purpose
//
// Persists the bearer token across process restarts, so a reload
// mid-validation still finds the credential and the session survives.
//
// ## File Format
//
// The file holds the raw token string, nothing else. A missing or empty file
// means unauthenticated. There is no backup file: the token is a single
// opaque line and recovery from loss is simply logging in again.
//
// ## Durability
//
// Writes go to a temporary file first and are moved into place with an
// atomic rename, so a crash mid-write never leaves a truncated token behind.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::traits::token_store::TokenStore;

/// File-based token store with atomic writes
///
/// # Example
///
/// ```rust,no_run
/// use console_core::store::FileTokenStore;
/// use console_core::traits::TokenStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileTokenStore::new("/home/user/.config/dns-console/token");
///
///     store.store("abc").await?;
///     assert_eq!(store.load().await?, Some("abc".to_string()));
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    /// Create a token store backed by the given path
    ///
    /// The file (and its parent directory) is created lazily on the first
    /// `store()`.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// The path this store persists to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get path to temporary file for atomic writes
    fn temp_path(&self) -> PathBuf {
        let mut temp = self.path.clone();
        temp.set_extension("tmp");
        temp
    }
}

#[async_trait]
impl TokenStore for FileTokenStore {
    async fn load(&self) -> Result<Option<String>, Error> {
        let content = match fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("token file does not exist: {}", self.path.display());
                return Ok(None);
            }
            Err(e) => {
                return Err(Error::token_store(format!(
                    "failed to read token file {}: {}",
                    self.path.display(),
                    e
                )));
            }
        };

        let token = content.trim();
        if token.is_empty() {
            return Ok(None);
        }
        Ok(Some(token.to_string()))
    }

    async fn store(&self, token: &str) -> Result<(), Error> {
        // Create parent directory if it doesn't exist
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).await.map_err(|e| {
                    Error::token_store(format!(
                        "failed to create token directory {}: {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        // Write to temporary file first
        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::token_store(format!(
                    "failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(token.as_bytes()).await.map_err(|e| {
                Error::token_store(format!(
                    "failed to write temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.flush().await.map_err(|e| {
                Error::token_store(format!(
                    "failed to flush temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        // Atomic rename (temp -> actual)
        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::token_store(format!(
                "failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!("token written to {}", self.path.display());
        Ok(())
    }

    async fn clear(&self) -> Result<(), Error> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(Error::token_store(format!(
                "failed to remove token file {}: {}",
                self.path.display(),
                e
            ))),
        }
    }
}
