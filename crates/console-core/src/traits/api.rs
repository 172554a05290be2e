// # Console API Trait
//
// Defines the interface to the console's REST surface.
//
// The trait is transport-agnostic: `console-api-http` implements it over
// reqwest, and the contract tests script it directly. The bearer token is an
// explicit argument to every authenticated call so the transport never holds
// session state of its own — the `SessionStore` is the single owner of the
// credential.
//
// ## Endpoints
//
// | Operation        | Method & path                          | Auth   |
// |------------------|----------------------------------------|--------|
// | `login`          | POST /api/auth/login                   | none   |
// | `create_account` | POST /api/auth/create-account          | none   |
// | `fetch_user`     | GET /api/auth/user                     | bearer |
// | `logout`         | POST /api/auth/logout                  | bearer |
// | `list_domains`   | GET /api/domains                       | bearer |
// | `update_record`  | PUT /api/domains/{name}?type={ipv4,6}  | bearer |
// | `delete_domain`  | DELETE /api/domains/{name}             | bearer |
// | `service_info`   | GET /api/info                          | none   |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{Error, Result};

/// Resolved identity of the logged-in account.
///
/// Immutable from the client's perspective within a session; replaced
/// wholesale when re-fetched. `created` is kept as the server-formatted
/// string, it is display-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Unique, server-assigned identity
    pub username: String,
    /// Account creation timestamp as returned by the server
    pub created: String,
}

/// A named DNS entry with independently editable address fields.
///
/// `name` is the resource key and never changes after creation (rename is
/// unsupported by the service).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Domain {
    /// Resource key, unique within the collection, case as returned by server
    pub name: String,
    /// IPv4 address, independently nullable
    pub ipv4: Option<String>,
    /// IPv6 address, independently nullable
    pub ipv6: Option<String>,
}

impl Domain {
    /// Apply a confirmed field delta, returning a new record
    ///
    /// This is the only way address fields change on a `Domain`: the caller
    /// replaces the old record with the returned one after the server has
    /// accepted the value.
    pub fn with_field(&self, field: RecordField, value: impl Into<String>) -> Self {
        let mut updated = self.clone();
        match field {
            RecordField::Ipv4 => updated.ipv4 = Some(value.into()),
            RecordField::Ipv6 => updated.ipv6 = Some(value.into()),
        }
        updated
    }

    /// Read the given address field
    pub fn field(&self, field: RecordField) -> Option<&str> {
        match field {
            RecordField::Ipv4 => self.ipv4.as_deref(),
            RecordField::Ipv6 => self.ipv6.as_deref(),
        }
    }
}

/// Which address field of a domain an update targets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// The IPv4 address (A record)
    Ipv4,
    /// The IPv6 address (AAAA record)
    Ipv6,
}

impl RecordField {
    /// Wire name used in the `?type=` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordField::Ipv4 => "ipv4",
            RecordField::Ipv6 => "ipv6",
        }
    }
}

impl std::fmt::Display for RecordField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "ipv4" => Ok(RecordField::Ipv4),
            "ipv6" => Ok(RecordField::Ipv6),
            other => Err(Error::config(format!(
                "unknown record field '{}', expected 'ipv4' or 'ipv6'",
                other
            ))),
        }
    }
}

/// Display-only service metadata from `GET /api/info`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceInfo {
    /// The DNS zone all console domains live under (may carry a root dot)
    pub dns_zone: String,
}

impl ServiceInfo {
    /// Zone suffix suitable for display, without the trailing root dot
    pub fn zone_display(&self) -> &str {
        self.dns_zone.strip_suffix('.').unwrap_or(&self.dns_zone)
    }
}

/// Trait for console API implementations
///
/// Implementations must be thread-safe and usable across async tasks. They
/// are single-shot request/response: no retries, no caching, no background
/// tasks — failure handling is owned by the session and editor layers.
#[async_trait]
pub trait ConsoleApi: Send + Sync {
    /// Log in with a username and password
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the raw bearer token issued by the server
    /// - `Err(Error::InvalidCredentials)`: the server rejected the credentials
    async fn login(&self, username: &str, password: &str) -> Result<String>;

    /// Create a new account, returning a freshly issued bearer token
    ///
    /// # Returns
    ///
    /// - `Ok(String)`: the raw bearer token
    /// - `Err(Error::UserExists)`: the username is taken
    async fn create_account(&self, username: &str, password: &str) -> Result<String>;

    /// Fetch the identity behind a bearer token
    ///
    /// Any error here means the token could not be confirmed; callers resolve
    /// that ambiguity by de-authenticating, never by retrying silently.
    async fn fetch_user(&self, token: &str) -> Result<User>;

    /// Invalidate the session server-side
    ///
    /// Best-effort: implementations swallow the response entirely and only
    /// surface transport construction failures.
    async fn logout(&self, token: &str) -> Result<()>;

    /// Fetch the full domain list owned by the session
    async fn list_domains(&self, token: &str) -> Result<Vec<Domain>>;

    /// Update one address field of one domain
    ///
    /// The value is sent as the raw request body.
    ///
    /// # Returns
    ///
    /// - `Ok(())`: the server accepted and stored the value
    /// - `Err(Error::InvalidFormat)`: the value failed format validation (400)
    /// - `Err(Error::Unauthorized)`: the token was rejected (401)
    async fn update_record(
        &self,
        token: &str,
        name: &str,
        field: RecordField,
        value: &str,
    ) -> Result<()>;

    /// Delete a domain
    async fn delete_domain(&self, token: &str, name: &str) -> Result<()>;

    /// Fetch display-only service metadata (no auth required)
    async fn service_info(&self) -> Result<ServiceInfo>;
}
