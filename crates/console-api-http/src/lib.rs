// # HTTP Console API
//
// This crate implements the `ConsoleApi` trait over the console service's
// REST surface using reqwest.
//
// ## Behavior
//
// - One HTTP request per trait call; no retries, no caching, no background
//   tasks — failure handling is owned by the session and editor layers
// - Bearer auth on every authenticated call
// - Per-endpoint status mapping into the core error taxonomy:
//   login non-200 → `InvalidCredentials`, create-account non-200 →
//   `UserExists`, 401 → `Unauthorized`, update 400 → `InvalidFormat`,
//   anything else → `Api { status }`, transport failures → `Transport`
// - Logout ignores the response entirely (best-effort by contract)
//
// ## Wire details
//
// Login and account creation send JSON `{username, password}` and receive
// the raw token string as the response body. Field updates PUT the raw
// address string with the target field in the `?type=` query parameter.

use async_trait::async_trait;
use std::time::Duration;

use console_core::error::{Error, Result};
use console_core::traits::api::{ConsoleApi, Domain, RecordField, ServiceInfo, User};

/// Default HTTP timeout for API requests (30 seconds)
const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// reqwest-backed console API client
///
/// Holds no session state: the bearer token is an argument to every
/// authenticated call.
pub struct HttpConsoleApi {
    /// Service base URL without a trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

impl std::fmt::Debug for HttpConsoleApi {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpConsoleApi")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl HttpConsoleApi {
    /// Create a client for the service at `base_url` with the default timeout
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_HTTP_TIMEOUT)
    }

    /// Create a client with an explicit request timeout
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::transport(format!("failed to build HTTP client: {}", e)))?;

        let base_url = base_url.into().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(Error::config("API base URL cannot be empty"));
        }

        Ok(Self { base_url, client })
    }

    /// The configured service base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST credentials, mapping every non-200 to `rejection`
    async fn credential_request(
        &self,
        path: &str,
        username: &str,
        password: &str,
        rejection: fn() -> Error,
    ) -> Result<String> {
        let response = self
            .client
            .post(self.url(path))
            .json(&serde_json::json!({
                "username": username,
                "password": password,
            }))
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        if response.status().as_u16() != 200 {
            return Err(rejection());
        }

        let token = response
            .text()
            .await
            .map_err(|e| Error::transport(format!("failed to read token response: {}", e)))?;
        Ok(token.trim().to_string())
    }
}

/// Map a non-success status on an authenticated call
fn status_error(status: u16) -> Error {
    match status {
        400 => Error::InvalidFormat,
        401 => Error::Unauthorized,
        other => Error::api(other),
    }
}

#[async_trait]
impl ConsoleApi for HttpConsoleApi {
    async fn login(&self, username: &str, password: &str) -> Result<String> {
        tracing::debug!("POST /api/auth/login for '{}'", username);
        self.credential_request("/api/auth/login", username, password, || {
            Error::InvalidCredentials
        })
        .await
    }

    async fn create_account(&self, username: &str, password: &str) -> Result<String> {
        tracing::debug!("POST /api/auth/create-account for '{}'", username);
        self.credential_request("/api/auth/create-account", username, password, || {
            Error::UserExists
        })
        .await
    }

    async fn fetch_user(&self, token: &str) -> Result<User> {
        let response = self
            .client
            .get(self.url("/api/auth/user"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(status_error(status));
        }

        response
            .json()
            .await
            .map_err(|e| Error::transport(format!("failed to decode identity response: {}", e)))
    }

    async fn logout(&self, token: &str) -> Result<()> {
        // Response status is ignored by contract
        self.client
            .post(self.url("/api/auth/logout"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;
        Ok(())
    }

    async fn list_domains(&self, token: &str) -> Result<Vec<Domain>> {
        let response = self
            .client
            .get(self.url("/api/domains"))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(status_error(status));
        }

        response
            .json()
            .await
            .map_err(|e| Error::transport(format!("failed to decode domain list: {}", e)))
    }

    async fn update_record(
        &self,
        token: &str,
        name: &str,
        field: RecordField,
        value: &str,
    ) -> Result<()> {
        tracing::debug!("PUT /api/domains/{}?type={}", name, field);
        let response = self
            .client
            .put(self.url(&format!("/api/domains/{}", name)))
            .query(&[("type", field.as_str())])
            .bearer_auth(token)
            .body(value.to_string())
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(status_error(status));
        }
        Ok(())
    }

    async fn delete_domain(&self, token: &str, name: &str) -> Result<()> {
        tracing::debug!("DELETE /api/domains/{}", name);
        let response = self
            .client
            .delete(self.url(&format!("/api/domains/{}", name)))
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(status_error(status));
        }
        Ok(())
    }

    async fn service_info(&self) -> Result<ServiceInfo> {
        let response = self
            .client
            .get(self.url("/api/info"))
            .send()
            .await
            .map_err(|e| Error::transport(format!("HTTP request failed: {}", e)))?;

        let status = response.status().as_u16();
        if status != 200 {
            return Err(Error::api(status));
        }

        response
            .json()
            .await
            .map_err(|e| Error::transport(format!("failed to decode service info: {}", e)))
    }
}
