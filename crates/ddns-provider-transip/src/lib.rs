// # TransIP DNS Registrar
//
// This crate provides a TransIP REST API v6 implementation of the
// `DnsRegistrar` trait.
//
// ## API Calls
//
// ```http
// POST  /auth                     (signed, returns a bearer token)
// GET   /domains/:domain/dns      (list entries)
// PATCH /domains/:domain/dns      {"dnsEntry": {...}}  (update content of one entry)
// POST  /domains/:domain/dns      {"dnsEntry": {...}}  (add one entry)
// ```
//
// The token is requested on first use and reused for the rest of the run.
//
// ## Constraints
//
// - One HTTP request per trait call, plus the token handshake on the first one
// - No retry logic, no backoff: errors are returned to the caller as-is
// - The private key and the bearer token never appear in logs or Debug output
//
// ## Dry-Run Mode
//
// In dry-run mode the registrar requests a read-only token, performs the
// listing, logs the PATCH/POST payload it would send and skips the write.

pub mod auth;

pub use auth::RequestSigner;

use auth::{TokenRequest, TokenResponse};
use ddns_core::config::{RegistrarConfig, RunMode};
use ddns_core::{DnsEntry, DnsRegistrar, Error, Result};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, Response, StatusCode};
use serde::{Deserialize, Serialize};
use tokio::sync::OnceCell;

/// Registrar name used in logs and errors
const PROVIDER: &str = "transip";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DnsEntriesResponse {
    dns_entries: Vec<DnsEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct DnsEntryRequest<'a> {
    dns_entry: &'a DnsEntry,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// TransIP DNS registrar
pub struct TransipRegistrar {
    /// Account login name
    account_name: String,

    /// Signs token requests
    /// ⚠️ NEVER log this value
    signer: RequestSigner,

    /// API base URL without trailing slash
    api_url: String,

    /// Whether to request a token not bound to whitelisted IPs
    global_key: bool,

    /// Bearer token, fetched on first use
    /// ⚠️ NEVER log this value
    token: OnceCell<String>,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform reads but skip PATCH/POST
    dry_run: bool,
}

// Custom Debug implementation that hides the key and token
impl std::fmt::Debug for TransipRegistrar {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransipRegistrar")
            .field("account_name", &self.account_name)
            .field("signer", &self.signer)
            .field("api_url", &self.api_url)
            .field("global_key", &self.global_key)
            .field("token", &"<REDACTED>")
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl TransipRegistrar {
    /// Create a new TransIP registrar
    ///
    /// # Parameters
    ///
    /// - `account_name`: TransIP login
    /// - `signer`: Signer holding the account's private key
    /// - `api_url`: API base URL (e.g. "https://api.transip.nl/v6")
    /// - `global_key`: Request a token usable from any IP
    /// - `timeout`: Per-request timeout
    /// - `dry_run`: If true, perform reads but skip writes
    pub fn new(
        account_name: impl Into<String>,
        signer: RequestSigner,
        api_url: impl Into<String>,
        global_key: bool,
        timeout: Duration,
        dry_run: bool,
    ) -> Result<Self> {
        let account_name = account_name.into();
        if account_name.is_empty() {
            return Err(Error::config("TransIP account name cannot be empty"));
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            account_name,
            signer,
            api_url: api_url.into().trim_end_matches('/').to_string(),
            global_key,
            token: OnceCell::new(),
            client,
            dry_run,
        })
    }

    /// Create from configuration, reading the private key from disk
    pub fn from_config(config: &RegistrarConfig, mode: RunMode) -> Result<Self> {
        match config {
            RegistrarConfig::Transip {
                account_name,
                private_key_path,
                api_url,
                global_key,
                timeout_secs,
            } => {
                let signer = RequestSigner::from_file(private_key_path)?;

                if mode.is_dry_run() {
                    tracing::warn!("TransIP registrar running in DRY-RUN mode - no changes will be made");
                }

                Self::new(
                    account_name.clone(),
                    signer,
                    api_url.clone(),
                    *global_key,
                    Duration::from_secs(*timeout_secs),
                    mode.is_dry_run(),
                )
            }
        }
    }

    fn dns_url(&self, domain: &str) -> String {
        format!("{}/domains/{}/dns", self.api_url, domain)
    }

    /// Return the cached token, requesting one on first use
    async fn token(&self) -> Result<&str> {
        self.token
            .get_or_try_init(|| self.request_token())
            .await
            .map(String::as_str)
    }

    /// Perform the signed `POST /auth` handshake
    async fn request_token(&self) -> Result<String> {
        let request = TokenRequest::new(&self.account_name, self.dry_run, self.global_key);
        let body = serde_json::to_vec(&request)?;
        let signature = self.signer.sign(&body)?;

        tracing::debug!(
            "Requesting TransIP access token (label={}, read_only={}, global_key={})",
            request.label,
            request.read_only,
            request.global_key
        );

        let response = self
            .client
            .post(format!("{}/auth", self.api_url))
            .header("Content-Type", "application/json")
            .header("Signature", signature)
            .body(body)
            .send()
            .await
            .map_err(|e| Error::http(format!("Token request failed: {}", e)))?;

        let response = check_status(response, "Token request").await?;
        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| Error::provider(PROVIDER, format!("Failed to parse token response: {}", e)))?;

        Ok(token.token)
    }

    /// Send an authenticated request and check its status
    async fn send(
        &self,
        method: Method,
        url: &str,
        payload: Option<&DnsEntryRequest<'_>>,
        what: &str,
    ) -> Result<Response> {
        let token = self.token().await?;

        let mut request = self
            .client
            .request(method, url)
            .bearer_auth(token)
            .header("Content-Type", "application/json");
        if let Some(payload) = payload {
            request = request.json(payload);
        }

        let response = request
            .send()
            .await
            .map_err(|e| Error::http(format!("{} failed: {}", what, e)))?;

        check_status(response, what).await
    }

    /// Send a write, or log it in dry-run mode
    async fn write(&self, method: Method, domain: &str, entry: &DnsEntry, what: &str) -> Result<()> {
        let url = self.dns_url(domain);
        let payload = DnsEntryRequest { dns_entry: entry };

        if self.dry_run {
            tracing::info!(
                "[DRY-RUN] Would send {} request to {} with payload: {}",
                method,
                url,
                serde_json::to_string(&payload)?
            );
            return Ok(());
        }

        self.send(method, &url, Some(&payload), what).await?;
        Ok(())
    }
}

/// Map a non-success response to an error
///
/// TransIP reports failures as `{"error": "..."}`; that message is preferred
/// over the raw body when present.
async fn check_status(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unable to read error response".to_string());
    Err(status_error(status, &body, what))
}

fn status_error(status: StatusCode, body: &str, what: &str) -> Error {
    let message = serde_json::from_str::<ApiErrorBody>(body)
        .map(|b| b.error)
        .unwrap_or_else(|_| body.to_string());

    match status.as_u16() {
        401 | 403 => Error::auth(format!(
            "{} rejected: {} (status {}). Check the account name, key and IP whitelist.",
            what, message, status
        )),
        404 => Error::not_found(format!("{}: {}", what, message)),
        409 => Error::provider(
            PROVIDER,
            format!("Conflict during {}: {} (status {})", what, message, status),
        ),
        429 => Error::rate_limited(format!(
            "{}: rate limit exceeded (status {})",
            what, status
        )),
        500..=599 => Error::provider(
            PROVIDER,
            format!("TransIP server error (transient) during {}: {} - {}", what, status, message),
        ),
        _ => Error::provider(PROVIDER, format!("{} failed: {} - {}", what, status, message)),
    }
}

#[async_trait]
impl DnsRegistrar for TransipRegistrar {
    async fn list_entries(&self, domain: &str) -> Result<Vec<DnsEntry>> {
        let url = self.dns_url(domain);
        tracing::debug!("Listing DNS entries for {}", domain);

        let response = self.send(Method::GET, &url, None, "DNS entry listing").await?;
        let listing: DnsEntriesResponse = response.json().await.map_err(|e| {
            Error::provider(PROVIDER, format!("Failed to parse DNS entry listing: {}", e))
        })?;

        Ok(listing.dns_entries)
    }

    async fn update_entry(&self, domain: &str, entry: &DnsEntry) -> Result<()> {
        self.write(Method::PATCH, domain, entry, "DNS entry update").await
    }

    async fn add_entry(&self, domain: &str, entry: &DnsEntry) -> Result<()> {
        self.write(Method::POST, domain, entry, "DNS entry creation").await
    }

    fn registrar_name(&self) -> &'static str {
        PROVIDER
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::tests::{test_key, test_key_pem};
    use ddns_core::config::DEFAULT_GLOBAL_KEY;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::io::Write;

    const TOKEN: &str = "test-bearer-token";
    const BEARER: &str = "Bearer test-bearer-token";

    fn registrar(server: &MockServer, dry_run: bool) -> TransipRegistrar {
        TransipRegistrar::new(
            "alice",
            RequestSigner::new(test_key()),
            server.base_url(),
            DEFAULT_GLOBAL_KEY,
            Duration::from_secs(5),
            dry_run,
        )
        .unwrap()
    }

    async fn mock_auth(server: &MockServer) -> httpmock::Mock<'_> {
        server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth")
                    .header_exists("Signature")
                    .json_body_partial(r#"{"login": "alice", "global_key": true}"#);
                then.status(201).json_body(json!({ "token": TOKEN }));
            })
            .await
    }

    #[tokio::test]
    async fn test_list_entries() {
        let server = MockServer::start_async().await;
        let auth = mock_auth(&server).await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/domains/example.com/dns")
                    .header("Authorization", BEARER);
                then.status(200).json_body(json!({
                    "dnsEntries": [
                        { "name": "@", "expire": 86400, "type": "A", "content": "1.1.1.1" },
                        { "name": "home", "expire": 3600, "type": "A", "content": "9.9.9.9" },
                    ]
                }));
            })
            .await;

        let entries = registrar(&server, false)
            .list_entries("example.com")
            .await
            .unwrap();

        assert_eq!(
            entries,
            vec![
                DnsEntry::new("@", 86400, "A", "1.1.1.1"),
                DnsEntry::new("home", 3600, "A", "9.9.9.9"),
            ]
        );
        auth.assert_async().await;
        list.assert_async().await;
    }

    #[tokio::test]
    async fn test_token_is_reused() {
        let server = MockServer::start_async().await;
        let auth = mock_auth(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/domains/example.com/dns");
                then.status(200).json_body(json!({ "dnsEntries": [] }));
            })
            .await;
        let add = server
            .mock_async(|when, then| {
                when.method(POST).path("/domains/example.com/dns");
                then.status(201);
            })
            .await;

        let registrar = registrar(&server, false);
        registrar.list_entries("example.com").await.unwrap();
        registrar
            .add_entry("example.com", &DnsEntry::new("home", 300, "A", "5.6.7.8"))
            .await
            .unwrap();

        assert_eq!(auth.hits_async().await, 1);
        add.assert_async().await;
    }

    #[tokio::test]
    async fn test_update_sends_patch_with_entry() {
        let server = MockServer::start_async().await;
        mock_auth(&server).await;
        let patch = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::PATCH)
                    .path("/domains/example.com/dns")
                    .header("Authorization", BEARER)
                    .json_body(json!({
                        "dnsEntry": { "name": "home", "expire": 3600, "type": "A", "content": "8.8.8.8" }
                    }));
                then.status(204);
            })
            .await;

        registrar(&server, false)
            .update_entry("example.com", &DnsEntry::new("home", 3600, "A", "8.8.8.8"))
            .await
            .unwrap();

        patch.assert_async().await;
    }

    #[tokio::test]
    async fn test_add_sends_post_with_entry() {
        let server = MockServer::start_async().await;
        mock_auth(&server).await;
        let post = server
            .mock_async(|when, then| {
                when.method(POST).path("/domains/example.com/dns").json_body(json!({
                    "dnsEntry": { "name": "home", "expire": 300, "type": "A", "content": "5.6.7.8" }
                }));
                then.status(201);
            })
            .await;

        registrar(&server, false)
            .add_entry("example.com", &DnsEntry::new("home", 300, "A", "5.6.7.8"))
            .await
            .unwrap();

        post.assert_async().await;
    }

    #[tokio::test]
    async fn test_dry_run_skips_writes() {
        let server = MockServer::start_async().await;
        let auth = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth")
                    .json_body_partial(r#"{"read_only": true}"#);
                then.status(201).json_body(json!({ "token": TOKEN }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/domains/example.com/dns");
                then.status(200).json_body(json!({ "dnsEntries": [] }));
            })
            .await;
        let patch = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::PATCH).path("/domains/example.com/dns");
                then.status(204);
            })
            .await;
        let post = server
            .mock_async(|when, then| {
                when.method(POST).path("/domains/example.com/dns");
                then.status(201);
            })
            .await;

        let registrar = registrar(&server, true);
        let entry = DnsEntry::new("home", 300, "A", "5.6.7.8");
        registrar.list_entries("example.com").await.unwrap();
        registrar.update_entry("example.com", &entry).await.unwrap();
        registrar.add_entry("example.com", &entry).await.unwrap();

        auth.assert_async().await;
        assert_eq!(patch.hits_async().await, 0);
        assert_eq!(post.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_auth_failure_maps_to_authentication_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/auth");
                then.status(401)
                    .json_body(json!({ "error": "Signature is invalid" }));
            })
            .await;
        let list = server
            .mock_async(|when, then| {
                when.method(GET).path("/domains/example.com/dns");
                then.status(200).json_body(json!({ "dnsEntries": [] }));
            })
            .await;

        let err = registrar(&server, false)
            .list_entries("example.com")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Authentication(_)));
        assert!(err.to_string().contains("Signature is invalid"));
        assert_eq!(list.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_unknown_domain_is_not_found() {
        let server = MockServer::start_async().await;
        mock_auth(&server).await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/domains/unknown.example/dns");
                then.status(404)
                    .json_body(json!({ "error": "Domain with name 'unknown.example' not found" }));
            })
            .await;

        let err = registrar(&server, false)
            .list_entries("unknown.example")
            .await
            .unwrap_err();

        assert!(matches!(err, Error::NotFound(_)));
    }

    #[tokio::test]
    async fn test_write_failure_is_not_retried() {
        let server = MockServer::start_async().await;
        mock_auth(&server).await;
        let patch = server
            .mock_async(|when, then| {
                when.method(httpmock::Method::PATCH).path("/domains/example.com/dns");
                then.status(503).body("maintenance");
            })
            .await;

        let err = registrar(&server, false)
            .update_entry("example.com", &DnsEntry::new("home", 3600, "A", "8.8.8.8"))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Provider { .. }));
        assert!(err.to_string().contains("maintenance"));
        assert_eq!(patch.hits_async().await, 1);
    }

    #[test]
    fn test_status_error_mapping() {
        assert!(matches!(
            status_error(StatusCode::FORBIDDEN, "", "x"),
            Error::Authentication(_)
        ));
        assert!(matches!(
            status_error(StatusCode::TOO_MANY_REQUESTS, "", "x"),
            Error::RateLimited(_)
        ));
        assert!(matches!(
            status_error(StatusCode::CONFLICT, "", "x"),
            Error::Provider { .. }
        ));
        assert!(matches!(
            status_error(StatusCode::NOT_FOUND, "", "x"),
            Error::NotFound(_)
        ));
    }

    #[test]
    fn test_from_config_reads_key_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(test_key_pem(&test_key()).as_bytes()).unwrap();

        let config = RegistrarConfig::transip("alice", file.path().to_string_lossy());
        let registrar = TransipRegistrar::from_config(&config, RunMode::DryRun).unwrap();

        assert!(registrar.dry_run);
        assert_eq!(registrar.api_url, "https://api.transip.nl/v6");
        assert_eq!(registrar.registrar_name(), "transip");
    }

    #[tokio::test]
    async fn test_default_config_requests_global_token() {
        let server = MockServer::start_async().await;
        let global = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth")
                    .json_body_partial(r#"{"global_key": true}"#);
                then.status(201).json_body(json!({ "token": TOKEN }));
            })
            .await;
        let whitelisted = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth")
                    .json_body_partial(r#"{"global_key": false}"#);
                then.status(401).json_body(
                    json!({ "error": "Authentication failed, your IP is not whitelisted" }),
                );
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/domains/example.com/dns");
                then.status(200).json_body(json!({ "dnsEntries": [] }));
            })
            .await;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(test_key_pem(&test_key()).as_bytes()).unwrap();
        let mut config = RegistrarConfig::transip("alice", file.path().to_string_lossy());
        let RegistrarConfig::Transip { api_url, .. } = &mut config;
        *api_url = server.base_url();

        let registrar = TransipRegistrar::from_config(&config, RunMode::Live).unwrap();
        registrar.list_entries("example.com").await.unwrap();

        assert_eq!(global.hits_async().await, 1);
        assert_eq!(whitelisted.hits_async().await, 0);
    }

    #[tokio::test]
    async fn test_whitelist_token_when_global_key_disabled() {
        let server = MockServer::start_async().await;
        let auth = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/auth")
                    .json_body_partial(r#"{"global_key": false}"#);
                then.status(201).json_body(json!({ "token": TOKEN }));
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/domains/example.com/dns");
                then.status(200).json_body(json!({ "dnsEntries": [] }));
            })
            .await;

        let registrar = TransipRegistrar::new(
            "alice",
            RequestSigner::new(test_key()),
            server.base_url(),
            false,
            Duration::from_secs(5),
            false,
        )
        .unwrap();
        registrar.list_entries("example.com").await.unwrap();

        auth.assert_async().await;
    }

    #[test]
    fn test_from_config_missing_key_fails() {
        let config = RegistrarConfig::transip("alice", "/nonexistent/transip.key");
        let err = TransipRegistrar::from_config(&config, RunMode::Live).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_secrets_not_exposed_in_debug() {
        let registrar = TransipRegistrar::new(
            "alice",
            RequestSigner::new(test_key()),
            "https://api.transip.nl/v6/",
            false,
            Duration::from_secs(5),
            false,
        )
        .unwrap();

        let debug_str = format!("{:?}", registrar);
        assert!(debug_str.contains("TransipRegistrar"));
        assert!(debug_str.contains("<REDACTED>"));
        assert!(!debug_str.contains("PRIVATE KEY"));
        assert_eq!(registrar.api_url, "https://api.transip.nl/v6");
    }
}
