// # HTTP IP Source
//
// This crate provides an HTTP echo-service IP source for the DDNS updater.
//
// ## Behaviour
//
// One GET against a public IP-echo endpoint (default: api.ipify.org). The
// response body is the address, returned exactly as received: the reconciler
// compares it byte-for-byte with the stored record content.
//
// Anything other than HTTP 200 is a failure. There is no fallback endpoint
// and no retry; the next scheduled run is the retry.

use ddns_core::config::IpSourceConfig;
use ddns_core::{Error, IpSource, PublicAddress, Result};

use std::time::Duration;

use reqwest::StatusCode;

/// HTTP echo-service IP source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch the address from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// # Parameters
    ///
    /// - `url`: URL to fetch the address from (e.g., "https://api.ipify.org")
    /// - `timeout`: Upper bound on the whole request
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: url.into(),
            client,
        })
    }

    /// Create from configuration
    pub fn from_config(config: &IpSourceConfig) -> Result<Self> {
        Self::new(config.url.clone(), Duration::from_secs(config.timeout_secs))
    }

    /// Host part of the URL, for error messages
    fn service_name(&self) -> &str {
        let rest = self
            .url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.url);
        rest.split(['/', '?']).next().unwrap_or(rest)
    }
}

#[async_trait::async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<PublicAddress> {
        let service = self.service_name();
        tracing::debug!("Fetching public address from {}", self.url);

        let response = self.client.get(&self.url).send().await.map_err(|e| {
            Error::resolution(format!(
                "failed to make HTTP request to {}: {}",
                service, e
            ))
        })?;

        let status = response.status();
        if status != StatusCode::OK {
            return Err(Error::resolution(format!(
                "{} returned non-OK status: {}",
                service, status
            )));
        }

        let body = response.bytes().await.map_err(|e| {
            Error::resolution(format!(
                "failed to read response body from {}: {}",
                service, e
            ))
        })?;

        Ok(PublicAddress::new(String::from_utf8_lossy(&body).into_owned()))
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
