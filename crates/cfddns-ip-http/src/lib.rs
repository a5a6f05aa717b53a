// # HTTP IP Source
//
// This crate provides an IP-echo based IP source for the DDNS updater.
//
// ## Behavior
//
// One GET per call to a service that echoes the caller's address as JSON:
//
// ```http
// GET /?format=json
// Accept: application/json
//
// {"ip": "203.0.113.7"}
// ```
//
// Transport failures, non-2xx statuses and malformed or non-IPv4 payloads
// all fail with `Error::Resolution`. There is no caching and no retry; the
// scheduler's next cycle is the retry.

use async_trait::async_trait;
use cfddns_core::traits::IpSource;
use cfddns_core::{DdnsConfig, Error, Result};
use serde::Deserialize;
use std::net::Ipv4Addr;

/// Payload returned by the echo service
#[derive(Debug, Deserialize)]
struct IpEchoResponse {
    ip: String,
}

/// HTTP IP-echo source
#[derive(Debug, Clone)]
pub struct HttpIpSource {
    /// URL to fetch IP from
    url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl HttpIpSource {
    /// Create a new HTTP IP source
    ///
    /// The client keeps reqwest's defaults (no request timeout override).
    ///
    /// # Parameters
    ///
    /// - `url`: Echo service URL (e.g., "https://api.ipify.org?format=json")
    pub fn new(url: impl Into<String>) -> Self {
        Self::with_client(url, reqwest::Client::new())
    }

    /// Create with a pre-built client (custom proxy, TLS roots, timeouts)
    pub fn with_client(url: impl Into<String>, client: reqwest::Client) -> Self {
        Self {
            url: url.into(),
            client,
        }
    }

    /// Create from the daemon configuration
    pub fn from_config(config: &DdnsConfig) -> Self {
        Self::new(config.ip_service_url.clone())
    }

    /// Echo service URL
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Fetch current IP from the echo service
    async fn fetch_ip(&self) -> Result<Ipv4Addr> {
        let response = self
            .client
            .get(&self.url)
            .header(reqwest::header::ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| Error::resolution(format!("Request to {} failed: {}", self.url, e)))?;

        if !response.status().is_success() {
            return Err(Error::resolution(format!(
                "IP service {} returned HTTP {}",
                self.url,
                response.status()
            )));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| Error::resolution(format!("Failed to read response: {}", e)))?;

        parse_ip_response(&body)
    }
}

/// Parse an echo-service body of the form `{"ip": "<IPv4>"}`
pub fn parse_ip_response(body: &[u8]) -> Result<Ipv4Addr> {
    let payload: IpEchoResponse = serde_json::from_slice(body)
        .map_err(|e| Error::resolution(format!("Malformed IP service response: {}", e)))?;

    let ip_text = payload.ip.trim();
    ip_text
        .parse()
        .map_err(|_| Error::resolution(format!("Not an IPv4 address: {}", ip_text)))
}

#[async_trait]
impl IpSource for HttpIpSource {
    async fn current(&self) -> Result<Ipv4Addr> {
        let ip = self.fetch_ip().await?;
        tracing::debug!("IP service {} reported {}", self.url, ip);
        Ok(ip)
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}
