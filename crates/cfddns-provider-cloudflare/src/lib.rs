// # Cloudflare DNS Provider
//
// This crate provides the Cloudflare record client for the DDNS updater.
//
// ## Implementation Notes
//
// - ✅ One operation per trait call (list may walk several result pages)
// - ✅ Specific error text for HTTP status codes (401/403, 404, 409, 429, 5xx)
// - ✅ `success: false` bodies are failures even with a 2xx status
// - ✅ Full-record PUT: name and type are always resupplied
// - ✅ Dry-run mode for safe testing
// - ❌ NO retry logic (a failed cycle is retried by the scheduler's next cycle)
// - ❌ NO caching (every cycle reads live state)
//
// ## Security Requirements
//
// - Auth key NEVER appears in logs or Debug output
// - Provider MUST fail fast if credentials are empty
//
// ## API Reference
//
// - Cloudflare API v4: https://developers.cloudflare.com/api/
// - List DNS Records: GET `/zones/:zone_id/dns_records`
// - Create DNS Record: POST `/zones/:zone_id/dns_records`
// - Overwrite DNS Record: PUT `/zones/:zone_id/dns_records/:record_id`

use async_trait::async_trait;
use cfddns_core::traits::{A_RECORD_TYPE, DnsProvider, DnsRecord};
use cfddns_core::{DdnsConfig, Error, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Cloudflare API base URL
pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// TTL written on create; 1 means "automatic" at Cloudflare
pub const AUTO_TTL: u32 = 1;

/// Page size used when listing records
const LIST_PAGE_SIZE: u32 = 100;

/// Upper bound on pages fetched per listing
const MAX_LIST_PAGES: u32 = 500;

/// Build the comment stored alongside created/updated records
pub fn update_comment(at: DateTime<Utc>) -> String {
    format!(
        "Dynamic DNS Update at {}",
        at.to_rfc3339_opts(SecondsFormat::Secs, true)
    )
}

/// JSON body for POST (create) and PUT (overwrite)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordPayload {
    pub comment: String,
    pub content: String,
    pub name: String,
    pub proxied: bool,
    #[serde(rename = "type")]
    pub record_type: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ttl: Option<u32>,
}

impl RecordPayload {
    /// Body for creating an unproxied A record with automatic TTL
    pub fn for_create(domain_name: &str, ip: Ipv4Addr, at: DateTime<Utc>) -> Self {
        Self {
            ttl: Some(AUTO_TTL),
            ..Self::for_update(domain_name, ip, at)
        }
    }

    /// Body for overwriting an A record; TTL is left as the provider has it
    pub fn for_update(domain_name: &str, ip: Ipv4Addr, at: DateTime<Utc>) -> Self {
        Self {
            comment: update_comment(at),
            content: ip.to_string(),
            name: domain_name.to_string(),
            proxied: false,
            record_type: A_RECORD_TYPE,
            ttl: None,
        }
    }

    /// The record this payload would produce
    fn into_record(self, id: impl Into<String>) -> DnsRecord {
        DnsRecord {
            id: id.into(),
            record_type: self.record_type.to_string(),
            name: self.name,
            content: self.content,
            proxied: self.proxied,
            ttl: self.ttl,
            comment: Some(self.comment),
        }
    }
}

/// Cloudflare v4 response envelope
#[derive(Debug, Deserialize)]
struct ApiEnvelope<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
    #[serde(default)]
    result_info: Option<ResultInfo>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: String,
}

#[derive(Debug, Deserialize)]
struct ResultInfo {
    #[serde(default)]
    total_pages: Option<u32>,
}

impl<T> ApiEnvelope<T> {
    fn error_summary(&self) -> String {
        if self.errors.is_empty() {
            return "provider reported success=false".to_string();
        }
        self.errors
            .iter()
            .map(|e| match e.code {
                Some(code) => format!("[{}] {}", code, e.message),
                None => e.message.clone(),
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

/// One page of a record listing
#[derive(Debug)]
pub struct ListPage {
    pub records: Vec<DnsRecord>,
    pub total_pages: u32,
}

/// Parse a 2xx list response body
pub fn parse_list_page(body: &str) -> Result<ListPage> {
    let envelope: ApiEnvelope<Vec<DnsRecord>> = serde_json::from_str(body)
        .map_err(|e| Error::list(format!("Failed to parse response: {}", e)))?;

    if !envelope.success && !envelope.errors.is_empty() {
        return Err(Error::list(envelope.error_summary()));
    }

    let total_pages = envelope
        .result_info
        .as_ref()
        .and_then(|info| info.total_pages)
        .unwrap_or(1);

    let records = envelope
        .result
        .ok_or_else(|| Error::list("Invalid response format: result is not an array"))?;

    Ok(ListPage {
        records,
        total_pages,
    })
}

/// Parse a 2xx create/update response body
///
/// Success is decided by the `success` flag alone. If the provider omits
/// `result`, the record is rebuilt from `payload` with `fallback_id`.
pub fn parse_mutation_response(
    body: &str,
    payload: RecordPayload,
    fallback_id: &str,
    make_err: fn(String) -> Error,
) -> Result<DnsRecord> {
    let envelope: ApiEnvelope<DnsRecord> = serde_json::from_str(body)
        .map_err(|e| make_err(format!("Failed to parse response: {}", e)))?;

    if !envelope.success {
        return Err(make_err(envelope.error_summary()));
    }

    Ok(envelope
        .result
        .unwrap_or_else(|| payload.into_record(fallback_id)))
}

/// Describe a non-2xx status the same way for every operation
pub fn describe_status(status: StatusCode, body: &str) -> String {
    match status.as_u16() {
        401 | 403 => format!(
            "Authentication failed: invalid auth email/key or insufficient permissions. Status: {}",
            status
        ),
        404 => format!("Not found (check zone/record ID). Status: {}", status),
        409 => format!(
            "Conflict: record is being changed by another request. Status: {}",
            status
        ),
        429 => format!("Rate limit exceeded. Please retry later. Status: {}", status),
        500..=599 => format!("Cloudflare server error (transient): {} - {}", status, body),
        _ => format!("Request failed: {} - {}", status, body),
    }
}

/// Cloudflare DNS provider
///
/// Authenticates with the account email and global API key
/// (`X-Auth-Email` / `X-Auth-Key`).
///
/// # Dry-Run Mode
///
/// When `dry_run` is true, the provider will:
/// - Perform the GET listing
/// - Log the intended POST/PUT payload
/// - **NOT** actually modify DNS records
pub struct CloudflareProvider {
    /// Zone holding the managed record
    zone_id: String,

    /// Account email
    auth_email: String,

    /// Global API key
    /// ⚠️ NEVER log this value
    auth_key: String,

    /// API base URL, without trailing slash
    api_base: String,

    /// HTTP client for API requests
    client: reqwest::Client,

    /// Dry-run mode: if true, perform GET requests but skip POST/PUT
    dry_run: bool,
}

// Custom Debug implementation that hides the auth key
impl std::fmt::Debug for CloudflareProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CloudflareProvider")
            .field("zone_id", &self.zone_id)
            .field("auth_email", &self.auth_email)
            .field("auth_key", &"<REDACTED>")
            .field("api_base", &self.api_base)
            .field("dry_run", &self.dry_run)
            .finish()
    }
}

impl CloudflareProvider {
    /// Create a new Cloudflare provider
    ///
    /// # Parameters
    ///
    /// - `zone_id`: Zone holding the managed record
    /// - `auth_email`: Account email
    /// - `auth_key`: Global API key
    /// - `dry_run`: If true, perform GET requests but skip POST/PUT
    ///
    /// # Errors
    ///
    /// `Error::Config` if any credential is empty.
    pub fn new(
        zone_id: impl Into<String>,
        auth_email: impl Into<String>,
        auth_key: impl Into<String>,
        dry_run: bool,
    ) -> Result<Self> {
        let zone_id = zone_id.into();
        let auth_email = auth_email.into();
        let auth_key = auth_key.into();

        if zone_id.is_empty() {
            return Err(Error::config("Cloudflare zone ID cannot be empty"));
        }
        if auth_email.is_empty() || auth_key.is_empty() {
            return Err(Error::config("Cloudflare auth email and key cannot be empty"));
        }

        Ok(Self {
            zone_id,
            auth_email,
            auth_key,
            api_base: CLOUDFLARE_API_BASE.to_string(),
            client: reqwest::Client::new(),
            dry_run,
        })
    }

    /// Create from the daemon configuration
    pub fn from_config(config: &DdnsConfig) -> Result<Self> {
        if config.dry_run {
            tracing::warn!("Cloudflare provider running in DRY-RUN mode - no changes will be made");
        }

        Ok(Self::new(
            config.zone_id.clone(),
            config.auth_email.clone(),
            config.auth_key.clone(),
            config.dry_run,
        )?
        .with_api_base(config.api_base_url.clone()))
    }

    /// Override the API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    /// Use a pre-built HTTP client
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Whether mutations are only logged
    pub fn is_dry_run(&self) -> bool {
        self.dry_run
    }

    fn records_url(&self) -> String {
        format!("{}/zones/{}/dns_records", self.api_base, self.zone_id)
    }

    fn record_url(&self, record_id: &str) -> String {
        format!("{}/{}", self.records_url(), record_id)
    }

    /// Start a request with the auth headers attached
    fn request(&self, method: reqwest::Method, url: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, url)
            .header("X-Auth-Email", &self.auth_email)
            .header("X-Auth-Key", &self.auth_key)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
    }

    /// Send a request and return the body of a 2xx response
    async fn send(&self, request: reqwest::RequestBuilder, make_err: fn(String) -> Error) -> Result<String> {
        let response = request
            .send()
            .await
            .map_err(|e| make_err(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read response".to_string());

        if !status.is_success() {
            return Err(make_err(describe_status(status, &body)));
        }

        Ok(body)
    }

    /// POST or PUT a record payload (or log it in dry-run mode)
    async fn write_record(
        &self,
        method: reqwest::Method,
        url: String,
        payload: RecordPayload,
        fallback_id: &str,
        make_err: fn(String) -> Error,
    ) -> Result<DnsRecord> {
        if self.dry_run {
            let body = serde_json::to_string(&payload)?;
            tracing::info!(
                "[DRY-RUN] Would send {} request to {} with payload: {}",
                method,
                url,
                body
            );
            return Ok(payload.into_record(fallback_id));
        }

        let request = self.request(method, &url).json(&payload);
        let body = self.send(request, make_err).await?;
        parse_mutation_response(&body, payload, fallback_id, make_err)
    }
}

#[async_trait]
impl DnsProvider for CloudflareProvider {
    /// List every record in the zone, following pagination
    ///
    /// ```http
    /// GET /zones/:zone_id/dns_records?page=1&per_page=100
    /// ```
    async fn list_records(&self) -> Result<Vec<DnsRecord>> {
        let url = self.records_url();
        let mut records = Vec::new();
        let mut page = 1;

        loop {
            tracing::debug!("Listing DNS records (page {})", page);

            let request = self
                .request(reqwest::Method::GET, &url)
                .query(&[("page", page), ("per_page", LIST_PAGE_SIZE)]);
            let body = self.send(request, |m| Error::list(m)).await?;
            let listing = parse_list_page(&body)?;

            records.extend(listing.records);

            if page >= listing.total_pages || page >= MAX_LIST_PAGES {
                break;
            }
            page += 1;
        }

        tracing::debug!("Listed {} DNS record(s) in zone", records.len());
        Ok(records)
    }

    /// Create an A record
    ///
    /// ```http
    /// POST /zones/:zone_id/dns_records
    /// {"comment": "...", "content": "9.9.9.9", "name": "...", "proxied": false, "type": "A", "ttl": 1}
    /// ```
    async fn create_record(&self, domain_name: &str, ip: Ipv4Addr) -> Result<DnsRecord> {
        tracing::info!(
            "Creating Cloudflare A record: {} -> {} [mode: {}]",
            domain_name,
            ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let payload = RecordPayload::for_create(domain_name, ip, Utc::now());
        self.write_record(
            reqwest::Method::POST,
            self.records_url(),
            payload,
            "",
            |m| Error::create(m),
        )
        .await
    }

    /// Overwrite an A record
    ///
    /// ```http
    /// PUT /zones/:zone_id/dns_records/:record_id
    /// {"comment": "...", "content": "5.6.7.8", "name": "...", "proxied": false, "type": "A"}
    /// ```
    async fn update_record(
        &self,
        record_id: &str,
        domain_name: &str,
        ip: Ipv4Addr,
    ) -> Result<DnsRecord> {
        tracing::info!(
            "Updating Cloudflare A record {}: {} -> {} [mode: {}]",
            record_id,
            domain_name,
            ip,
            if self.dry_run { "DRY-RUN" } else { "LIVE" }
        );

        let payload = RecordPayload::for_update(domain_name, ip, Utc::now());
        self.write_record(
            reqwest::Method::PUT,
            self.record_url(record_id),
            payload,
            record_id,
            |m| Error::update(m),
        )
        .await
    }

    fn provider_name(&self) -> &'static str {
        "cloudflare"
    }
}
