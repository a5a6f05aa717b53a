// # DNS Provider Trait
//
// Defines the interface for reading and writing DNS records via a provider API.
//
// ## Implementations
//
// - Cloudflare: `cfddns-provider-cloudflare` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     let records = provider.list_records().await?;
//     let record = provider
//         .create_record("home.example.com", std::net::Ipv4Addr::new(192, 0, 2, 1))
//         .await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Record type managed by this system
pub const A_RECORD_TYPE: &str = "A";

/// A DNS record as stored by the provider
///
/// Fields the provider returns beyond these are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    /// The record ID (provider-assigned, stable across updates)
    pub id: String,

    /// The record type (`"A"`, `"AAAA"`, `"CNAME"`, ...)
    #[serde(rename = "type")]
    pub record_type: String,

    /// Fully-qualified record name
    pub name: String,

    /// Record value; an IP string for A records
    pub content: String,

    /// Whether traffic is proxied through the provider
    #[serde(default)]
    pub proxied: bool,

    /// Time-to-live in seconds (1 means "automatic" at Cloudflare)
    #[serde(default)]
    pub ttl: Option<u32>,

    /// Free-form note stored with the record
    #[serde(default)]
    pub comment: Option<String>,
}

impl DnsRecord {
    /// Build an A record value
    pub fn a(id: impl Into<String>, name: impl Into<String>, ip: Ipv4Addr) -> Self {
        Self {
            id: id.into(),
            record_type: A_RECORD_TYPE.to_string(),
            name: name.into(),
            content: ip.to_string(),
            proxied: false,
            ttl: None,
            comment: None,
        }
    }

    /// True if this is an A record for `domain_name` (case-insensitive)
    pub fn is_a_record_for(&self, domain_name: &str) -> bool {
        self.record_type == A_RECORD_TYPE
            && self
                .name
                .trim_end_matches('.')
                .eq_ignore_ascii_case(domain_name.trim_end_matches('.'))
    }

    /// True if the record already points at `ip`
    pub fn points_to(&self, ip: Ipv4Addr) -> bool {
        self.content.trim() == ip.to_string()
    }
}

/// Trait for DNS provider implementations
///
/// Providers are thin wrappers around the remote record API. Each method
/// maps to one API operation (a listing may span several pages).
///
/// # Rules
///
/// - No retry logic or backoff: return an error, the next cycle retries
/// - No caching: every call reads or writes live provider state
/// - No decision making: whether to create, update or skip is owned by
///   [`crate::engine::Reconciler`]
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// List all records in the configured zone
    ///
    /// Returns records exactly as the provider reports them; filtering by
    /// type and name is the caller's job.
    ///
    /// # Returns
    ///
    /// - `Ok(Vec<DnsRecord>)`: All records in the zone
    /// - `Err(Error::List)`: Transport failure or non-2xx status
    async fn list_records(&self) -> Result<Vec<DnsRecord>, crate::Error>;

    /// Create a new A record
    ///
    /// The record is created unproxied with the provider's lowest TTL.
    ///
    /// # Parameters
    ///
    /// - `domain_name`: Fully-qualified record name
    /// - `ip`: The record content
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The created record
    /// - `Err(Error::Create)`: If the provider did not report success
    async fn create_record(&self, domain_name: &str, ip: Ipv4Addr)
    -> Result<DnsRecord, crate::Error>;

    /// Replace an existing A record
    ///
    /// This is a full replace: name and type are resupplied along with the
    /// new content, because omitting them may clear them at the provider.
    ///
    /// # Parameters
    ///
    /// - `record_id`: The provider-assigned record ID
    /// - `domain_name`: Fully-qualified record name
    /// - `ip`: The new record content
    ///
    /// # Returns
    ///
    /// - `Ok(DnsRecord)`: The record as stored after the update
    /// - `Err(Error::Update)`: If the provider did not report success
    async fn update_record(
        &self,
        record_id: &str,
        domain_name: &str,
        ip: Ipv4Addr,
    ) -> Result<DnsRecord, crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}
