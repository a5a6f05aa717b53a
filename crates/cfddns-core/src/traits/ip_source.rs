// # IP Source Trait
//
// Defines the interface for learning the caller's current public IPv4 address.
//
// ## Implementations
//
// - HTTP IP-echo service: `cfddns-ip-http` crate
//
// ## Usage
//
// ```rust,ignore
// use cfddns_core::IpSource;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let source = /* IpSource implementation */;
//
//     let current_ip = source.current().await?;
//     println!("Public IP: {current_ip}");
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Trait for IP source implementations
///
/// A source answers one question per call: what is the public IPv4 address
/// right now? It is asked once per reconciliation cycle.
///
/// # Rules
///
/// - One lookup per call: no caching between calls
/// - No retry logic: a failed lookup fails the cycle, the next cycle is the retry
/// - Failures are reported as [`crate::Error::Resolution`]
#[async_trait]
pub trait IpSource: Send + Sync {
    /// Get the current public IPv4 address
    ///
    /// # Returns
    ///
    /// - `Ok(Ipv4Addr)`: The current IP address
    /// - `Err(Error::Resolution)`: If unable to determine the current IP
    async fn current(&self) -> Result<Ipv4Addr, crate::Error>;

    /// Get the source name (for logging/debugging)
    fn source_name(&self) -> &'static str;
}
