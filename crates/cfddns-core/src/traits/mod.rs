//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`IpSource`]: Learn the current public IP
//! - [`DnsProvider`]: List, create and update DNS records via provider APIs

pub mod ip_source;
pub mod dns_provider;

pub use ip_source::IpSource;
pub use dns_provider::{A_RECORD_TYPE, DnsProvider, DnsRecord};
