// # cfddns-core
//
// Core library for the polling Cloudflare DDNS updater.
//
// ## Architecture Overview
//
// - **IpSource**: Trait for learning the current public IPv4 address
// - **DnsProvider**: Trait for listing, creating and updating DNS records
// - **Reconciler**: One detect-compare-update cycle against live provider state
// - **Scheduler**: Runs the reconciler on a fixed interval, isolating failures
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from implementations
// 2. **Stateless Cycles**: Every cycle re-reads provider state; nothing is cached
// 3. **No Hidden Retries**: A failed cycle is retried only by the next cycle
// 4. **Library-First**: All core functionality can be used as a library

pub mod traits;
pub mod engine;
pub mod scheduler;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{DnsProvider, DnsRecord, IpSource};
pub use engine::{ReconcileOutcome, Reconciler};
pub use scheduler::Scheduler;
pub use config::DdnsConfig;
pub use error::{Error, Result};
