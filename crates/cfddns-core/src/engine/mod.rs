//! Reconciliation engine
//!
//! The [`Reconciler`] runs one detect-compare-update cycle:
//!
//! ```text
//! ┌─────────────┐   current()    ┌──────────────┐   list_records()   ┌──────────────┐
//! │  IpSource   │ ◄───────────── │  Reconciler  │ ─────────────────► │ DnsProvider  │
//! └─────────────┘                └──────────────┘                    └──────────────┘
//!                                       │
//!                    ┌──────────────────┼──────────────────┐
//!                    ▼                  ▼                  ▼
//!               unchanged         update_record()    create_record()
//! ```
//!
//! ## Cycle
//!
//! 1. Resolve the current IP
//! 2. List records from the provider (fresh every cycle, never cached)
//! 3. Select the first A record whose name matches the configured domain
//! 4. Same content: do nothing. Different: update. Missing: create.
//!
//! Every error is logged here and turned into [`ReconcileOutcome::Failed`];
//! nothing is retried within a cycle.

use crate::error::Result;
use crate::traits::{DnsProvider, DnsRecord, IpSource};
use std::net::Ipv4Addr;
use tracing::{debug, error, info, warn};

/// Result of one reconciliation cycle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// Record already pointed at the current IP
    Unchanged {
        record_id: String,
        ip: Ipv4Addr,
    },

    /// Record content was replaced
    Updated {
        record_id: String,
        previous: String,
        ip: Ipv4Addr,
    },

    /// No managed record existed; one was created
    Created {
        record_id: String,
        ip: Ipv4Addr,
    },

    /// Some step failed; nothing more was attempted this cycle
    Failed {
        reason: String,
    },
}

impl ReconcileOutcome {
    /// True for every outcome except [`ReconcileOutcome::Failed`]
    pub fn is_success(&self) -> bool {
        !matches!(self, Self::Failed { .. })
    }

    /// Short label for log lines
    pub fn label(&self) -> &'static str {
        match self {
            Self::Unchanged { .. } => "unchanged",
            Self::Updated { .. } => "updated",
            Self::Created { .. } => "created",
            Self::Failed { .. } => "failed",
        }
    }
}

/// Core reconciler
///
/// Holds no state between cycles: every call to [`Reconciler::reconcile`]
/// compares against live provider data, so out-of-band edits are corrected
/// on the next cycle.
pub struct Reconciler {
    /// IP source for the current public IP
    ip_source: Box<dyn IpSource>,

    /// DNS provider holding the managed record
    provider: Box<dyn DnsProvider>,

    /// Fully-qualified name of the managed A record
    domain_name: String,
}

impl Reconciler {
    /// Create a new reconciler
    ///
    /// # Parameters
    ///
    /// - `ip_source`: IP source implementation
    /// - `provider`: DNS provider implementation
    /// - `domain_name`: Name of the A record to manage
    pub fn new(
        ip_source: Box<dyn IpSource>,
        provider: Box<dyn DnsProvider>,
        domain_name: impl Into<String>,
    ) -> Self {
        Self {
            ip_source,
            provider,
            domain_name: domain_name.into(),
        }
    }

    /// Name of the managed record
    pub fn domain_name(&self) -> &str {
        &self.domain_name
    }

    /// Run one reconciliation cycle
    ///
    /// Never returns an error: failures are logged and reported as
    /// [`ReconcileOutcome::Failed`].
    pub async fn reconcile(&self) -> ReconcileOutcome {
        match self.try_reconcile().await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!(stage = e.stage(), "Reconciliation of {} failed: {}", self.domain_name, e);
                ReconcileOutcome::Failed {
                    reason: e.to_string(),
                }
            }
        }
    }

    async fn try_reconcile(&self) -> Result<ReconcileOutcome> {
        let current_ip = self.ip_source.current().await?;
        info!("Current IP address: {} (via {})", current_ip, self.ip_source.source_name());

        let records = self.provider.list_records().await?;
        debug!(
            "Provider {} returned {} record(s)",
            self.provider.provider_name(),
            records.len()
        );

        match select_managed_record(&records, &self.domain_name) {
            Some(record) if record.points_to(current_ip) => {
                info!(
                    "A record {} ({}) already points to {}, no update needed",
                    self.domain_name, record.id, current_ip
                );
                Ok(ReconcileOutcome::Unchanged {
                    record_id: record.id.clone(),
                    ip: current_ip,
                })
            }
            Some(record) => {
                info!(
                    "IP address has changed for {}: {} -> {}, updating record {}",
                    self.domain_name, record.content, current_ip, record.id
                );
                let updated = self
                    .provider
                    .update_record(&record.id, &self.domain_name, current_ip)
                    .await?;
                info!("Successfully updated {} to {}", self.domain_name, current_ip);
                Ok(ReconcileOutcome::Updated {
                    record_id: updated.id,
                    previous: record.content.clone(),
                    ip: current_ip,
                })
            }
            None => {
                info!("No A record found for {}, creating one", self.domain_name);
                let created = self
                    .provider
                    .create_record(&self.domain_name, current_ip)
                    .await?;
                info!(
                    "Successfully created A record {} -> {} ({})",
                    self.domain_name, current_ip, created.id
                );
                Ok(ReconcileOutcome::Created {
                    record_id: created.id,
                    ip: current_ip,
                })
            }
        }
    }
}

/// Pick the managed record out of a zone listing
///
/// The first A record named `domain_name` wins. Further matches are left
/// untouched and reported, since which one the provider serves is undefined.
pub fn select_managed_record<'a>(records: &'a [DnsRecord], domain_name: &str) -> Option<&'a DnsRecord> {
    let mut matches = records.iter().filter(|r| r.is_a_record_for(domain_name));
    let managed = matches.next()?;

    let duplicates: Vec<&str> = matches.map(|r| r.id.as_str()).collect();
    if !duplicates.is_empty() {
        warn!(
            "Found {} extra A record(s) for {} ({}); managing {} only",
            duplicates.len(),
            domain_name,
            duplicates.join(", "),
            managed.id
        );
    }

    Some(managed)
}
