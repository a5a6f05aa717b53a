//! Fixed-interval scheduler
//!
//! Runs the [`Reconciler`] forever: one cycle, then a constant sleep, then
//! the next cycle. There is no backoff, jitter or retry cap; the interval is
//! the same whether the previous cycle succeeded or not.
//!
//! Each cycle runs in its own tokio task and is awaited before anything else
//! happens, so cycles never overlap. A panic inside a cycle surfaces as a
//! `JoinError` here, is logged, and the loop carries on.

use crate::engine::{ReconcileOutcome, Reconciler};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tracing::{error, info, warn};

/// Periodic driver for the reconciler
pub struct Scheduler {
    /// Shared with each spawned cycle task
    reconciler: Arc<Reconciler>,

    /// Sleep between cycles
    interval: Duration,
}

impl Scheduler {
    /// Create a new scheduler
    ///
    /// # Parameters
    ///
    /// - `reconciler`: The reconciler to drive
    /// - `interval`: Constant sleep between cycles
    pub fn new(reconciler: Reconciler, interval: Duration) -> Self {
        Self {
            reconciler: Arc::new(reconciler),
            interval,
        }
    }

    /// Sleep between cycles
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Run forever
    ///
    /// Only returns if the process is torn down; cycle failures never stop
    /// the loop.
    pub async fn run(&self) {
        self.run_internal(None).await;
    }

    /// Run until `shutdown_rx` fires (or its sender is dropped)
    ///
    /// **Embedding and tests only**: the daemon uses [`Scheduler::run`].
    /// The signal is observed while sleeping; an in-flight cycle is always
    /// allowed to finish.
    pub async fn run_with_shutdown(&self, shutdown_rx: oneshot::Receiver<()>) {
        self.run_internal(Some(shutdown_rx)).await;
    }

    async fn run_internal(&self, mut shutdown_rx: Option<oneshot::Receiver<()>>) {
        info!(
            "Starting scheduler for {} (interval: {}s)",
            self.reconciler.domain_name(),
            self.interval.as_secs()
        );

        let mut consecutive_failures: u64 = 0;

        loop {
            info!("Running DNS update...");
            let outcome = self.run_cycle().await;

            if outcome.is_success() {
                if consecutive_failures > 0 {
                    info!("Recovered after {} failed cycle(s)", consecutive_failures);
                }
                consecutive_failures = 0;
            } else {
                consecutive_failures += 1;
                warn!("Cycle failed ({} consecutive failure(s))", consecutive_failures);
            }

            info!(
                "Cycle finished: {}. Sleeping for {} seconds...",
                outcome.label(),
                self.interval.as_secs()
            );

            match shutdown_rx.as_mut() {
                Some(rx) => {
                    tokio::select! {
                        _ = tokio::time::sleep(self.interval) => {}
                        _ = rx => {
                            info!("Shutdown signal received, scheduler stopped");
                            break;
                        }
                    }
                }
                None => tokio::time::sleep(self.interval).await,
            }
        }
    }

    /// Run exactly one cycle behind the error boundary
    ///
    /// Anything that escapes the reconciler, including a panic, is logged
    /// and reported as [`ReconcileOutcome::Failed`].
    pub async fn run_cycle(&self) -> ReconcileOutcome {
        let reconciler = Arc::clone(&self.reconciler);

        match tokio::spawn(async move { reconciler.reconcile().await }).await {
            Ok(outcome) => outcome,
            Err(e) => {
                error!("Unexpected error during update: {}", e);
                ReconcileOutcome::Failed {
                    reason: format!("cycle aborted: {e}"),
                }
            }
        }
    }
}
