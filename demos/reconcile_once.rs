// # Single Reconciliation Cycle
//
// Runs exactly one detect-compare-update cycle against the real Cloudflare
// API and exits. Useful for checking credentials and record selection before
// leaving the daemon running.
//
// ## Usage
//
// ```bash
// # Dry-run mode (default - safe)
// CLOUDFLARE_ZONE_ID=your_zone_id \
// CLOUDFLARE_AUTH_EMAIL=ops@example.com \
// CLOUDFLARE_AUTH_KEY=your_global_api_key \
// DOMAIN_NAME=home.example.com \
// cargo run -p cfddns-demos --bin reconcile_once
//
// # Live mode (makes actual changes!)
// DDNS_MODE=live \
// CLOUDFLARE_ZONE_ID=your_zone_id \
// CLOUDFLARE_AUTH_EMAIL=ops@example.com \
// CLOUDFLARE_AUTH_KEY=your_global_api_key \
// DOMAIN_NAME=home.example.com \
// cargo run -p cfddns-demos --bin reconcile_once
// ```
//
// Uses the same variables as `cfddnsd`, except that `DDNS_MODE` defaults to
// `dry-run` here. Exits 0 when the cycle succeeds and 1 otherwise.

use cfddns_core::{DdnsConfig, ReconcileOutcome, Reconciler};
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::INFO)
        .init();

    tracing::info!("=== Cloudflare DDNS: single reconciliation cycle ===");

    let config = match DdnsConfig::from_vars(|key| match std::env::var(key) {
        Ok(value) => Some(value),
        Err(_) if key == "DDNS_MODE" => Some("dry-run".to_string()),
        Err(_) => None,
    }) {
        Ok(config) => config,
        Err(e) => {
            tracing::error!("{}", e);
            return ExitCode::FAILURE;
        }
    };

    if config.dry_run {
        tracing::warn!("Running in DRY-RUN mode - no changes will be made");
    } else {
        tracing::warn!("Running in LIVE mode - will make actual DNS changes!");
    }

    tracing::info!("Configuration: {:?}", config);

    let provider = match CloudflareProvider::from_config(&config) {
        Ok(provider) => provider,
        Err(e) => {
            tracing::error!("Provider setup failed: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let reconciler = Reconciler::new(
        Box::new(HttpIpSource::from_config(&config)),
        Box::new(provider),
        config.domain_name.clone(),
    );

    match reconciler.reconcile().await {
        ReconcileOutcome::Unchanged { record_id, ip } => {
            tracing::info!("✓ Unchanged: record {} already points to {}", record_id, ip);
        }
        ReconcileOutcome::Updated { record_id, previous, ip } => {
            tracing::info!("✓ Updated: record {} {} -> {}", record_id, previous, ip);
        }
        ReconcileOutcome::Created { record_id, ip } => {
            tracing::info!("✓ Created: record {} -> {}", record_id, ip);
        }
        ReconcileOutcome::Failed { reason } => {
            tracing::error!("✗ Cycle failed: {}", reason);
            return ExitCode::FAILURE;
        }
    }

    if config.dry_run {
        tracing::info!("No changes were made to DNS records.");
    }

    ExitCode::SUCCESS
}
