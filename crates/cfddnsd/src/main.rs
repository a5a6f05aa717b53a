// # cfddnsd - Cloudflare DDNS Daemon
//
// Thin integration layer: all reconciliation logic lives in cfddns-core.
//
// The daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Wiring the HTTP IP source and Cloudflare provider into a reconciler
// 4. Running the scheduler until the process is killed
//
// ## Configuration
//
// ### Required
// - `CLOUDFLARE_ZONE_ID`: Zone holding the record
// - `CLOUDFLARE_AUTH_EMAIL`: Account email
// - `CLOUDFLARE_AUTH_KEY`: Global API key
// - `DOMAIN_NAME`: Fully-qualified name of the A record to manage
//
// ### Optional
// - `UPDATE_INTERVAL`: Seconds between cycles (default: 3600)
// - `DDNS_IP_SERVICE_URL`: IP echo service (default: https://api.ipify.org?format=json)
// - `CLOUDFLARE_API_BASE_URL`: API base (default: https://api.cloudflare.com/client/v4)
// - `DDNS_MODE`: "live" or "dry-run" (default: live)
// - `DDNS_LOG_LEVEL`: trace, debug, info, warn, error (default: info)
//
// ## Example
//
// ```bash
// export CLOUDFLARE_ZONE_ID=023e105f4ecef8ad9ca31a8372d0c353
// export CLOUDFLARE_AUTH_EMAIL=ops@example.com
// export CLOUDFLARE_AUTH_KEY=your_global_api_key
// export DOMAIN_NAME=home.example.com
// export UPDATE_INTERVAL=300
//
// cfddnsd
// ```

use anyhow::{Context, Result};
use cfddns_core::{DdnsConfig, Reconciler, Scheduler};
use cfddns_ip_http::HttpIpSource;
use cfddns_provider_cloudflare::CloudflareProvider;
use std::process::ExitCode;
use tracing::{Level, error, info, warn};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

fn parse_log_level(level: &str) -> Level {
    match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    }
}

/// Build the scheduler from a validated configuration
fn build_scheduler(config: &DdnsConfig) -> Result<Scheduler> {
    let ip_source = HttpIpSource::from_config(config);
    let provider = CloudflareProvider::from_config(config)
        .context("Failed to initialize Cloudflare provider")?;

    let reconciler = Reconciler::new(
        Box::new(ip_source),
        Box::new(provider),
        config.domain_name.clone(),
    );

    Ok(Scheduler::new(reconciler, config.update_interval()))
}

fn main() -> ExitCode {
    // Load and validate configuration from environment
    let config = match DdnsConfig::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(parse_log_level(&config.log_level))
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting Cloudflare Dynamic DNS updater");
    info!("Domain: {}", config.domain_name);
    info!("Update interval: {} seconds", config.update_interval_secs);
    info!("IP service: {}", config.ip_service_url);
    if config.dry_run {
        warn!("DRY-RUN mode: DNS records will not be modified");
    }

    let scheduler = match build_scheduler(&config) {
        Ok(scheduler) => scheduler,
        Err(e) => {
            error!("Startup error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    rt.block_on(scheduler.run());

    // The scheduler only returns if its loop is torn down
    info!("Scheduler stopped");
    DdnsExitCode::CleanShutdown.into()
}
