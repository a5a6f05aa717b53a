//! Configuration for the DDNS updater
//!
//! The configuration is read once at startup and then passed, immutable, to
//! the constructors of the IP source, the provider, and the scheduler.
//!
//! ## Environment Variables
//!
//! | Variable | Required | Default |
//! |---|---|---|
//! | `CLOUDFLARE_ZONE_ID` | yes | |
//! | `CLOUDFLARE_AUTH_EMAIL` | yes | |
//! | `CLOUDFLARE_AUTH_KEY` | yes | |
//! | `DOMAIN_NAME` | yes | |
//! | `UPDATE_INTERVAL` | no | `3600` |
//! | `DDNS_IP_SERVICE_URL` | no | `https://api.ipify.org?format=json` |
//! | `CLOUDFLARE_API_BASE_URL` | no | `https://api.cloudflare.com/client/v4` |
//! | `DDNS_MODE` | no | `live` (or `dry-run`) |
//! | `DDNS_LOG_LEVEL` | no | `info` |

use std::time::Duration;

use crate::error::{Error, Result};

/// Default seconds between reconciliation cycles
pub const DEFAULT_UPDATE_INTERVAL_SECS: u64 = 3600;

/// Default IP-echo service (IPv4 only, JSON response)
pub const DEFAULT_IP_SERVICE_URL: &str = "https://api.ipify.org?format=json";

/// Cloudflare API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.cloudflare.com/client/v4";

const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main DDNS configuration
#[derive(Clone)]
pub struct DdnsConfig {
    /// Cloudflare zone holding the managed record
    pub zone_id: String,

    /// Account email sent as `X-Auth-Email`
    pub auth_email: String,

    /// Global API key sent as `X-Auth-Key`
    /// ⚠️ NEVER log this value
    pub auth_key: String,

    /// Fully-qualified name of the managed A record
    pub domain_name: String,

    /// Seconds between reconciliation cycles
    pub update_interval_secs: u64,

    /// IP-echo endpoint returning `{"ip": "..."}`
    pub ip_service_url: String,

    /// Cloudflare API base URL (overridable for staging/proxies)
    pub api_base_url: String,

    /// Perform reads but only log mutations
    pub dry_run: bool,

    /// Max log level for the daemon
    pub log_level: String,
}

// Custom Debug implementation that hides the auth key
impl std::fmt::Debug for DdnsConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DdnsConfig")
            .field("zone_id", &self.zone_id)
            .field("auth_email", &self.auth_email)
            .field("auth_key", &"<REDACTED>")
            .field("domain_name", &self.domain_name)
            .field("update_interval_secs", &self.update_interval_secs)
            .field("ip_service_url", &self.ip_service_url)
            .field("api_base_url", &self.api_base_url)
            .field("dry_run", &self.dry_run)
            .field("log_level", &self.log_level)
            .finish()
    }
}

impl DdnsConfig {
    /// Create a configuration with defaults for everything optional
    pub fn new(
        zone_id: impl Into<String>,
        auth_email: impl Into<String>,
        auth_key: impl Into<String>,
        domain_name: impl Into<String>,
    ) -> Self {
        Self {
            zone_id: zone_id.into(),
            auth_email: auth_email.into(),
            auth_key: auth_key.into(),
            domain_name: normalize_domain(&domain_name.into()),
            update_interval_secs: DEFAULT_UPDATE_INTERVAL_SECS,
            ip_service_url: DEFAULT_IP_SERVICE_URL.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            dry_run: false,
            log_level: "info".to_string(),
        }
    }

    /// Load configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup
    ///
    /// Blank values are treated as unset. The result is validated before it
    /// is returned.
    pub fn from_vars<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let required = |key: &str| var(key).ok_or_else(|| Error::config(format!("{key} is required")));

        let mut config = Self::new(
            required("CLOUDFLARE_ZONE_ID")?,
            required("CLOUDFLARE_AUTH_EMAIL")?,
            required("CLOUDFLARE_AUTH_KEY")?,
            required("DOMAIN_NAME")?,
        );

        if let Some(interval) = var("UPDATE_INTERVAL") {
            config.update_interval_secs = interval.parse().map_err(|_| {
                Error::config(format!(
                    "UPDATE_INTERVAL must be a whole number of seconds. Got: {interval}"
                ))
            })?;
        }

        if let Some(url) = var("DDNS_IP_SERVICE_URL") {
            config.ip_service_url = url;
        }

        if let Some(url) = var("CLOUDFLARE_API_BASE_URL") {
            config.api_base_url = url.trim_end_matches('/').to_string();
        }

        if let Some(mode) = var("DDNS_MODE") {
            config.dry_run = match mode.to_lowercase().as_str() {
                "dry-run" => true,
                "live" => false,
                _ => {
                    return Err(Error::config(format!(
                        "DDNS_MODE '{mode}' is not valid. Valid modes: live, dry-run"
                    )));
                }
            };
        }

        if let Some(level) = var("DDNS_LOG_LEVEL") {
            config.log_level = level.to_lowercase();
        }

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.zone_id.is_empty() {
            return Err(Error::config("Zone ID cannot be empty"));
        }
        if self.auth_email.is_empty() {
            return Err(Error::config("Auth email cannot be empty"));
        }
        if self.auth_key.is_empty() {
            return Err(Error::config("Auth key cannot be empty"));
        }
        if self.update_interval_secs == 0 {
            return Err(Error::config("Update interval must be > 0"));
        }

        validate_domain_name(&self.domain_name)?;
        validate_url("IP service URL", &self.ip_service_url)?;
        validate_url("API base URL", &self.api_base_url)?;

        if !VALID_LOG_LEVELS.contains(&self.log_level.as_str()) {
            return Err(Error::config(format!(
                "Log level '{}' is not valid. Valid levels: {}",
                self.log_level,
                VALID_LOG_LEVELS.join(", ")
            )));
        }

        Ok(())
    }

    /// Time to sleep between cycles
    pub fn update_interval(&self) -> Duration {
        Duration::from_secs(self.update_interval_secs)
    }
}

/// Lowercase the name and drop a trailing root dot
fn normalize_domain(domain: &str) -> String {
    domain.trim().trim_end_matches('.').to_ascii_lowercase()
}

fn validate_url(what: &str, url: &str) -> Result<()> {
    if !url.starts_with("https://") && !url.starts_with("http://") {
        return Err(Error::config(format!(
            "{what} must use HTTP or HTTPS scheme. Got: {url}"
        )));
    }
    Ok(())
}

/// Validate that a string is a valid domain name
///
/// Basic RFC 1035 checks; not comprehensive but catches common errors.
/// A single leading `*` label (wildcard record) is accepted.
fn validate_domain_name(domain: &str) -> Result<()> {
    if domain.is_empty() {
        return Err(Error::config("Domain name cannot be empty"));
    }

    // RFC 1035: 253 chars max
    if domain.len() > 253 {
        return Err(Error::config(format!(
            "Domain name too long: {} chars (max 253). Got: {}",
            domain.len(),
            domain
        )));
    }

    let labels = domain.strip_prefix("*.").unwrap_or(domain);

    if !labels.contains('.') {
        return Err(Error::config(format!(
            "Domain name must be fully qualified. Got: {domain}"
        )));
    }

    for label in labels.split('.') {
        if label.is_empty() {
            return Err(Error::config(format!("Domain name has empty label: '{domain}'")));
        }

        if label.len() > 63 {
            return Err(Error::config(format!(
                "Domain label too long: {} chars (max 63). Label: '{}'",
                label.len(),
                label
            )));
        }

        if !label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return Err(Error::config(format!(
                "Domain label contains invalid characters. Label: '{label}'. \
                Valid: alphanumeric and hyphen only."
            )));
        }

        if label.starts_with('-') || label.ends_with('-') {
            return Err(Error::config(format!(
                "Domain label cannot start or end with hyphen. Label: '{label}'"
            )));
        }
    }

    Ok(())
}
