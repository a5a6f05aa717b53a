//! Error types for the DDNS updater
//!
//! Every failure a reconciliation cycle can hit maps to exactly one variant,
//! so the reconciler can log it with the stage that failed.

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS updater
#[derive(Error, Debug)]
pub enum Error {
    /// The public IP could not be determined
    #[error("IP resolution failed: {0}")]
    Resolution(String),

    /// The provider's record listing failed
    #[error("Failed to list DNS records: {0}")]
    List(String),

    /// The provider rejected or never received a create request
    #[error("Failed to create DNS record: {0}")]
    Create(String),

    /// The provider rejected or never received an update request
    #[error("Failed to update DNS record: {0}")]
    Update(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an IP resolution error
    pub fn resolution(msg: impl Into<String>) -> Self {
        Self::Resolution(msg.into())
    }

    /// Create a record listing error
    pub fn list(msg: impl Into<String>) -> Self {
        Self::List(msg.into())
    }

    /// Create a record creation error
    pub fn create(msg: impl Into<String>) -> Self {
        Self::Create(msg.into())
    }

    /// Create a record update error
    pub fn update(msg: impl Into<String>) -> Self {
        Self::Update(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Short name of the cycle stage this error belongs to, for log lines
    pub fn stage(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "resolve",
            Self::List(_) => "list",
            Self::Create(_) => "create",
            Self::Update(_) => "update",
            Self::Config(_) => "config",
            Self::Json(_) => "json",
        }
    }
}
