use crate::api::ApiError;
use crate::collector::CollectError;
use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, WafError>;

/// Failures that abort an operation.
#[derive(Debug, Error)]
pub enum WafError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Collect(#[from] CollectError),

    #[error("no active version found for service {0} (wrong service id?)")]
    NoActiveVersion(String),

    #[error("no WAF object exists in service {service_id} version #{version}")]
    NoWaf { service_id: String, version: u32 },

    #[error("no OWASP object to back up for WAF {0}")]
    MissingOwasp(String),

    #[error("output path does not exist: {0}")]
    OutputDirMissing(PathBuf),

    #[error("version #{version} is invalid: {reason}")]
    InvalidVersion { version: u32, reason: String },

    #[error("log expiry of {0} days is out of range")]
    InvalidExpiry(u32),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to encode backup: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl WafError {
    /// True when the failure is an empty listing rather than a remote error.
    pub fn is_no_records(&self) -> bool {
        matches!(self, Self::Collect(CollectError::NoRecords { .. }))
    }
}
