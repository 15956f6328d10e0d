pub mod backup;
pub mod check;
pub mod config_set;
pub mod deprovision;
pub mod list;
pub mod logging;
pub mod provision;
pub mod rules;
pub mod status;

pub use backup::BackupArgs;
pub use check::CheckArgs;
pub use config_set::ConfigSetArgs;
pub use deprovision::DeprovisionArgs;
pub use list::ListArgs;
pub use logging::LoggingArgs;
pub use provision::ProvisionArgs;
pub use rules::RulesArgs;
pub use status::StatusArgs;

use crate::api::HttpClient;
use crate::config::validator::has_errors;
use crate::provision::LoggingFeatures;
use crate::Config;
use anyhow::{bail, Context, Result};
use clap::Args;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

pub const DEFAULT_CONFIG: &str = "wafkeeper.toml";

/// Options shared by every command.
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Path to configuration file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG)]
    pub config: PathBuf,

    /// API key of the platform account
    #[arg(long, global = true, env = "FASTLY_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, default_value = "30")]
    pub timeout: u64,
}

/// Load and validate the configuration, then start logging. Blocking
/// findings abort commands that change remote state.
pub fn load_config(global: &GlobalArgs, mutating: bool) -> Result<Config> {
    let config = Config::from_file(&global.config)?;

    crate::logging::init_logging(
        &config.logging.level,
        config.logging.format,
        config.logging.path.as_deref(),
    )?;

    info!("wafkeeper v{}", crate::VERSION);
    info!("Loading configuration from: {}", global.config.display());

    let warnings = config.validate();
    for warning in &warnings {
        println!("{}", warning);
    }
    if mutating && has_errors(&warnings) {
        bail!("Configuration {} has errors, nothing was changed", global.config.display());
    }

    Ok(config)
}

pub fn connect(global: &GlobalArgs, config: &Config) -> Result<HttpClient> {
    let api_key = global
        .api_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .context("No API key: pass --api-key or set FASTLY_API_KEY")?;

    HttpClient::new(&config.api_endpoint, api_key, Duration::from_secs(global.timeout))
        .context("Failed to build the API client")
}

pub fn logging_features(shielding: bool, perimeterx: bool, config: &Config) -> LoggingFeatures {
    LoggingFeatures {
        shielding,
        perimeterx,
        expiry_days: config.weblog.expiry,
    }
}
