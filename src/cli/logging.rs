use super::GlobalArgs;
use crate::provision::compose_logging_condition;
use crate::service::{draft_from_active, validate_version};
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct LoggingArgs {
    /// Service whose log endpoints get the condition
    #[arg(short, long)]
    pub service_id: String,

    /// Only log requests handled by this node (shielded services)
    #[arg(long)]
    pub shielding: bool,

    /// Only log requests carrying a PerimeterX request id
    #[arg(long)]
    pub perimeterx: bool,
}

pub async fn run(global: &GlobalArgs, args: LoggingArgs) -> Result<()> {
    let config = super::load_config(global, true)?;
    let api = super::connect(global, &config)?;

    let version = draft_from_active(&api, &args.service_id).await?;
    let features = super::logging_features(args.shielding, args.perimeterx, &config);
    let attached = compose_logging_condition(&api, &version, &config, features).await?;
    validate_version(&api, &version).await?;

    println!("[OK] {} uses condition {}", config.waflog.name, attached.waflog);
    println!("[OK] {} uses condition {}", config.weblog.name, attached.weblog);
    Ok(())
}
