use super::GlobalArgs;
use crate::provision::deprovision;
use crate::service::{draft_from_active, validate_version};
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args)]
pub struct DeprovisionArgs {
    /// Service to remove the WAF from
    #[arg(short, long)]
    pub service_id: String,
}

pub async fn run(global: &GlobalArgs, args: DeprovisionArgs) -> Result<()> {
    let config = super::load_config(global, true)?;
    let api = super::connect(global, &config)?;

    let version = draft_from_active(&api, &args.service_id).await?;
    let report = deprovision(&api, &version, &config).await?;
    validate_version(&api, &version).await?;

    for removed in &report.removed {
        println!("[OK] Removed {}", removed);
    }
    if !report.is_clean() {
        for failure in &report.failures {
            println!("[X] {}", failure);
        }
        bail!("Deprovisioning of version #{} was incomplete", version.number);
    }

    println!("[OK] Service {} version #{} is free of WAF objects", version.service_id, version.number);
    Ok(())
}
