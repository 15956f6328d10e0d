use super::GlobalArgs;
use crate::rules::{patch_ruleset, reconcile, WafTarget};
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args)]
pub struct RulesArgs {
    #[arg(short, long)]
    pub service_id: String,

    #[arg(short, long)]
    pub waf_id: String,

    /// Override conflict detection when setting tag statuses
    #[arg(long)]
    pub force_status: bool,
}

pub async fn run(global: &GlobalArgs, args: RulesArgs) -> Result<()> {
    let config = super::load_config(global, true)?;
    let api = super::connect(global, &config)?;

    let waf = WafTarget::new(&args.service_id, &args.waf_id);
    let summary = reconcile(&api, waf, &config, args.force_status).await?;
    patch_ruleset(&api, waf).await?;

    println!("Applied: {}", summary.applied);
    if !summary.skipped_tags.is_empty() {
        println!("[!] Tags without rules: {}", summary.skipped_tags.join(", "));
    }
    if !summary.is_clean() {
        bail!("{} rule status changes failed: {}", summary.failed.len(), summary.failed.join(", "));
    }
    Ok(())
}
