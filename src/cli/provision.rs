use super::GlobalArgs;
use crate::provision::{compose_logging_condition, provision};
use crate::rules::{patch_ruleset, reconcile, WafTarget};
use crate::service::{draft_from_active, validate_version};
use anyhow::{bail, Result};
use clap::Args;
use tracing::info;

#[derive(Args)]
pub struct ProvisionArgs {
    /// Service to attach the WAF to
    #[arg(short, long)]
    pub service_id: String,

    /// Only log requests handled by this node (shielded services)
    #[arg(long)]
    pub shielding: bool,

    /// Only log requests carrying a PerimeterX request id
    #[arg(long)]
    pub perimeterx: bool,

    /// Override conflict detection when setting tag statuses
    #[arg(long)]
    pub force_status: bool,
}

pub async fn run(global: &GlobalArgs, args: ProvisionArgs) -> Result<()> {
    let config = super::load_config(global, true)?;
    let api = super::connect(global, &config)?;

    let version = draft_from_active(&api, &args.service_id).await?;
    let waf_id = provision(&api, &version, &config).await?;

    let features = super::logging_features(args.shielding, args.perimeterx, &config);
    if features.any() {
        compose_logging_condition(&api, &version, &config, features).await?;
    }

    let waf = WafTarget::new(&args.service_id, &waf_id);
    let summary = reconcile(&api, waf, &config, args.force_status).await?;
    patch_ruleset(&api, waf).await?;
    validate_version(&api, &version).await?;

    println!(
        "[OK] WAF {} provisioned on service {} version #{}",
        waf_id, version.service_id, version.number
    );
    info!(applied = summary.applied, "Provisioning finished");

    if !summary.is_clean() {
        bail!("{} rule status changes failed: {}", summary.failed.len(), summary.failed.join(", "));
    }
    Ok(())
}
