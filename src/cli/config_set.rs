use super::GlobalArgs;
use crate::rules::set_configuration_set;
use anyhow::Result;
use clap::Args;

#[derive(Args)]
pub struct ConfigSetArgs {
    #[arg(short, long)]
    pub waf_id: String,

    /// Configuration set to bind the WAF to
    #[arg(long = "config-set")]
    pub config_set: String,
}

pub async fn run(global: &GlobalArgs, args: ConfigSetArgs) -> Result<()> {
    let config = super::load_config(global, true)?;
    let api = super::connect(global, &config)?;

    set_configuration_set(&api, &args.waf_id, &args.config_set).await?;
    println!("[OK] WAF {} uses configuration set {}", args.waf_id, args.config_set);
    Ok(())
}
