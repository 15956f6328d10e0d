use super::GlobalArgs;
use crate::config::types::WafState;
use crate::rules::change_status;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args)]
pub struct StatusArgs {
    #[arg(short, long)]
    pub waf_id: String,

    /// enable or disable
    pub state: WafState,
}

pub async fn run(global: &GlobalArgs, args: StatusArgs) -> Result<()> {
    let config = super::load_config(global, true)?;
    let api = super::connect(global, &config)?;

    let state = args.state.to_string();
    if !change_status(&api, &args.waf_id, &state).await? {
        bail!("WAF {} did not accept status {}", args.waf_id, state);
    }

    println!("[OK] WAF {} is now {}d", args.waf_id, state);
    Ok(())
}
