use super::GlobalArgs;
use anyhow::Result;
use clap::Args;
use std::path::PathBuf;

#[derive(Args)]
pub struct BackupArgs {
    #[arg(short, long)]
    pub service_id: String,

    #[arg(short, long)]
    pub waf_id: String,

    /// File to write the backup to
    #[arg(short, long, default_value = "waf-backup.toml")]
    pub output: PathBuf,
}

pub async fn run(global: &GlobalArgs, args: BackupArgs) -> Result<()> {
    let config = super::load_config(global, false)?;
    let api = super::connect(global, &config)?;

    let outcome = crate::backup::backup(&api, &args.service_id, &args.waf_id, &args.output).await?;

    println!("[OK] Backup {} written to {}", outcome.record.id, outcome.path.display());
    println!(
        "  block: {}  log: {}  disabled: {}  ({} bytes)",
        outcome.record.block.len(),
        outcome.record.log.len(),
        outcome.record.disabled.len(),
        outcome.bytes
    );
    Ok(())
}
