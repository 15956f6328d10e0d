use super::GlobalArgs;
use crate::config::validator::has_errors;
use crate::Config;
use anyhow::{bail, Result};
use clap::Args;

#[derive(Args)]
pub struct CheckArgs {}

pub async fn run(global: &GlobalArgs, _args: CheckArgs) -> Result<()> {
    println!("Checking configuration: {}", global.config.display());

    let config = Config::from_file(&global.config)?;
    let warnings = config.validate();

    if warnings.is_empty() {
        println!("[OK] Configuration is valid!");
        return Ok(());
    }

    println!("Configuration loaded with warnings:\n");
    for warning in &warnings {
        println!("{}", warning);
    }
    if has_errors(&warnings) {
        bail!("Configuration {} has errors", global.config.display());
    }
    Ok(())
}
