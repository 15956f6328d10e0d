use super::GlobalArgs;
use crate::rules::listing::describe_catalog_rule;
use crate::rules::{list_catalog, list_configuration_sets, list_rule_statuses};
use anyhow::Result;
use clap::{Args, Subcommand};

#[derive(Args)]
pub struct ListArgs {
    #[command(subcommand)]
    pub command: ListCommand,
}

#[derive(Subcommand)]
pub enum ListCommand {
    /// Rule statuses of a WAF with catalog details
    Statuses {
        #[arg(short, long)]
        service_id: String,

        #[arg(short, long)]
        waf_id: String,
    },

    /// Rule catalog grouped by publisher
    Catalog {
        #[arg(long = "config-set")]
        config_set: Option<String>,
    },

    /// Available configuration sets
    ConfigSets,
}

pub async fn run(global: &GlobalArgs, args: ListArgs) -> Result<()> {
    let config = super::load_config(global, false)?;
    let api = super::connect(global, &config)?;

    match args.command {
        ListCommand::Statuses { service_id, waf_id } => {
            let statuses = list_rule_statuses(&api, &service_id, &waf_id).await?;

            for (label, entries) in [
                ("Block", &statuses.block),
                ("Log", &statuses.log),
                ("Disabled", &statuses.disabled),
            ] {
                println!("=== {} ({}) ===", label, entries.len());
                for entry in entries {
                    println!("{}", entry.describe());
                }
                println!();
            }
            println!("Total: {}", statuses.len());
        }

        ListCommand::Catalog { config_set } => {
            let catalog = list_catalog(&api, config_set.as_deref()).await?;

            for (label, rules) in [
                ("OWASP", &catalog.owasp),
                ("Fastly", &catalog.fastly),
                ("Trustwave", &catalog.trustwave),
            ] {
                println!("=== {} ({}) ===", label, rules.len());
                for rule in rules {
                    println!("{}", describe_catalog_rule(rule));
                }
                println!();
            }
        }

        ListCommand::ConfigSets => {
            for set in list_configuration_sets(&api).await? {
                let marker = if set.attributes.active { "*" } else { " " };
                println!("{} {}\t{}", marker, set.id, set.attributes.name);
            }
        }
    }

    Ok(())
}
