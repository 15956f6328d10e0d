use anyhow::Result;
use clap::{Parser, Subcommand};
use wafkeeper::cli::{self, GlobalArgs};

#[derive(Parser)]
#[command(name = "wafkeeper")]
#[command(version = wafkeeper::VERSION)]
#[command(about = "Provision and manage the edge WAF of a CDN service", long_about = None)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the WAF and everything around it on a new draft version
    Provision(cli::provision::ProvisionArgs),

    /// Remove every WAF and its logging from a new draft version
    Deprovision(cli::deprovision::DeprovisionArgs),

    /// Create or update the logging conditions on a new draft version
    Logging(cli::logging::LoggingArgs),

    /// Apply the configured rule statuses to a WAF
    Rules(cli::rules::RulesArgs),

    /// Enable or disable a WAF
    Status(cli::status::StatusArgs),

    /// Save rule statuses and OWASP settings of a WAF to a file
    Backup(cli::backup::BackupArgs),

    /// Show rule statuses, the rule catalog or configuration sets
    List(cli::list::ListArgs),

    /// Bind a WAF to a configuration set
    ConfigSet(cli::config_set::ConfigSetArgs),

    /// Check the configuration file
    Check(cli::check::CheckArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let global = &cli.global;

    match cli.command {
        Commands::Provision(args) => cli::provision::run(global, args).await,
        Commands::Deprovision(args) => cli::deprovision::run(global, args).await,
        Commands::Logging(args) => cli::logging::run(global, args).await,
        Commands::Rules(args) => cli::rules::run(global, args).await,
        Commands::Status(args) => cli::status::run(global, args).await,
        Commands::Backup(args) => cli::backup::run(global, args).await,
        Commands::List(args) => cli::list::run(global, args).await,
        Commands::ConfigSet(args) => cli::config_set::run(global, args).await,
        Commands::Check(args) => cli::check::run(global, args).await,
    }
}
