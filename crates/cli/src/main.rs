// Research portal command line
// Drives consortium sync, budget and calendar helpers against the portal API

mod commands;
mod config;

use clap::{Parser, Subcommand};
use commands::{BudgetArgs, CalendarArgs, ClassifyArgs, CopyArgs, MemberCommand, OrgCommand};
use config::PortalConfig;
use dotenvy::dotenv;
use std::path::PathBuf;

/// Log filter used when `RUST_LOG` is unset
const DEFAULT_LOG_FILTER: &str = "rimp=info,rimp_consortium=info";

/// Research institute portal tools
#[derive(Parser)]
#[command(name = "rimp", version, about = "Research portal consortium and budget tools")]
struct Cli {
    /// Path to an optional YAML configuration file
    #[arg(short, long, env = "RIMP_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Consortium organizations of a project year
    #[command(subcommand)]
    Orgs(OrgCommand),
    /// Members of consortium organizations
    #[command(subcommand)]
    Members(MemberCommand),
    /// Copy one year's consortium onto other years
    Copy(CopyArgs),
    /// Single- or multi-year classification of a project period
    Classify(ClassifyArgs),
    /// Split a budget into government, cash and in-kind shares
    Budget(BudgetArgs),
    /// Print a month calendar
    Calendar(CalendarArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = PortalConfig::load(cli.config.as_deref())?;
    tracing::debug!("Portal API: {}", config.api.base_url);

    match cli.command {
        Command::Orgs(cmd) => commands::run_orgs(&config, cmd).await,
        Command::Members(cmd) => commands::run_members(&config, cmd).await,
        Command::Copy(args) => commands::run_copy(&config, args).await,
        Command::Classify(args) => commands::run_classify(args),
        Command::Budget(args) => commands::run_budget(args),
        Command::Calendar(args) => commands::run_calendar(args),
    }
}
