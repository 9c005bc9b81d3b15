use crate::config::PortalConfig;
use anyhow::Context;
use chrono::{Datelike, NaiveDate, Weekday};
use clap::{Args, Subcommand, ValueEnum};
use rimp_budget::BudgetRatio;
use rimp_client::HttpConsortiumApi;
use rimp_consortium::{classify, ConsortiumSync};
use rimp_models::{EntityId, MemberFields, OrganizationType, ProjectId, ProjectMode, Year};
use serde::Serialize;
use std::sync::Arc;

#[derive(Args, Debug)]
pub struct ProjectArgs {
    /// Project plan id
    #[arg(long)]
    pub project: ProjectId,

    /// Project year (연차) to work on
    #[arg(long, default_value_t = 1)]
    pub year: Year,

    /// Project start date (YYYY-MM-DD), used to derive the number of years
    #[arg(long)]
    pub start: Option<NaiveDate>,

    /// Project end date (YYYY-MM-DD)
    #[arg(long)]
    pub end: Option<NaiveDate>,

    /// Number of project years; overrides the dates
    #[arg(long)]
    pub duration: Option<u32>,
}

impl ProjectArgs {
    fn mode(&self) -> ProjectMode {
        match self.duration {
            Some(1) => ProjectMode::single(),
            Some(years) => ProjectMode::multi(years),
            None => classify(self.start, self.end),
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum OrgCommand {
    /// List organizations of a year, or of every year with --all
    List {
        #[command(flatten)]
        project: ProjectArgs,
        /// Confirmed organizations of all project years
        #[arg(long)]
        all: bool,
    },
    /// Create an organization
    Add {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long)]
        name: String,
        /// lead, participant, joint or demand
        #[arg(long = "type", default_value = "participant")]
        organization_type: OrganizationType,
        #[arg(long, default_value = "")]
        role: String,
    },
    Rename {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_parser = parse_id)]
        id: EntityId,
        #[arg(long)]
        name: String,
    },
    Retype {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_parser = parse_id)]
        id: EntityId,
        #[arg(long = "type")]
        organization_type: OrganizationType,
    },
    Delete {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_parser = parse_id)]
        id: EntityId,
    },
}

#[derive(Args, Debug, Default)]
pub struct MemberFieldArgs {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub position: Option<String>,
    #[arg(long)]
    pub role: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub mobile: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
}

impl MemberFieldArgs {
    fn apply_to(self, fields: &mut MemberFields) {
        let pairs = [
            (self.name, &mut fields.name),
            (self.position, &mut fields.position),
            (self.role, &mut fields.role),
            (self.phone, &mut fields.phone),
            (self.mobile, &mut fields.mobile),
            (self.email, &mut fields.email),
        ];
        for (value, slot) in pairs {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum MemberCommand {
    /// Add a member to an organization
    Add {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_parser = parse_id)]
        org: EntityId,
        #[command(flatten)]
        fields: MemberFieldArgs,
    },
    /// Change a member's details
    Update {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_parser = parse_id)]
        org: EntityId,
        #[arg(long, value_parser = parse_id)]
        id: EntityId,
        #[command(flatten)]
        fields: MemberFieldArgs,
    },
    Delete {
        #[command(flatten)]
        project: ProjectArgs,
        #[arg(long, value_parser = parse_id)]
        org: EntityId,
        #[arg(long, value_parser = parse_id)]
        id: EntityId,
    },
}

#[derive(Args, Debug)]
pub struct CopyArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    /// Year to copy from
    #[arg(long, default_value_t = 1)]
    pub from: Year,

    /// Years to copy into, comma separated
    #[arg(long, value_delimiter = ',', required = true)]
    pub to: Vec<Year>,
}

#[derive(Args, Debug)]
pub struct ClassifyArgs {
    #[arg(long)]
    pub start: Option<NaiveDate>,
    #[arg(long)]
    pub end: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct BudgetArgs {
    /// Total project budget
    #[arg(long)]
    pub total: u64,

    /// Government share in percent
    #[arg(long, default_value_t = 100)]
    pub government_pct: u32,

    /// Cash share of the private contribution in percent
    #[arg(long, default_value_t = 100)]
    pub cash_pct: u32,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum WeekStart {
    Mon,
    Sun,
}

impl From<WeekStart> for Weekday {
    fn from(start: WeekStart) -> Self {
        match start {
            WeekStart::Mon => Weekday::Mon,
            WeekStart::Sun => Weekday::Sun,
        }
    }
}

#[derive(Args, Debug)]
pub struct CalendarArgs {
    #[arg(long)]
    pub year: i32,
    #[arg(long)]
    pub month: u32,
    #[arg(long, value_enum, default_value_t = WeekStart::Sun)]
    pub week_start: WeekStart,
}

fn parse_id(value: &str) -> Result<EntityId, String> {
    match EntityId::parse(value) {
        Some(id @ EntityId::Persisted(_)) => Ok(id),
        Some(EntityId::Draft(_)) => Err("draft ids only exist inside one session".to_string()),
        None => Err(format!("invalid id: {}", value)),
    }
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Sync for the requested project year, loaded from the store
async fn open(config: &PortalConfig, args: &ProjectArgs) -> anyhow::Result<ConsortiumSync> {
    let api = HttpConsortiumApi::with_timeout(&config.api.base_url, config.api.timeout())
        .context("Failed to build HTTP client")?;
    let mut sync = ConsortiumSync::new(Arc::new(api), args.project, args.mode());
    sync.select_year(args.year)?;
    let year = sync.active_year();
    sync.refresh_year(year).await?;
    Ok(sync)
}

pub async fn run_orgs(config: &PortalConfig, cmd: OrgCommand) -> anyhow::Result<()> {
    match cmd {
        OrgCommand::List { project, all } => {
            let mut sync = open(config, &project).await?;
            if all {
                sync.load().await?;
                print_json(&sync.persisted_view())
            } else {
                print_json(&sync.organizations())
            }
        }
        OrgCommand::Add {
            project,
            name,
            organization_type,
            role,
        } => {
            let mut sync = open(config, &project).await?;
            let draft = sync.add_organization();
            sync.rename_organization(&draft, &name).await?;
            sync.retype_organization(&draft, organization_type).await?;
            sync.describe_organization(&draft, &role).await?;
            let id = sync.save_organization(&draft).await?;
            tracing::info!("Organization {} saved as {}", name, id);
            print_json(&sync.organizations())
        }
        OrgCommand::Rename { project, id, name } => {
            let mut sync = open(config, &project).await?;
            sync.rename_organization(&id, &name).await?;
            print_json(&sync.organizations())
        }
        OrgCommand::Retype {
            project,
            id,
            organization_type,
        } => {
            let mut sync = open(config, &project).await?;
            sync.retype_organization(&id, organization_type).await?;
            print_json(&sync.organizations())
        }
        OrgCommand::Delete { project, id } => {
            let mut sync = open(config, &project).await?;
            sync.delete_organization(&id).await?;
            print_json(&sync.organizations())
        }
    }
}

pub async fn run_members(config: &PortalConfig, cmd: MemberCommand) -> anyhow::Result<()> {
    match cmd {
        MemberCommand::Add {
            project,
            org,
            fields,
        } => {
            let mut sync = open(config, &project).await?;
            sync.add_member(&org)?;
            if let Some(draft) = sync.edit_draft() {
                fields.apply_to(draft);
            }
            let id = sync.save_member().await?;
            tracing::info!("Member saved as {}", id);
            print_json(&sync.organizations())
        }
        MemberCommand::Update {
            project,
            org,
            id,
            fields,
        } => {
            let mut sync = open(config, &project).await?;
            sync.begin_edit(&org, &id)?;
            if let Some(draft) = sync.edit_draft() {
                fields.apply_to(draft);
            }
            sync.save_member().await?;
            print_json(&sync.organizations())
        }
        MemberCommand::Delete { project, org, id } => {
            let mut sync = open(config, &project).await?;
            sync.delete_member(&org, &id).await?;
            print_json(&sync.organizations())
        }
    }
}

pub async fn run_copy(config: &PortalConfig, args: CopyArgs) -> anyhow::Result<()> {
    let api = HttpConsortiumApi::with_timeout(&config.api.base_url, config.api.timeout())
        .context("Failed to build HTTP client")?;
    let mut sync = ConsortiumSync::new(Arc::new(api), args.project.project, args.project.mode());
    let outcome = sync.propagate_from(args.from, &args.to).await?;
    print_json(&outcome)
}

pub fn run_classify(args: ClassifyArgs) -> anyhow::Result<()> {
    print_json(&classify(args.start, args.end))
}

pub fn run_budget(args: BudgetArgs) -> anyhow::Result<()> {
    let ratio = BudgetRatio::new(args.government_pct, args.cash_pct)?;
    print_json(&ratio.apply(args.total))
}

pub fn run_calendar(args: CalendarArgs) -> anyhow::Result<()> {
    let grid = rimp_schedule::month_grid(args.year, args.month, args.week_start.into())?;
    println!("{:04}-{:02}", args.year, args.month);
    for week in grid {
        let row: Vec<String> = week
            .iter()
            .map(|day| match day {
                Some(d) => format!("{:>3}", d.day()),
                None => "   ".to_string(),
            })
            .collect();
        println!("{}", row.join(""));
    }
    Ok(())
}
