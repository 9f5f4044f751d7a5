use anyhow::{bail, Context, Result};
use chrono::{Datelike, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use haulplan_core::time::{local_today, parse_clock, parse_date};
use haulplan_core::{
    InMemoryRepository, ScheduleDraft, ScheduleFilter, ScheduleOutcome, SchedulePriority, ScheduleRepository,
    ScheduleStatus, ScheduleType, SchedulingEngine, Snapshot,
};
use haulplan_ingest::parsers::open_csv;
use haulplan_ingest::{parse_driver_roster, parse_schedule_csv, parse_vehicle_roster};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::info;

mod config;
mod logging;
mod output;
mod state;

type Engine = SchedulingEngine<InMemoryRepository>;

#[derive(Parser, Debug)]
#[command(
    name = "haulplan",
    version = concat!(env!("CARGO_PKG_VERSION"), " (", env!("HAULPLAN_BUILD_SHA"), ")"),
    about = "Fleet driver and vehicle scheduling"
)]
struct Cli {
    /// Print JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    /// Debug logging to stderr (RUST_LOG still wins)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Write ~/.haulplan/config.toml and seed state with the demo fleet
    Init {
        /// Replace existing state
        #[arg(long)]
        force: bool,
    },

    #[command(flatten)]
    Fleet(FleetCommand),
}

/// Commands that run against the saved state.
#[derive(Subcommand, Debug)]
enum FleetCommand {
    /// List schedules, ordered by start
    List(ListArgs),

    /// Show one schedule
    Show { id: String },

    /// Create a schedule (validated before it is stored)
    Create(CreateArgs),

    /// Change fields or status of a schedule
    Update {
        id: String,

        #[command(flatten)]
        fields: DraftArgs,

        /// Drop the current driver assignment
        #[arg(long, conflicts_with = "driver")]
        unassign_driver: bool,

        /// Drop the current vehicle assignment
        #[arg(long, conflicts_with = "vehicle")]
        unassign_vehicle: bool,
    },

    /// Delete a schedule and release its driver hours
    Delete { id: String },

    /// Weekly board per driver and vehicle
    Week {
        /// First day of the week (default: this week's Monday)
        #[arg(value_parser = parse_date_arg)]
        start: Option<NaiveDate>,
    },

    /// Fleet-wide counts and rates
    Stats,

    /// Driver availability
    Drivers {
        #[arg(long)]
        id: Option<String>,
    },

    /// Vehicle availability
    Vehicles {
        #[arg(long)]
        id: Option<String>,
    },

    /// Drivers and vehicles that could take a proposed window
    Available(AvailableArgs),

    /// Import rosters or schedules from CSV
    Import {
        #[command(subcommand)]
        command: ImportCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ImportCommand {
    /// Upsert drivers by driver_id
    Drivers {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Upsert vehicles by vehicle_id
    Vehicles {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Create schedules one row at a time; rejected rows are reported
    Schedules {
        #[arg(long)]
        csv: PathBuf,
    },
}

#[derive(Args, Debug)]
struct ListArgs {
    /// Only schedules starting on or after this date
    #[arg(long, value_parser = parse_date_arg)]
    from: Option<NaiveDate>,

    /// Only schedules ending on or before this date
    #[arg(long, value_parser = parse_date_arg)]
    to: Option<NaiveDate>,

    /// Repeatable
    #[arg(long, value_parser = parse_label::<ScheduleStatus>)]
    status: Vec<ScheduleStatus>,

    #[arg(long, value_parser = parse_label::<SchedulePriority>)]
    priority: Vec<SchedulePriority>,

    #[arg(long = "type", value_parser = parse_label::<ScheduleType>)]
    schedule_type: Vec<ScheduleType>,

    #[arg(long)]
    driver: Option<String>,

    #[arg(long)]
    vehicle: Option<String>,

    /// Case-insensitive match on title, description or resource names
    #[arg(long)]
    search: Option<String>,
}

impl ListArgs {
    fn into_filter(self) -> ScheduleFilter {
        ScheduleFilter {
            start_date: self.from,
            end_date: self.to,
            status: self.status,
            priority: self.priority,
            schedule_type: self.schedule_type,
            assigned_driver_id: self.driver,
            assigned_vehicle_id: self.vehicle,
            search_term: self.search,
        }
    }
}

#[derive(Args, Debug)]
struct CreateArgs {
    /// Explicit id (generated when omitted)
    #[arg(long = "id")]
    schedule_id: Option<String>,

    #[arg(long)]
    created_by: Option<String>,

    #[command(flatten)]
    fields: DraftArgs,
}

impl CreateArgs {
    fn into_draft(self) -> ScheduleDraft {
        ScheduleDraft {
            id: self.schedule_id,
            created_by: self.created_by,
            ..self.fields.into_draft()
        }
    }
}

/// Schedule fields shared by `create` and `update`.
#[derive(Args, Debug)]
struct DraftArgs {
    #[arg(long)]
    title: Option<String>,

    #[arg(long)]
    description: Option<String>,

    /// Sets both start and end date
    #[arg(long, value_parser = parse_date_arg, conflicts_with_all = ["start_date", "end_date"])]
    date: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date_arg)]
    start_date: Option<NaiveDate>,

    #[arg(long, value_parser = parse_date_arg)]
    end_date: Option<NaiveDate>,

    /// HH:MM
    #[arg(long, value_parser = parse_clock_arg)]
    start: Option<NaiveTime>,

    /// HH:MM
    #[arg(long, value_parser = parse_clock_arg)]
    end: Option<NaiveTime>,

    #[arg(long, value_parser = parse_label::<ScheduleStatus>)]
    status: Option<ScheduleStatus>,

    #[arg(long, value_parser = parse_label::<SchedulePriority>)]
    priority: Option<SchedulePriority>,

    #[arg(long = "type", value_parser = parse_label::<ScheduleType>)]
    schedule_type: Option<ScheduleType>,

    #[arg(long)]
    driver: Option<String>,

    #[arg(long)]
    vehicle: Option<String>,

    #[arg(long)]
    origin: Option<String>,

    #[arg(long)]
    destination: Option<String>,

    /// Overrides the hours derived from the time window
    #[arg(long)]
    hours: Option<f64>,

    /// Miles
    #[arg(long)]
    distance: Option<f64>,

    #[arg(long)]
    notes: Option<String>,
}

impl DraftArgs {
    fn into_draft(self) -> ScheduleDraft {
        ScheduleDraft {
            title: self.title,
            description: self.description,
            start_date: self.date.or(self.start_date),
            end_date: self.date.or(self.end_date),
            start_time: self.start,
            end_time: self.end,
            status: self.status,
            priority: self.priority,
            schedule_type: self.schedule_type,
            assigned_driver_id: self.driver,
            assigned_vehicle_id: self.vehicle,
            origin: self.origin,
            destination: self.destination,
            estimated_hours: self.hours,
            estimated_distance: self.distance,
            notes: self.notes,
            ..ScheduleDraft::default()
        }
    }
}

#[derive(Args, Debug)]
struct AvailableArgs {
    #[arg(long, value_parser = parse_date_arg)]
    date: NaiveDate,

    /// Defaults to --date
    #[arg(long, value_parser = parse_date_arg)]
    end_date: Option<NaiveDate>,

    #[arg(long, value_parser = parse_clock_arg)]
    start: Option<NaiveTime>,

    #[arg(long, value_parser = parse_clock_arg)]
    end: Option<NaiveTime>,

    /// Hours the driver must have left (default: the window length)
    #[arg(long)]
    hours: Option<f64>,
}

fn parse_date_arg(s: &str) -> Result<NaiveDate, String> {
    parse_date(s).map_err(|e| e.to_string())
}

fn parse_clock_arg(s: &str) -> Result<NaiveTime, String> {
    parse_clock(s).map_err(|e| e.to_string())
}

fn parse_label<T: FromStr>(s: &str) -> Result<T, String>
where
    T::Err: std::fmt::Display,
{
    s.parse::<T>().map_err(|e| e.to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config()?;
    logging::init_logging(&cfg.logging, cli.verbose)?;

    let command = match cli.command {
        Command::Init { force } => return init(force),
        Command::Fleet(command) => command,
    };

    let snapshot = state::load_state()?;
    let engine = SchedulingEngine::new(InMemoryRepository::from_snapshot(snapshot), cfg.scheduling.clone());

    let mutated = run(&engine, command, cli.json).await?;
    if mutated {
        state::save_state(&engine.repository().snapshot().await)?;
    }
    Ok(())
}

fn init(force: bool) -> Result<()> {
    let cfg_path = config::init_config()?;
    println!("Config: {}", cfg_path.display());

    let state_path = state::state_path()?;
    if state_path.exists() && !force {
        println!("State:  {} (kept; pass --force to reseed)", state_path.display());
        return Ok(());
    }
    state::save_state(&Snapshot::seeded())?;
    println!("State:  {} (seeded with demo fleet)", state_path.display());
    Ok(())
}

/// Runs one command. Returns whether repository state changed.
async fn run(engine: &Engine, command: FleetCommand, json: bool) -> Result<bool> {
    match command {
        FleetCommand::List(args) => {
            let filter = args.into_filter();
            let schedules = engine.get_schedules(Some(&filter)).await?;
            if json {
                output::print_json(&schedules)?;
            } else {
                output::print_schedules(&schedules);
            }
            Ok(false)
        }

        FleetCommand::Show { id } => {
            let Some(schedule) = engine.get_schedule_by_id(&id).await? else {
                bail!("Schedule not found: {id}");
            };
            if json {
                output::print_json(&schedule)?;
            } else {
                output::print_schedule_detail(&schedule);
            }
            Ok(false)
        }

        FleetCommand::Create(args) => {
            let outcome = engine.create_schedule(args.into_draft()).await?;
            report_outcome("Created", &outcome, json)?;
            Ok(true)
        }

        FleetCommand::Update {
            id,
            fields,
            unassign_driver,
            unassign_vehicle,
        } => {
            let mut draft = fields.into_draft();
            draft.unassign_driver = unassign_driver;
            draft.unassign_vehicle = unassign_vehicle;

            let outcome = engine.update_schedule(&id, draft).await?;
            report_outcome("Updated", &outcome, json)?;
            Ok(true)
        }

        FleetCommand::Delete { id } => {
            if !engine.delete_schedule(&id).await? {
                bail!("Schedule not found: {id}");
            }
            if json {
                output::print_json(&serde_json::json!({ "deleted": id }))?;
            } else {
                println!("Deleted {id}");
            }
            Ok(true)
        }

        FleetCommand::Week { start } => {
            let start = match start {
                Some(d) => d,
                None => current_monday(&engine.policy().timezone)?,
            };
            let view = engine.get_weekly_schedule_view(start).await?;
            if json {
                output::print_json(&view)?;
            } else {
                output::print_week(&view);
            }
            Ok(false)
        }

        FleetCommand::Stats => {
            let stats = engine.get_schedule_statistics().await?;
            if json {
                output::print_json(&stats)?;
            } else {
                output::print_stats(&stats);
            }
            Ok(false)
        }

        FleetCommand::Drivers { id } => {
            let drivers = engine.get_driver_availability(id.as_deref()).await?;
            if id.is_some() && drivers.is_empty() {
                bail!("Driver not found: {}", id.unwrap_or_default());
            }
            if json {
                output::print_json(&drivers)?;
            } else {
                for d in &drivers {
                    println!("{}", output::driver_line(d));
                }
            }
            Ok(false)
        }

        FleetCommand::Vehicles { id } => {
            let vehicles = engine.get_vehicle_availability(id.as_deref()).await?;
            if id.is_some() && vehicles.is_empty() {
                bail!("Vehicle not found: {}", id.unwrap_or_default());
            }
            if json {
                output::print_json(&vehicles)?;
            } else {
                for v in &vehicles {
                    println!("{}", output::vehicle_line(v));
                }
            }
            Ok(false)
        }

        FleetCommand::Available(args) => {
            let draft = ScheduleDraft {
                start_date: Some(args.date),
                end_date: Some(args.end_date.unwrap_or(args.date)),
                start_time: args.start,
                end_time: args.end,
                estimated_hours: args.hours,
                ..ScheduleDraft::default()
            };
            let drivers = engine.get_available_drivers_for_schedule(&draft).await?;
            let vehicles = engine.get_available_vehicles_for_schedule(&draft).await?;
            if json {
                output::print_json(&serde_json::json!({ "drivers": drivers, "vehicles": vehicles }))?;
            } else {
                println!("Drivers ({}):", drivers.len());
                for d in &drivers {
                    println!("  {}", output::driver_line(d));
                }
                println!("Vehicles ({}):", vehicles.len());
                for v in &vehicles {
                    println!("  {}", output::vehicle_line(v));
                }
            }
            Ok(false)
        }

        FleetCommand::Import { command } => import(engine, command, json).await,
    }
}

async fn import(engine: &Engine, command: ImportCommand, json: bool) -> Result<bool> {
    match command {
        ImportCommand::Drivers { csv } => {
            let report = parse_driver_roster(open_csv(&csv)?)
                .with_context(|| format!("parsing {}", csv.display()))?;
            for d in &report.records {
                engine.repository().save_driver(d).await?;
            }
            info!(imported = report.records.len(), skipped = report.skipped.len(), "driver roster imported");
            if json {
                output::print_json(&report)?;
            } else {
                println!("Imported {} drivers from {}", report.records.len(), csv.display());
                output::print_skipped(&report.skipped);
            }
            Ok(!report.records.is_empty())
        }

        ImportCommand::Vehicles { csv } => {
            let report = parse_vehicle_roster(open_csv(&csv)?)
                .with_context(|| format!("parsing {}", csv.display()))?;
            for v in &report.records {
                engine.repository().save_vehicle(v).await?;
            }
            info!(imported = report.records.len(), skipped = report.skipped.len(), "vehicle roster imported");
            if json {
                output::print_json(&report)?;
            } else {
                println!("Imported {} vehicles from {}", report.records.len(), csv.display());
                output::print_skipped(&report.skipped);
            }
            Ok(!report.records.is_empty())
        }

        ImportCommand::Schedules { csv } => {
            let report = parse_schedule_csv(open_csv(&csv)?)
                .with_context(|| format!("parsing {}", csv.display()))?;

            let mut outcomes = Vec::with_capacity(report.records.len());
            for draft in report.records.iter().cloned() {
                outcomes.push(engine.create_schedule(draft).await?);
            }
            let created = outcomes.iter().filter(|o| o.success).count();
            info!(created, rejected = outcomes.len() - created, skipped = report.skipped.len(), "schedules imported");

            if json {
                output::print_json(&serde_json::json!({
                    "created": created,
                    "outcomes": outcomes,
                    "skipped": report.skipped,
                }))?;
            } else {
                println!(
                    "Created {created} of {} schedules from {}",
                    outcomes.len(),
                    csv.display()
                );
                for o in outcomes.iter().filter(|o| !o.success) {
                    output::print_outcome("Created", o);
                }
                output::print_skipped(&report.skipped);
            }
            Ok(created > 0)
        }
    }
}

fn report_outcome(verb: &str, outcome: &ScheduleOutcome, json: bool) -> Result<()> {
    if json {
        output::print_json(outcome)?;
    } else {
        output::print_outcome(verb, outcome);
    }
    if !outcome.success {
        bail!("{verb} failed");
    }
    Ok(())
}

fn current_monday(tz: &str) -> Result<NaiveDate> {
    let today = local_today(tz, Utc::now())?;
    Ok(today - Duration::days(today.weekday().num_days_from_monday() as i64))
}
