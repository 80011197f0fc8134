use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Subcommand, Debug)]
pub enum WbsCommands {
    /// Import a CSV schedule export, replacing the project's tree
    Import(ImportArgs),
    /// Replace the project's tree with a JSON document
    Save(SaveArgs),
    /// Edit fields of a single task
    Update(UpdateArgs),
    /// Add a task at its WBS position
    Add(AddArgs),
    /// Remove a task and its subtasks
    Remove(RemoveArgs),
    /// Show the progress dashboard (S-curve, statuses, delays)
    Report(ReportArgs),
    /// Dump the stored task tree
    Tree(TreeArgs),
    /// Show the activity log, newest first
    Log(LogArgs),
}

#[derive(Args, Debug)]
pub struct ImportArgs {
    /// CSV file exported from the scheduling tool
    pub csv: PathBuf,

    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// User recorded in the activity log
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Args, Debug)]
pub struct SaveArgs {
    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// JSON file holding the full task tree
    #[arg(short, long)]
    pub input: PathBuf,

    /// User recorded in the activity log; changes are audited only when set
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Args, Debug, Default)]
pub struct UpdateArgs {
    /// Task id
    pub id: String,

    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// Progress percentage (leaf tasks only)
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub progress: Option<u8>,

    /// Status label, e.g. "In Progress"
    #[arg(long)]
    pub status: Option<String>,

    #[arg(long)]
    pub planned_start: Option<String>,

    #[arg(long)]
    pub planned_end: Option<String>,

    #[arg(long)]
    pub actual_start: Option<String>,

    #[arg(long, conflicts_with = "clear_actual_end")]
    pub actual_end: Option<String>,

    /// Clear the actual end date
    #[arg(long)]
    pub clear_actual_end: bool,

    #[arg(long)]
    pub weightage: Option<f64>,

    /// Mark or unmark as critical
    #[arg(long)]
    pub critical: Option<bool>,

    /// Weather delay in days
    #[arg(long)]
    pub delay_weather: Option<u32>,

    /// Contractor delay in days
    #[arg(long)]
    pub delay_contractor: Option<u32>,

    /// Client delay in days
    #[arg(long)]
    pub delay_client: Option<u32>,

    /// Append a note
    #[arg(long)]
    pub note: Option<String>,

    /// User recorded in the activity log
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// WBS code of the new task, e.g. "2.3.1"
    #[arg(long)]
    pub wbs: String,

    /// Task name
    #[arg(short, long)]
    pub name: Option<String>,

    #[arg(long)]
    pub weightage: Option<f64>,

    #[arg(long)]
    pub planned_start: Option<String>,

    #[arg(long)]
    pub planned_end: Option<String>,

    /// Mark as critical
    #[arg(long)]
    pub critical: bool,

    /// User recorded in the activity log
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Task id
    pub id: String,

    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// User recorded in the activity log
    #[arg(short, long)]
    pub user: Option<String>,
}

#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Project name
    #[arg(short, long)]
    pub project: String,

    /// Evaluate as of this date (YYYY-MM-DD) instead of today
    #[arg(long)]
    pub today: Option<NaiveDate>,

    /// Print the chart payload as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum TreeFormat {
    #[default]
    Json,
    Yaml,
}

#[derive(Args, Debug)]
pub struct TreeArgs {
    /// Project name
    #[arg(short, long)]
    pub project: String,

    #[arg(short, long, value_enum, default_value_t = TreeFormat::Json)]
    pub format: TreeFormat,
}

#[derive(Args, Debug)]
pub struct LogArgs {
    /// Only entries for this project
    #[arg(short, long)]
    pub project: Option<String>,

    /// Maximum number of entries to show
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}
